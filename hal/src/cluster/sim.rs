//! Simulated cluster register file
//!
//! Behaves like the SCM block closely enough to exercise the controller on
//! a host:
//!
//! - writing `CACHE_CMD` raises `BUSY`; it stays set for the next
//!   `busy_polls` status reads, then drops and `DONE` is raised
//! - `BUSY`/`DONE` ignore writes, every other status bit is plain storage
//! - a stuck controller (`stuck = true`) never clears `BUSY`
//!
//! Every cluster register write is appended to `writes` so tests can check
//! exact sequences, and commands issued while `BUSY` was still set are
//! counted in `commands_while_busy`.

#![deny(missing_docs)]

use heapless::Vec;

use super::bus::ClusterBus;
use super::regs::{
    CLN_CACHE_ADDR_HI0, CLN_CACHE_ADDR_HI1, CLN_CACHE_ADDR_LO0, CLN_CACHE_ADDR_LO1, CLN_CACHE_CMD,
    CLN_CACHE_STATUS, ScmCommand, ScmStatus,
};

/// Maximum number of recorded writes
pub const SIM_LOG_CAPACITY: usize = 128;

/// Maximum number of cluster registers modelled
const SIM_REGS: usize = 4096;

/// Recorded cluster register write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegWrite {
    /// Cluster register index
    pub reg: u32,
    /// Value written
    pub value: u32,
}

/// Recorded SCM command with the range registers at issue time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedCommand {
    /// Command word
    pub cmd: ScmCommand,
    /// Range start assembled from LO0/LO1
    pub low: u64,
    /// Range end assembled from HI0/HI1
    pub high: u64,
}

/// Host model of one cluster's register file
pub struct SimBus {
    bcr: u32,
    regs: [u32; SIM_REGS],
    busy_left: u32,
    /// Status reads that still report `BUSY` after each command
    pub busy_polls: u32,
    /// Never clear `BUSY` once set
    pub stuck: bool,
    /// Every cluster register write, oldest first
    pub writes: Vec<RegWrite, SIM_LOG_CAPACITY>,
    /// Every SCM command, oldest first
    pub commands: Vec<IssuedCommand, SIM_LOG_CAPACITY>,
    /// Writes dropped because `writes` was full
    pub dropped_writes: usize,
    /// Commands written while `BUSY` was set
    pub commands_while_busy: usize,
    /// Status register reads
    pub status_reads: usize,
}

impl SimBus {
    /// Cluster with the given build-configuration register value
    pub const fn new(bcr: u32) -> Self {
        Self {
            bcr,
            regs: [0; SIM_REGS],
            busy_left: 0,
            busy_polls: 1,
            stuck: false,
            writes: Vec::new(),
            commands: Vec::new(),
            dropped_writes: 0,
            commands_while_busy: 0,
            status_reads: 0,
        }
    }

    /// Builder: set `busy_polls`
    pub const fn with_busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self
    }

    /// Current raw value of a register, without side effects
    pub fn peek(&self, reg: u32) -> u32 {
        self.regs.get(reg as usize).copied().unwrap_or(0)
    }

    /// Current status bits, without side effects
    pub fn status(&self) -> ScmStatus {
        ScmStatus::from_bits_retain(self.peek(CLN_CACHE_STATUS))
    }

    /// Forget recorded writes and commands
    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.commands.clear();
        self.dropped_writes = 0;
    }

    fn set(&mut self, reg: u32, value: u32) {
        if let Some(slot) = self.regs.get_mut(reg as usize) {
            *slot = value;
        }
    }

    fn set_status(&mut self, status: ScmStatus) {
        self.set(CLN_CACHE_STATUS, status.bits());
    }

    fn range_addr(&self, lo: u32, hi: u32) -> u64 {
        u64::from(self.peek(lo)) | (u64::from(self.peek(hi)) << 32)
    }

    fn issue(&mut self, raw: u32) {
        let mut status = self.status();
        if status.contains(ScmStatus::BUSY) {
            self.commands_while_busy += 1;
        }

        let command = IssuedCommand {
            cmd: ScmCommand::from_raw(raw),
            low: self.range_addr(CLN_CACHE_ADDR_LO0, CLN_CACHE_ADDR_LO1),
            high: self.range_addr(CLN_CACHE_ADDR_HI0, CLN_CACHE_ADDR_HI1),
        };
        let _ = self.commands.push(command);

        status.remove(ScmStatus::DONE);
        if self.busy_polls > 0 || self.stuck {
            status.insert(ScmStatus::BUSY);
            self.busy_left = self.busy_polls;
        } else {
            status.insert(ScmStatus::DONE);
        }
        self.set_status(status);
    }
}

impl ClusterBus for SimBus {
    fn read_build_config(&mut self) -> u32 {
        self.bcr
    }

    fn read(&mut self, reg: u32) -> u32 {
        if reg != CLN_CACHE_STATUS {
            return self.peek(reg);
        }

        self.status_reads += 1;
        let mut status = self.status();
        let value = status.bits();
        if status.contains(ScmStatus::BUSY) && !self.stuck {
            self.busy_left = self.busy_left.saturating_sub(1);
            if self.busy_left == 0 {
                status.remove(ScmStatus::BUSY);
                status.insert(ScmStatus::DONE);
                self.set_status(status);
            }
        }
        value
    }

    fn write(&mut self, reg: u32, value: u32) {
        if self.writes.push(RegWrite { reg, value }).is_err() {
            self.dropped_writes += 1;
        }

        match reg {
            CLN_CACHE_STATUS => {
                let hw = self.status() & ScmStatus::HW_OWNED;
                let sw = ScmStatus::from_bits_retain(value) - ScmStatus::HW_OWNED;
                self.set_status(hw | sw);
            }
            CLN_CACHE_CMD => {
                self.set(reg, value);
                self.issue(value);
            }
            _ => self.set(reg, value),
        }
    }
}
