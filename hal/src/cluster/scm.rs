//! SCM maintenance operations
//!
//! - **Clean**: write dirty lines back to memory
//! - **Invalidate**: drop lines without writing them back
//! - **Clean & Invalidate** (flush): both
//!
//! Ranges are `[low, high)` physical addresses. The enable bit is only
//! touched by `enable` and `disable`.
//!
//! Without cluster hardware every operation returns `Ok(())` before its
//! arguments are looked at.

use core::hint::spin_loop;

use super::regs::{
    CLN_CACHE_ADDR_HI0, CLN_CACHE_ADDR_HI1, CLN_CACHE_ADDR_LO0, CLN_CACHE_ADDR_LO1, CLN_CACHE_CMD,
    CLN_CACHE_STATUS, CacheOp, SCM_LINE_SIZE, ScmCommand, ScmStatus, split_addr,
};
use super::{Cluster, ClusterBus, ClusterError, ClusterResult};
use crate::arch::PhysAddr;
use crate::config::PollPolicy;

impl<B: ClusterBus> Cluster<B> {
    fn read_status(&mut self) -> ScmStatus {
        ScmStatus::from_bits_retain(self.bus.read(CLN_CACHE_STATUS))
    }

    /// Poll until `BUSY` clears
    fn wait_idle(&mut self) -> ClusterResult<()> {
        let mut polls: u32 = 0;
        loop {
            if !self.read_status().contains(ScmStatus::BUSY) {
                return Ok(());
            }
            polls = polls.saturating_add(1);
            if let PollPolicy::Bounded { max_polls } = self.config.poll {
                if polls >= max_polls {
                    debug_print!(ERROR, "SCM stuck busy after {} polls", polls);
                    return Err(ClusterError::Timeout {
                        reg: CLN_CACHE_STATUS,
                        polls,
                    });
                }
            }
            spin_loop();
        }
    }

    /// Issue a command on an idle controller and wait for it to finish
    fn run_command(&mut self, cmd: ScmCommand) -> ClusterResult<()> {
        debug_print!(TRACE, "SCM command {:#x}", cmd.bits());
        self.bus.write(CLN_CACHE_CMD, cmd.bits());
        self.wait_idle()
    }

    /// Whether the SCM is currently enabled
    pub fn is_enabled(&mut self) -> bool {
        self.is_present() && self.read_status().contains(ScmStatus::EN)
    }

    /// Reset, invalidate and enable the SCM
    ///
    /// Called once at boot, before any core relies on cluster coherence.
    pub fn enable(&mut self) -> ClusterResult<()> {
        if !self.is_present() {
            return Ok(());
        }

        self.disable()?;
        self.run_command(ScmCommand::all(CacheOp::Invalidate))?;

        let status = self.read_status() - ScmStatus::HW_OWNED;
        self.bus.write(CLN_CACHE_STATUS, (status | ScmStatus::EN).bits());
        debug_print!(INFO, "SCM enabled");
        Ok(())
    }

    /// Stop the SCM once it is idle
    pub fn disable(&mut self) -> ClusterResult<()> {
        if !self.is_present() {
            return Ok(());
        }

        self.wait_idle()?;
        let status = self.read_status() - ScmStatus::HW_OWNED;
        self.bus.write(CLN_CACHE_STATUS, (status - ScmStatus::EN).bits());
        Ok(())
    }

    /// Invalidate the whole SCM
    pub fn invalidate_all(&mut self) -> ClusterResult<()> {
        self.whole_op(CacheOp::Invalidate)
    }

    /// Clean and invalidate the whole SCM
    pub fn flush_all(&mut self) -> ClusterResult<()> {
        self.whole_op(CacheOp::CleanInvalidate)
    }

    fn whole_op(&mut self, op: CacheOp) -> ClusterResult<()> {
        if !self.is_present() {
            return Ok(());
        }

        self.wait_idle()?;
        self.run_command(ScmCommand::all(op))
    }

    /// Apply `op` to the physical range `[low, high)`
    pub fn range_op(&mut self, op: CacheOp, low: PhysAddr, high: PhysAddr) -> ClusterResult<()> {
        if !self.is_present() {
            return Ok(());
        }
        if low > high {
            return Err(ClusterError::InvalidRange { low, high });
        }

        self.wait_idle()?;

        let (lo0, lo1) = split_addr(low);
        let (hi0, hi1) = split_addr(high);
        self.bus.write(CLN_CACHE_ADDR_LO0, lo0);
        self.bus.write(CLN_CACHE_ADDR_LO1, lo1);
        self.bus.write(CLN_CACHE_ADDR_HI0, hi0);
        self.bus.write(CLN_CACHE_ADDR_HI1, hi1);

        self.run_command(ScmCommand::range(op))
    }

    /// Clean and invalidate `[low, high)`
    pub fn flush_range(&mut self, low: PhysAddr, high: PhysAddr) -> ClusterResult<()> {
        self.range_op(CacheOp::CleanInvalidate, low, high)
    }

    /// Write back `[low, high)`
    pub fn clean_range(&mut self, low: PhysAddr, high: PhysAddr) -> ClusterResult<()> {
        self.range_op(CacheOp::Clean, low, high)
    }

    /// Drop `[low, high)` without writing back
    pub fn invalidate_range(&mut self, low: PhysAddr, high: PhysAddr) -> ClusterResult<()> {
        self.range_op(CacheOp::Invalidate, low, high)
    }

    /// Make CPU writes to a buffer visible to a device
    pub fn dma_sync_for_device(&mut self, addr: PhysAddr, len: u64) -> ClusterResult<()> {
        if !self.is_present() {
            return Ok(());
        }
        match line_span(addr, len)? {
            Some((low, high)) => self.clean_range(low, high),
            None => Ok(()),
        }
    }

    /// Make device writes to a buffer visible to the CPU
    pub fn dma_sync_for_cpu(&mut self, addr: PhysAddr, len: u64) -> ClusterResult<()> {
        if !self.is_present() {
            return Ok(());
        }
        match line_span(addr, len)? {
            Some((low, high)) => self.invalidate_range(low, high),
            None => Ok(()),
        }
    }
}

/// Widen `[addr, addr + len)` to whole SCM lines; `None` for an empty span
fn line_span(addr: PhysAddr, len: u64) -> ClusterResult<Option<(PhysAddr, PhysAddr)>> {
    if len == 0 {
        return Ok(None);
    }

    let mask = SCM_LINE_SIZE - 1;
    let invalid = ClusterError::InvalidRange {
        low: addr,
        high: addr.wrapping_add(len),
    };
    let end = addr.checked_add(len).ok_or(invalid)?;
    let high = end.checked_add(mask).ok_or(invalid)? & !mask;
    Ok(Some((addr & !mask, high)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::regs::bcr_encode;
    use crate::cluster::sim::{RegWrite, SimBus};
    use crate::config::ClusterConfig;

    fn present(busy_polls: u32, poll: PollPolicy) -> Cluster<SimBus> {
        let bus = SimBus::new(bcr_encode(1, 4)).with_busy_polls(busy_polls);
        let mut cluster = Cluster::new(bus, ClusterConfig::new().with_poll(poll));
        cluster.version = 1;
        cluster
    }

    #[test]
    fn enable_resets_invalidates_then_sets_en() {
        let mut cluster = present(3, PollPolicy::Unbounded);
        cluster.enable().unwrap();

        let sim = cluster.bus();
        assert!(sim.status().contains(ScmStatus::EN));
        assert!(!sim.status().contains(ScmStatus::BUSY));
        assert_eq!(sim.commands.len(), 1);
        assert_eq!(sim.commands[0].cmd, ScmCommand::all(CacheOp::Invalidate));
        assert_eq!(
            sim.writes.as_slice(),
            [
                RegWrite { reg: CLN_CACHE_STATUS, value: 0 },
                RegWrite { reg: CLN_CACHE_CMD, value: 1 },
                RegWrite { reg: CLN_CACHE_STATUS, value: ScmStatus::EN.bits() },
            ]
        );
        assert_eq!(sim.commands_while_busy, 0);
    }

    #[test]
    fn flush_range_writes_bounds_before_command() {
        let mut cluster = present(2, PollPolicy::Unbounded);
        cluster.enable().unwrap();
        cluster.bus_mut().clear_log();

        cluster.flush_range(0x1000, 0x2000).unwrap();

        let sim = cluster.bus();
        assert_eq!(
            sim.writes.as_slice(),
            [
                RegWrite { reg: CLN_CACHE_ADDR_LO0, value: 0x1000 },
                RegWrite { reg: CLN_CACHE_ADDR_LO1, value: 0 },
                RegWrite { reg: CLN_CACHE_ADDR_HI0, value: 0x2000 },
                RegWrite { reg: CLN_CACHE_ADDR_HI1, value: 0 },
                RegWrite { reg: CLN_CACHE_CMD, value: ScmCommand::range(CacheOp::CleanInvalidate).bits() },
            ]
        );
        assert!(!sim.status().contains(ScmStatus::BUSY));
        assert!(sim.status().contains(ScmStatus::EN));
    }

    #[test]
    fn flush_range_leaves_disabled_scm_disabled() {
        let mut cluster = present(1, PollPolicy::Unbounded);
        cluster.flush_range(0x4000_0000, 0x4000_1000).unwrap();
        assert!(!cluster.is_enabled());
    }

    #[test]
    fn high_halves_carry_upper_address_bits() {
        let mut cluster = present(0, PollPolicy::Unbounded);
        cluster.clean_range(0x1_0000_0040, 0x2_0000_0080).unwrap();
        let cmd = cluster.bus().commands[0];
        assert_eq!(cmd.low, 0x1_0000_0040);
        assert_eq!(cmd.high, 0x2_0000_0080);
        assert_eq!(cmd.cmd.op(), Some(CacheOp::Clean));
    }

    #[test]
    fn inverted_range_is_rejected_before_any_write() {
        let mut cluster = present(1, PollPolicy::Unbounded);
        assert_eq!(
            cluster.flush_range(0x2000, 0x1000),
            Err(ClusterError::InvalidRange { low: 0x2000, high: 0x1000 })
        );
        assert!(cluster.bus().writes.is_empty());
    }

    #[test]
    fn bounded_poll_times_out_on_stuck_busy() {
        let mut cluster = present(1, PollPolicy::Bounded { max_polls: 16 });
        cluster.bus_mut().stuck = true;

        assert_eq!(
            cluster.invalidate_all(),
            Err(ClusterError::Timeout { reg: CLN_CACHE_STATUS, polls: 16 })
        );
        assert_eq!(cluster.bus().status_reads, 17);
    }

    #[test]
    fn bounded_poll_tolerates_slow_completion() {
        let mut cluster = present(10, PollPolicy::Bounded { max_polls: 16 });
        cluster.flush_all().unwrap();
        assert!(!cluster.bus().status().contains(ScmStatus::BUSY));
    }

    #[test]
    fn absent_cluster_is_a_no_op() {
        let bus = SimBus::new(0);
        let mut cluster = Cluster::new(bus, ClusterConfig::new());
        cluster.enable().unwrap();
        cluster.flush_range(0x1000, 0x2000).unwrap();
        cluster.dma_sync_for_cpu(0x1000, 64).unwrap();
        assert!(!cluster.is_enabled());
        assert!(cluster.bus().writes.is_empty());
        assert_eq!(cluster.bus().status_reads, 0);
    }

    #[test]
    fn absent_cluster_ignores_bad_ranges() {
        let mut cluster = Cluster::new(SimBus::new(0), ClusterConfig::new());
        assert_eq!(cluster.flush_range(0x2000, 0x1000), Ok(()));
        assert_eq!(cluster.invalidate_range(u64::MAX, 0), Ok(()));
        assert_eq!(cluster.dma_sync_for_device(u64::MAX - 8, 16), Ok(()));
        assert!(cluster.bus().writes.is_empty());
    }

    #[test]
    fn dma_helpers_round_to_lines() {
        let mut cluster = present(0, PollPolicy::Unbounded);
        cluster.dma_sync_for_device(0x1010, 0x20).unwrap();
        cluster.dma_sync_for_cpu(0x1000, 0x41).unwrap();
        cluster.dma_sync_for_cpu(0x1000, 0).unwrap();

        let commands = &cluster.bus().commands;
        assert_eq!(commands.len(), 2);
        assert_eq!((commands[0].low, commands[0].high), (0x1000, 0x1040));
        assert_eq!(commands[0].cmd.op(), Some(CacheOp::Clean));
        assert_eq!((commands[1].low, commands[1].high), (0x1000, 0x1080));
        assert_eq!(commands[1].cmd.op(), Some(CacheOp::Invalidate));
    }

    #[test]
    fn dma_span_overflow_is_rejected() {
        assert!(line_span(u64::MAX - 8, 16).is_err());
        assert!(line_span(u64::MAX - 63, 1).is_err());
    }
}
