//! Cluster Coherence Controller
//!
//! This module manages the cluster-level shared cache (SCM) of a multi-core
//! ARCv3 cluster and the boot-time routing of the cluster's network on
//! chip.
//!
//! # SCM Protocol
//!
//! The SCM is driven through a command/status register pair:
//!
//! 1. wait until `CACHE_STATUS.BUSY` is clear
//! 2. for range commands, write the bounds to `CACHE_ADDR_{LO,HI}{0,1}`
//! 3. write the command to `CACHE_CMD`
//! 4. poll `CACHE_STATUS.BUSY` until it clears
//!
//! Per command the controller goes `Idle -> CommandIssued -> Idle`;
//! completion is only observed by polling.
//!
//! # Sharing
//!
//! There is one register set per cluster and it has no locking of its own.
//! Every operation that touches it takes `&mut self`; cores sharing a
//! `Cluster` put it behind an outer lock (e.g. `spin::Mutex<Cluster<_>>`).
//!
//! # Absent Hardware
//!
//! Until `discover_topology` reads a non-zero cluster version, every SCM
//! operation is a no-op returning `Ok(())`.

#![deny(missing_docs)]

pub mod bus;
pub mod regs;
mod scm;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
mod topology;

use thiserror_no_std::Error;

use crate::config::ClusterConfig;

pub use bus::{ClusterBus, IndirectBus};
pub use regs::{CacheOp, ScmCommand, ScmStatus};
pub use topology::{ProgrammedWindow, Topology, WindowKind};

/// Cluster controller errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClusterError {
    /// The busy bit did not clear within the configured poll budget
    #[error("cluster register {reg:#x} still busy after {polls} polls")]
    Timeout {
        /// Register that was polled
        reg: u32,
        /// Number of reads that saw it busy
        polls: u32,
    },
    /// Range start lies above range end, or the range overflows
    #[error("invalid address range {low:#x}..{high:#x}")]
    InvalidRange {
        /// Range start
        low: u64,
        /// Range end
        high: u64,
    },
    /// No memory map entry contains the kernel link address
    #[error("no memory region contains kernel link address {addr:#x}")]
    KernelNotMapped {
        /// Kernel link address
        addr: u64,
    },
    /// A window cannot be expressed in whole MiB
    #[error("window {start:#x}+{size:#x} is not MiB aligned")]
    WindowMisaligned {
        /// Window start
        start: u64,
        /// Window size
        size: u64,
    },
    /// More windows planned than the topology can record
    #[error("window table holds at most {capacity} entries")]
    TooManyWindows {
        /// Table capacity
        capacity: usize,
    },
}

/// Result type for cluster operations
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Controller for one cluster
pub struct Cluster<B: ClusterBus> {
    /// Register access
    bus: B,
    /// Boot configuration
    config: ClusterConfig,
    /// Cluster version, zero when absent or not yet discovered
    version: u8,
}

impl<B: ClusterBus> Cluster<B> {
    /// Create a controller; no register is touched until discovery
    pub const fn new(bus: B, config: ClusterConfig) -> Self {
        Self {
            bus,
            config,
            version: 0,
        }
    }

    /// Cluster version found by discovery (0 = no cluster)
    pub const fn version(&self) -> u8 {
        self.version
    }

    /// Whether discovery found cluster hardware
    pub const fn is_present(&self) -> bool {
        self.version != 0
    }

    /// Active configuration
    pub const fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Register access, for diagnostics
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutable register access, for diagnostics
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Release the register access
    pub fn into_bus(self) -> B {
        self.bus
    }
}
