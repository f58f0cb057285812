//! HAL Configuration
//!
//! Build-time choices live in Cargo features (the atomic backend). Values a
//! board port may need to change at boot live in `ClusterConfig`, which has
//! `const` defaults matching the reference ARCv3 HS cluster memory map.

#![deny(missing_docs)]

use crate::arch::{MemoryRegion, PhysAddr};

/// Name of the atomic backend compiled into this image
pub const BACKEND_NAME: &str = env!("ARC_HAL_BACKEND");

/// Default kernel link address (start of DDR on the reference platform)
pub const DEFAULT_KERNEL_LINK_ADDR: PhysAddr = 0x8000_0000;

/// Default peripheral aperture routed by the cluster
pub const DEFAULT_PERIPHERAL_WINDOW: MemoryRegion = MemoryRegion::new(0xF000_0000, 0x1000_0000);

/// Default cluster shared memory window
pub const DEFAULT_SHMEM_WINDOW: MemoryRegion = MemoryRegion::new(0xE000_0000, 0x0010_0000);

/// How long to wait for the SCM `busy` bit to clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPolicy {
    /// Spin until the bit clears, however long that takes
    #[default]
    Unbounded,
    /// Give up after `max_polls` status reads and report a timeout
    Bounded {
        /// Maximum number of status register reads
        max_polls: u32,
    },
}

/// Boot-time cluster configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Physical address the kernel image is linked at
    pub kernel_link_addr: PhysAddr,
    /// Peripheral window programmed into the cluster
    pub peripheral_window: MemoryRegion,
    /// Shared memory window programmed into the cluster
    pub shmem_window: MemoryRegion,
    /// SCM completion polling policy
    pub poll: PollPolicy,
}

impl ClusterConfig {
    /// Reference platform configuration
    pub const fn new() -> Self {
        Self {
            kernel_link_addr: DEFAULT_KERNEL_LINK_ADDR,
            peripheral_window: DEFAULT_PERIPHERAL_WINDOW,
            shmem_window: DEFAULT_SHMEM_WINDOW,
            poll: PollPolicy::Unbounded,
        }
    }

    /// Same configuration with a different poll policy
    pub const fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Same configuration with a different kernel link address
    pub const fn with_kernel_link_addr(mut self, addr: PhysAddr) -> Self {
        self.kernel_link_addr = addr;
        self
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unbounded_and_mib_aligned() {
        let config = ClusterConfig::default();
        assert_eq!(config.poll, PollPolicy::Unbounded);
        assert_eq!(config.peripheral_window.start % (1 << 20), 0);
        assert_eq!(config.shmem_window.size % (1 << 20), 0);
    }

    #[test]
    fn builder_overrides_single_fields() {
        let config = ClusterConfig::new()
            .with_poll(PollPolicy::Bounded { max_polls: 8 })
            .with_kernel_link_addr(0x9000_0000);
        assert_eq!(config.poll, PollPolicy::Bounded { max_polls: 8 });
        assert_eq!(config.kernel_link_addr, 0x9000_0000);
        assert_eq!(config.shmem_window, DEFAULT_SHMEM_WINDOW);
    }

    #[test]
    fn backend_name_is_one_of_the_four() {
        assert!(["llsc", "atld", "nps", "spinlock"].contains(&BACKEND_NAME));
    }
}
