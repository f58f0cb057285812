//! Cluster register map
//!
//! Two address spaces are involved:
//!
//! - **Aux registers** of the core: the cluster build-configuration
//!   register and the indirect access pair `CLNR_ADDR` / `CLNR_DATA`.
//! - **Cluster registers**, only reachable through that pair: the NoC
//!   master windows, peripheral and shared-memory apertures, and the SCM
//!   command/status block.
//!
//! Indices and bit positions are fixed by the hardware. Fields are
//! accessed with explicit masks and shifts on the raw `u32`.
//!
//! ```text
//! CLNR_BCR_0     [7:0]  version (0 = no cluster)   [15:8] cores - 1
//! CACHE_STATUS   [23] BUSY  [24] DONE  [26] MASK  [27] EN
//! CACHE_CMD      [3:0] op (1 inv, 2 clean, 3 clean+inv)   [4] ADDR range
//! ```

#![deny(missing_docs)]

use bitflags::bitflags;
use static_assertions::const_assert;

/// Indirect access: cluster register index
pub const ARC_REG_CLNR_ADDR: u32 = 0x640;
/// Indirect access: data of the selected cluster register
pub const ARC_REG_CLNR_DATA: u32 = 0x641;
/// Indirect access: data of the next cluster register (auto-increment)
pub const ARC_REG_CLNR_DATA_NXT: u32 = 0x642;
/// Cluster build-configuration register
pub const ARC_REG_CLNR_BCR_0: u32 = 0xF61;

/// NoC master port 0 build configuration
pub const CLN_MST_NOC_0_BCR: u32 = 0;
/// NoC master port 0, window 0 base (MiB units)
pub const CLN_MST_NOC_0_0_ADDR: u32 = 292;
/// NoC master port 0, window 0 size (MiB units)
pub const CLN_MST_NOC_0_0_SIZE: u32 = 293;

/// Peripheral aperture base (MiB units)
pub const CLN_PER_0_BASE: u32 = 2688;
/// Peripheral aperture size (MiB units)
pub const CLN_PER_0_SIZE: u32 = 2689;

/// Shared memory base (MiB units)
pub const CLN_SHMEM_ADDR: u32 = 2696;
/// Shared memory size (MiB units)
pub const CLN_SHMEM_SIZE: u32 = 2697;

/// SCM status register
pub const CLN_CACHE_STATUS: u32 = 1024;
/// SCM command register
pub const CLN_CACHE_CMD: u32 = 1025;
/// SCM range start, low 32 bits
pub const CLN_CACHE_ADDR_LO0: u32 = 1026;
/// SCM range start, high 32 bits
pub const CLN_CACHE_ADDR_LO1: u32 = 1027;
/// SCM range end, low 32 bits
pub const CLN_CACHE_ADDR_HI0: u32 = 1028;
/// SCM range end, high 32 bits
pub const CLN_CACHE_ADDR_HI1: u32 = 1029;

/// Window registers count in 1 MiB units
pub const WINDOW_SHIFT: u32 = 20;

/// SCM line size in bytes
pub const SCM_LINE_SIZE: u64 = 64;

const_assert!(CLN_CACHE_ADDR_LO1 == CLN_CACHE_ADDR_LO0 + 1);
const_assert!(CLN_CACHE_ADDR_HI0 == CLN_CACHE_ADDR_LO1 + 1);
const_assert!(CLN_CACHE_ADDR_HI1 == CLN_CACHE_ADDR_HI0 + 1);
const_assert!(SCM_LINE_SIZE.is_power_of_two());

const BCR_VERSION_MASK: u32 = 0xff;
const BCR_CORES_SHIFT: u32 = 8;
const BCR_CORES_MASK: u32 = 0xff;

/// Version field of `CLNR_BCR_0`, zero when there is no cluster
#[inline]
pub const fn bcr_version(bcr: u32) -> u8 {
    (bcr & BCR_VERSION_MASK) as u8
}

/// Number of cores described by `CLNR_BCR_0`
#[inline]
pub const fn bcr_num_cores(bcr: u32) -> u32 {
    ((bcr >> BCR_CORES_SHIFT) & BCR_CORES_MASK) + 1
}

/// Build a `CLNR_BCR_0` value
#[inline]
pub const fn bcr_encode(version: u8, num_cores: u32) -> u32 {
    version as u32 | ((num_cores.saturating_sub(1) & BCR_CORES_MASK) << BCR_CORES_SHIFT)
}

bitflags! {
    /// `CACHE_STATUS` bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ScmStatus: u32 {
        /// A command is in progress
        const BUSY = 1 << 23;
        /// The last command completed
        const DONE = 1 << 24;
        /// Completion interrupt masked
        const MASK = 1 << 26;
        /// SCM enabled
        const EN = 1 << 27;
    }
}

impl ScmStatus {
    /// Bits owned by hardware, ignored on write
    pub const HW_OWNED: Self = Self::BUSY.union(Self::DONE);
}

/// SCM maintenance operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CacheOp {
    /// Drop lines without writing them back
    Invalidate = 1,
    /// Write dirty lines back, keep them valid
    Clean = 2,
    /// Write dirty lines back and drop them
    CleanInvalidate = 3,
}

impl CacheOp {
    /// Decode the op field of a command word
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            1 => Some(Self::Invalidate),
            2 => Some(Self::Clean),
            3 => Some(Self::CleanInvalidate),
            _ => None,
        }
    }
}

const CMD_OP_MASK: u32 = 0xf;
const CMD_ADDR: u32 = 1 << 4;

/// `CACHE_CMD` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScmCommand(u32);

impl ScmCommand {
    /// Command over the whole SCM
    pub const fn all(op: CacheOp) -> Self {
        Self(op as u32)
    }

    /// Command over the range held in the `CACHE_ADDR_*` registers
    pub const fn range(op: CacheOp) -> Self {
        Self(op as u32 | CMD_ADDR)
    }

    /// Wrap a raw register value
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw register value
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Operation field
    pub const fn op(self) -> Option<CacheOp> {
        CacheOp::from_bits(self.0 & CMD_OP_MASK)
    }

    /// Whether the command uses the address range registers
    pub const fn is_range(self) -> bool {
        self.0 & CMD_ADDR != 0
    }
}

/// Split a 64-bit address into its (low, high) 32-bit register halves
#[inline]
pub const fn split_addr(addr: u64) -> (u32, u32) {
    (addr as u32, (addr >> 32) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bcr_fields() {
        let bcr = bcr_encode(3, 4);
        assert_eq!(bcr_version(bcr), 3);
        assert_eq!(bcr_num_cores(bcr), 4);
        assert_eq!(bcr_version(0), 0);
    }

    #[test]
    fn command_encoding() {
        let cmd = ScmCommand::range(CacheOp::CleanInvalidate);
        assert_eq!(cmd.bits(), 0x13);
        assert_eq!(cmd.op(), Some(CacheOp::CleanInvalidate));
        assert!(cmd.is_range());

        let inv = ScmCommand::all(CacheOp::Invalidate);
        assert_eq!(inv.bits(), 1);
        assert!(!inv.is_range());
        assert_eq!(ScmCommand::from_raw(0).op(), None);
    }

    #[test]
    fn status_bit_positions() {
        assert_eq!(ScmStatus::BUSY.bits(), 0x0080_0000);
        assert_eq!(ScmStatus::EN.bits(), 0x0800_0000);
        assert!(!ScmStatus::HW_OWNED.contains(ScmStatus::EN));
    }

    #[test]
    fn address_split() {
        assert_eq!(split_addr(0x1000), (0x1000, 0));
        assert_eq!(split_addr(0x12_3456_7890), (0x3456_7890, 0x12));
    }
}
