//! Architecture Abstraction Layer
//!
//! This module provides the CPU-facing primitives the rest of the HAL is
//! built on. It defines the interfaces that a target port must provide,
//! allowing the atomic layer and the cluster controller to stay
//! target-agnostic while being resolved statically for each image.
//!
//! # Provided Primitives
//!
//! - Memory barriers (`barriers`)
//! - Local interrupt masking (`IrqControl`)
//! - Auxiliary register access (`aux_regs`)
//! - Physical memory map description (`MemoryRegion`)
//!
//! # Design Principles
//! - Minimal abstraction overhead
//! - Static dispatch only, hardware facts are fixed for the whole image
//! - Safe abstractions over unsafe hardware operations

#![deny(missing_docs)]
#![warn(clippy::undocumented_unsafe_blocks)]

pub mod aux_regs;
pub mod barriers;

/// Physical address as seen by the cluster (40-bit capable on ARCv3)
pub type PhysAddr = u64;

/// Saved local interrupt state, opaque to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqFlags(pub usize);

/// Local interrupt control for the current core
///
/// Implementations mask interrupts on the calling core and hand back the
/// previous state so nested critical sections restore correctly.
pub trait IrqControl {
    /// Save the current interrupt state and disable local interrupts
    fn local_irq_save() -> IrqFlags;

    /// Restore a previously saved interrupt state
    fn local_irq_restore(flags: IrqFlags);
}

/// Interrupt control for hosted builds
///
/// A host process has no interrupts to mask, so saving and restoring are
/// no-ops. Target builds enable `irq-extern` to use `ExternIrq` instead.
pub struct HostIrq;

impl IrqControl for HostIrq {
    #[inline]
    fn local_irq_save() -> IrqFlags {
        IrqFlags(0)
    }

    #[inline]
    fn local_irq_restore(_flags: IrqFlags) {}
}

#[cfg(feature = "irq-extern")]
unsafe extern "C" {
    fn arc_hal_local_irq_save() -> usize;
    fn arc_hal_local_irq_restore(flags: usize);
}

/// Interrupt control supplied by the board port
///
/// The port links two symbols, normally thin wrappers around `clri` and
/// `seti`:
///
/// ```text
/// extern "C" fn arc_hal_local_irq_save() -> usize
/// extern "C" fn arc_hal_local_irq_restore(flags: usize)
/// ```
#[cfg(feature = "irq-extern")]
pub struct ExternIrq;

#[cfg(feature = "irq-extern")]
impl IrqControl for ExternIrq {
    #[inline]
    fn local_irq_save() -> IrqFlags {
        // SAFETY: the port contract is that this only masks interrupts on
        // the calling core and returns the previous state.
        IrqFlags(unsafe { arc_hal_local_irq_save() })
    }

    #[inline]
    fn local_irq_restore(flags: IrqFlags) {
        // SAFETY: `flags` came from `arc_hal_local_irq_save` on this core.
        unsafe { arc_hal_local_irq_restore(flags.0) }
    }
}

/// Interrupt control used by the lock-based atomic paths
#[cfg(not(feature = "irq-extern"))]
pub type PlatformIrq = HostIrq;

/// Interrupt control used by the lock-based atomic paths
#[cfg(feature = "irq-extern")]
pub type PlatformIrq = ExternIrq;

/// RAII guard that keeps local interrupts disabled while alive
pub struct IrqSaveGuard<I: IrqControl> {
    flags: IrqFlags,
    _irq: core::marker::PhantomData<I>,
}

impl<I: IrqControl> IrqSaveGuard<I> {
    /// Disable local interrupts, remembering the previous state
    #[inline]
    pub fn new() -> Self {
        Self {
            flags: I::local_irq_save(),
            _irq: core::marker::PhantomData,
        }
    }
}

impl<I: IrqControl> Default for IrqSaveGuard<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: IrqControl> Drop for IrqSaveGuard<I> {
    #[inline]
    fn drop(&mut self) {
        I::local_irq_restore(self.flags);
    }
}

/// Physical memory region descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    /// Start address of the region
    pub start: PhysAddr,
    /// Size of the region in bytes
    pub size: u64,
}

impl MemoryRegion {
    /// Create a new region descriptor
    pub const fn new(start: PhysAddr, size: u64) -> Self {
        Self { start, size }
    }

    /// End address (exclusive), saturating at the top of the address space
    pub const fn end(&self) -> PhysAddr {
        self.start.saturating_add(self.size)
    }

    /// Check if an address belongs to this region
    pub const fn contains(&self, addr: PhysAddr) -> bool {
        addr >= self.start && addr < self.end()
    }
}
