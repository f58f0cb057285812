//! Global atomic-ops lock
//!
//! Cores without hardware atomics emulate every read-modify-write inside a
//! critical section guarded by `ATOMIC_OPS_LOCK` with local interrupts
//! disabled. The ATLD backend also takes it for plain stores.
//!
//! # Contract
//!
//! - Interrupts are disabled before the lock is taken, so an interrupt
//!   handler on the same core can never spin on a lock its own core holds.
//! - On release the lock is dropped first, then interrupts are restored.
//! - The lock is never held across anything but a load, an ALU op and a
//!   store.

#![deny(missing_docs)]

use spin::{Mutex, MutexGuard};

use crate::arch::{IrqControl, IrqSaveGuard};

/// Process-wide lock serializing emulated atomic operations
pub static ATOMIC_OPS_LOCK: Mutex<()> = Mutex::new(());

/// Held atomic-ops lock with local interrupts disabled
///
/// Field order matters: the lock guard is dropped before the interrupt
/// guard.
pub struct AtomicOpsGuard<I: IrqControl> {
    _lock: MutexGuard<'static, ()>,
    _irq: IrqSaveGuard<I>,
}

/// Disable local interrupts and take `ATOMIC_OPS_LOCK`
#[inline]
pub fn atomic_ops_lock<I: IrqControl>() -> AtomicOpsGuard<I> {
    let irq = IrqSaveGuard::new();
    let lock = ATOMIC_OPS_LOCK.lock();
    AtomicOpsGuard { _lock: lock, _irq: irq }
}
