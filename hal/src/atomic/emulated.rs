//! Lock-emulated backend
//!
//! For cores with no atomic instructions at all. Each operation runs as a
//! plain load, ALU op and store inside `ATOMIC_OPS_LOCK` with local
//! interrupts masked through `I`. Correctness comes entirely from mutual
//! exclusion, so every writer of a word must go through this backend,
//! stores included.
//!
//! Value-returning operations additionally issue a full barrier before and
//! after the critical section.

use core::marker::PhantomData;
use core::sync::atomic::Ordering;

use super::lock::atomic_ops_lock;
use super::{AluOp, AtomicWord, Backend};
use crate::arch::barriers::smp_mb;
use crate::arch::{IrqControl, PlatformIrq};

/// Lock-emulated backend marker, generic over interrupt control
pub struct Emulated<I: IrqControl = PlatformIrq>(PhantomData<I>);

impl<I: IrqControl> Emulated<I> {
    /// Locked load / compute / store; returns `(old, new)`
    #[inline(always)]
    fn locked<F>(word: &AtomicWord, update: F) -> (i32, i32)
    where
        F: FnOnce(i32) -> i32,
    {
        let _guard = atomic_ops_lock::<I>();
        let cell = word.cell();
        let old = cell.load(Ordering::Relaxed);
        let new = update(old);
        cell.store(new, Ordering::Relaxed);
        (old, new)
    }

    #[inline(always)]
    fn fenced<F>(word: &AtomicWord, update: F) -> (i32, i32)
    where
        F: FnOnce(i32) -> i32,
    {
        smp_mb();
        let result = Self::locked(word, update);
        smp_mb();
        result
    }
}

impl<I: IrqControl> Backend for Emulated<I> {
    const NAME: &'static str = "spinlock";

    #[inline(always)]
    fn load(word: &AtomicWord) -> i32 {
        word.cell().load(Ordering::Relaxed)
    }

    #[inline]
    fn store(word: &AtomicWord, value: i32) {
        let _guard = atomic_ops_lock::<I>();
        word.cell().store(value, Ordering::Relaxed);
    }

    #[inline]
    fn apply(op: AluOp, word: &AtomicWord, operand: i32) {
        Self::locked(word, |old| op.eval(old, operand));
    }

    #[inline]
    fn fetch_apply(op: AluOp, word: &AtomicWord, operand: i32) -> i32 {
        Self::fenced(word, |old| op.eval(old, operand)).0
    }

    #[inline]
    fn apply_return(op: AluOp, word: &AtomicWord, operand: i32) -> i32 {
        Self::fenced(word, |old| op.eval(old, operand)).1
    }

    #[inline]
    fn exchange(word: &AtomicWord, value: i32) -> i32 {
        Self::fenced(word, |_| value).0
    }

    fn compare_exchange(word: &AtomicWord, expected: i32, new: i32) -> Result<i32, i32> {
        let (old, _) = Self::fenced(word, |old| if old == expected { new } else { old });
        if old == expected { Ok(old) } else { Err(old) }
    }
}
