//! NPS vendor atomic backend
//!
//! The NPS-400 adds a custom `atomic` instruction that applies add/and/or/
//! xor to a memory word addressed through two scratch registers. The
//! instruction carries no ordering at all, so every value-returning
//! operation is bracketed by a full barrier on both sides:
//!
//! ```text
//!     dmb     3
//!     atomic  <op>, old, [word], operand
//!     dmb     3
//! ```
//!
//! `apply` is left unfenced, like every other backend's `apply`.

use core::sync::atomic::Ordering;

use super::atld::atomic_load_modify;
use super::{AluOp, AtomicWord, Backend};
use crate::arch::barriers::smp_mb;

/// NPS backend marker
pub struct Nps;

impl Backend for Nps {
    const NAME: &'static str = "nps";

    #[inline(always)]
    fn load(word: &AtomicWord) -> i32 {
        word.cell().load(Ordering::Relaxed)
    }

    #[inline(always)]
    fn store(word: &AtomicWord, value: i32) {
        word.cell().store(value, Ordering::Relaxed);
    }

    #[inline(always)]
    fn apply(op: AluOp, word: &AtomicWord, operand: i32) {
        let (hw, operand) = op.lower(operand);
        atomic_load_modify(word.cell(), hw, operand, Ordering::Relaxed);
    }

    #[inline]
    fn fetch_apply(op: AluOp, word: &AtomicWord, operand: i32) -> i32 {
        let (hw, operand) = op.lower(operand);
        smp_mb();
        let old = atomic_load_modify(word.cell(), hw, operand, Ordering::Relaxed);
        smp_mb();
        old
    }

    #[inline]
    fn exchange(word: &AtomicWord, value: i32) -> i32 {
        smp_mb();
        let old = word.cell().swap(value, Ordering::Relaxed);
        smp_mb();
        old
    }

    #[inline]
    fn compare_exchange(word: &AtomicWord, expected: i32, new: i32) -> Result<i32, i32> {
        smp_mb();
        let result = word
            .cell()
            .compare_exchange(expected, new, Ordering::Relaxed, Ordering::Relaxed);
        smp_mb();
        result
    }
}
