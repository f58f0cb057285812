//! Load-linked / store-conditional backend
//!
//! ```text
//! 1:  llock   old, [word]
//!     <op>    new, old, operand
//!     scond   new, [word]
//!     bnz     1b              ; reservation lost, retry
//! ```
//!
//! The reservation is modelled with a weak compare-exchange against the
//! linked value, which is what LL/SC hardware compiles it to. A failed
//! store-conditional means another core wrote the word in between.
//!
//! # Forward Progress
//!
//! The retry loop is unbounded. Progress relies on the interconnect
//! granting reservations fairly; under heavy contention a core could in
//! principle keep losing. Failed attempts back off exponentially (capped at
//! `MAX_BACKOFF_SPINS`) to give the winner time to retire its store.

use core::hint::spin_loop;
use core::sync::atomic::{AtomicI32, Ordering};

use super::{AluOp, AtomicWord, Backend};

/// Upper bound on spin iterations between two attempts
pub const MAX_BACKOFF_SPINS: u32 = 64;

/// Exponential backoff between failed store-conditionals
struct Backoff {
    spins: u32,
}

impl Backoff {
    const fn new() -> Self {
        Self { spins: 1 }
    }

    #[inline]
    fn snooze(&mut self) {
        for _ in 0..self.spins {
            spin_loop();
        }
        self.spins = (self.spins * 2).min(MAX_BACKOFF_SPINS);
    }
}

/// LLSC backend marker
pub struct Llsc;

impl Llsc {
    #[inline(always)]
    fn load_linked(cell: &AtomicI32) -> i32 {
        cell.load(Ordering::Relaxed)
    }

    #[inline(always)]
    fn store_conditional(cell: &AtomicI32, linked: i32, new: i32, order: Ordering) -> bool {
        cell.compare_exchange_weak(linked, new, order, Ordering::Relaxed)
            .is_ok()
    }

    /// Retry until `update(old)` is stored; returns `(old, new)`
    #[inline(always)]
    fn retry<F>(word: &AtomicWord, order: Ordering, update: F) -> (i32, i32)
    where
        F: Fn(i32) -> i32,
    {
        let cell = word.cell();
        let mut backoff = Backoff::new();
        loop {
            let old = Self::load_linked(cell);
            let new = update(old);
            if Self::store_conditional(cell, old, new, order) {
                return (old, new);
            }
            backoff.snooze();
        }
    }
}

impl Backend for Llsc {
    const NAME: &'static str = "llsc";

    #[inline(always)]
    fn load(word: &AtomicWord) -> i32 {
        word.cell().load(Ordering::Relaxed)
    }

    #[inline(always)]
    fn store(word: &AtomicWord, value: i32) {
        word.cell().store(value, Ordering::Relaxed);
    }

    #[inline]
    fn apply(op: AluOp, word: &AtomicWord, operand: i32) {
        Self::retry(word, Ordering::Relaxed, |old| op.eval(old, operand));
    }

    #[inline]
    fn fetch_apply(op: AluOp, word: &AtomicWord, operand: i32) -> i32 {
        Self::retry(word, Ordering::SeqCst, |old| op.eval(old, operand)).0
    }

    #[inline]
    fn apply_return(op: AluOp, word: &AtomicWord, operand: i32) -> i32 {
        Self::retry(word, Ordering::SeqCst, |old| op.eval(old, operand)).1
    }

    #[inline]
    fn exchange(word: &AtomicWord, value: i32) -> i32 {
        Self::retry(word, Ordering::SeqCst, |_| value).0
    }

    fn compare_exchange(word: &AtomicWord, expected: i32, new: i32) -> Result<i32, i32> {
        let cell = word.cell();
        let mut backoff = Backoff::new();
        loop {
            let old = Self::load_linked(cell);
            if old != expected {
                return Err(old);
            }
            if Self::store_conditional(cell, old, new, Ordering::SeqCst) {
                return Ok(old);
            }
            backoff.snooze();
        }
    }
}
