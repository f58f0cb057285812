//! Atomic Operations Layer
//!
//! Read-modify-write primitives over a shared 32-bit counter. The same
//! operation set is implemented four ways; which one backs the crate-level
//! functions is fixed when the image is built:
//!
//! | Feature            | Backend      | Mechanism                                  |
//! |--------------------|--------------|--------------------------------------------|
//! | `backend-llsc`     | [`Llsc`]     | load-linked / store-conditional retry loop |
//! | `backend-atld`     | [`Atld`]     | single atomic load-modify instruction      |
//! | `backend-nps`      | [`Nps`]      | vendor atomic instruction, fenced by hand  |
//! | `backend-spinlock` | [`Emulated`] | global lock with interrupts disabled       |
//!
//! Consumers use the free functions (`add`, `fetch_or`, `dec_and_test`, ...)
//! and never see which backend is active. Every backend type is compiled in
//! all builds and can be named through [`Ops`], which is how the test suite
//! checks them side by side.
//!
//! # Ordering
//!
//! - `load`, `store` and `apply`: no ordering beyond the location itself
//! - value-returning RMW, `exchange`, `compare_exchange`: fully ordered
//!
//! Ordering across different locations needs `arch::barriers`.

#![deny(missing_docs)]

mod atld;
mod emulated;
mod generic;
mod llsc;
pub mod lock;
mod nps;
mod ops;

use core::fmt;
use core::sync::atomic::{AtomicI32, Ordering};

pub use atld::Atld;
pub use emulated::Emulated;
pub use generic::Ops;
pub use llsc::Llsc;
pub use nps::Nps;
pub use ops::{AluOp, HwOp};

static_assertions::assert_eq_size!(AtomicWord, i32);
static_assertions::assert_eq_align!(AtomicWord, i32);

/// A machine word updated only through the atomic layer
///
/// Layout is exactly an `i32`, so it can sit inside `#[repr(C)]` objects
/// shared with other code.
#[repr(transparent)]
pub struct AtomicWord {
    counter: AtomicI32,
}

impl AtomicWord {
    /// Create a word holding `value`
    pub const fn new(value: i32) -> Self {
        Self {
            counter: AtomicI32::new(value),
        }
    }

    /// Underlying cell, for backends only
    #[inline(always)]
    pub(crate) const fn cell(&self) -> &AtomicI32 {
        &self.counter
    }

    /// Consume the word and return its value
    pub fn into_inner(self) -> i32 {
        self.counter.into_inner()
    }
}

impl Default for AtomicWord {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for AtomicWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicWord")
            .field(&self.counter.load(Ordering::Relaxed))
            .finish()
    }
}

/// One implementation of the atomic contract
///
/// Implementors are zero-sized markers; all entry points are associated
/// functions so selection is purely static.
pub trait Backend {
    /// Short name, as exported by the build script
    const NAME: &'static str;

    /// Read the current value
    fn load(word: &AtomicWord) -> i32;

    /// Overwrite the value
    fn store(word: &AtomicWord, value: i32);

    /// `*word = op(*word, operand)`, unordered, no result
    fn apply(op: AluOp, word: &AtomicWord, operand: i32);

    /// Like `apply`, fully ordered, returns the old value
    fn fetch_apply(op: AluOp, word: &AtomicWord, operand: i32) -> i32;

    /// Like `apply`, fully ordered, returns the new value
    #[inline]
    fn apply_return(op: AluOp, word: &AtomicWord, operand: i32) -> i32 {
        op.eval(Self::fetch_apply(op, word, operand), operand)
    }

    /// Store `value`, returning the old value
    fn exchange(word: &AtomicWord, value: i32) -> i32;

    /// Store `new` if the value equals `expected`
    ///
    /// Returns `Ok(old)` on success, `Err(current)` otherwise.
    fn compare_exchange(word: &AtomicWord, expected: i32, new: i32) -> Result<i32, i32>;
}

/// Backend compiled into this image
#[cfg(feature = "backend-llsc")]
pub type ActiveBackend = Llsc;

/// Backend compiled into this image
#[cfg(feature = "backend-atld")]
pub type ActiveBackend = Atld<crate::arch::PlatformIrq>;

/// Backend compiled into this image
#[cfg(feature = "backend-nps")]
pub type ActiveBackend = Nps;

/// Backend compiled into this image
#[cfg(feature = "backend-spinlock")]
pub type ActiveBackend = Emulated<crate::arch::PlatformIrq>;

type Active = Ops<ActiveBackend>;

/// Read the current value
#[inline]
pub fn load(word: &AtomicWord) -> i32 {
    Active::load(word)
}

/// Overwrite the value
#[inline]
pub fn store(word: &AtomicWord, value: i32) {
    Active::store(word, value);
}

/// Apply `op` without returning anything
#[inline]
pub fn apply(op: AluOp, word: &AtomicWord, operand: i32) {
    Active::apply(op, word, operand);
}

/// Apply `op` and return the new value
#[inline]
pub fn apply_return(op: AluOp, word: &AtomicWord, operand: i32) -> i32 {
    Active::apply_return(op, word, operand)
}

/// Apply `op` and return the old value
#[inline]
pub fn fetch_apply(op: AluOp, word: &AtomicWord, operand: i32) -> i32 {
    Active::fetch_apply(op, word, operand)
}

/// Store `value`, returning the old value
#[inline]
pub fn exchange(word: &AtomicWord, value: i32) -> i32 {
    Active::exchange(word, value)
}

/// Store `new` if the value equals `expected`
#[inline]
pub fn compare_exchange(word: &AtomicWord, expected: i32, new: i32) -> Result<i32, i32> {
    Active::compare_exchange(word, expected, new)
}

macro_rules! active_op_fns {
    ($($op:ident, $op_return:ident, $fetch_op:ident;)*) => {
        $(
            #[doc = concat!("`", stringify!($op), "` without a result")]
            #[inline]
            pub fn $op(word: &AtomicWord, operand: i32) {
                Active::$op(word, operand);
            }

            #[doc = concat!("`", stringify!($op), "` returning the new value")]
            #[inline]
            pub fn $op_return(word: &AtomicWord, operand: i32) -> i32 {
                Active::$op_return(word, operand)
            }

            #[doc = concat!("`", stringify!($op), "` returning the old value")]
            #[inline]
            pub fn $fetch_op(word: &AtomicWord, operand: i32) -> i32 {
                Active::$fetch_op(word, operand)
            }
        )*
    };
}

active_op_fns! {
    add, add_return, fetch_add;
    sub, sub_return, fetch_sub;
    and, and_return, fetch_and;
    or, or_return, fetch_or;
    xor, xor_return, fetch_xor;
    andnot, andnot_return, fetch_andnot;
}

/// Increment by one
#[inline]
pub fn inc(word: &AtomicWord) {
    Active::inc(word);
}

/// Decrement by one
#[inline]
pub fn dec(word: &AtomicWord) {
    Active::dec(word);
}

/// Increment by one, returning the new value
#[inline]
pub fn inc_return(word: &AtomicWord) -> i32 {
    Active::inc_return(word)
}

/// Decrement by one, returning the new value
#[inline]
pub fn dec_return(word: &AtomicWord) -> i32 {
    Active::dec_return(word)
}

/// Add `a` unless the value is `unless`; returns the old value
#[inline]
pub fn fetch_add_unless(word: &AtomicWord, a: i32, unless: i32) -> i32 {
    Active::fetch_add_unless(word, a, unless)
}

/// Add `a` unless the value is `unless`; true if the add happened
#[inline]
pub fn add_unless(word: &AtomicWord, a: i32, unless: i32) -> bool {
    Active::add_unless(word, a, unless)
}

/// Increment unless the value is zero; true if incremented
#[inline]
pub fn inc_not_zero(word: &AtomicWord) -> bool {
    Active::inc_not_zero(word)
}

/// Decrement only if the result stays non-negative; returns old - 1
#[inline]
pub fn dec_if_positive(word: &AtomicWord) -> i32 {
    Active::dec_if_positive(word)
}

/// Decrement and report whether the result is zero
#[inline]
pub fn dec_and_test(word: &AtomicWord) -> bool {
    Active::dec_and_test(word)
}

/// Subtract and report whether the result is zero
#[inline]
pub fn sub_and_test(word: &AtomicWord, operand: i32) -> bool {
    Active::sub_and_test(word, operand)
}

/// Increment and report whether the result is zero
#[inline]
pub fn inc_and_test(word: &AtomicWord) -> bool {
    Active::inc_and_test(word)
}

/// Add and report whether the result is negative
#[inline]
pub fn add_negative(word: &AtomicWord, operand: i32) -> bool {
    Active::add_negative(word, operand)
}
