//! Backend-independent atomic API
//!
//! `Ops<B>` turns the small `Backend` contract into the full operation set.
//! The conditional helpers (`fetch_add_unless`, `dec_if_positive`, ...) are
//! written only in terms of `load` and `compare_exchange`, so they behave
//! the same on every backend.

use core::marker::PhantomData;

use super::{AluOp, AtomicWord, Backend};

/// Full atomic API over backend `B`
pub struct Ops<B: Backend>(PhantomData<B>);

macro_rules! op_fns {
    ($($alu:ident => $op:ident, $op_return:ident, $fetch_op:ident;)*) => {
        $(
            #[doc = concat!("`", stringify!($op), "` without a result")]
            #[inline(always)]
            pub fn $op(word: &AtomicWord, operand: i32) {
                B::apply(AluOp::$alu, word, operand);
            }

            #[doc = concat!("`", stringify!($op), "` returning the new value")]
            #[inline(always)]
            pub fn $op_return(word: &AtomicWord, operand: i32) -> i32 {
                B::apply_return(AluOp::$alu, word, operand)
            }

            #[doc = concat!("`", stringify!($op), "` returning the old value")]
            #[inline(always)]
            pub fn $fetch_op(word: &AtomicWord, operand: i32) -> i32 {
                B::fetch_apply(AluOp::$alu, word, operand)
            }
        )*
    };
}

impl<B: Backend> Ops<B> {
    /// Backend name
    pub const NAME: &'static str = B::NAME;

    /// Read the current value
    #[inline(always)]
    pub fn load(word: &AtomicWord) -> i32 {
        B::load(word)
    }

    /// Overwrite the value
    #[inline(always)]
    pub fn store(word: &AtomicWord, value: i32) {
        B::store(word, value);
    }

    /// Apply `op` without returning anything
    #[inline(always)]
    pub fn apply(op: AluOp, word: &AtomicWord, operand: i32) {
        B::apply(op, word, operand);
    }

    /// Apply `op` and return the new value
    #[inline(always)]
    pub fn apply_return(op: AluOp, word: &AtomicWord, operand: i32) -> i32 {
        B::apply_return(op, word, operand)
    }

    /// Apply `op` and return the old value
    #[inline(always)]
    pub fn fetch_apply(op: AluOp, word: &AtomicWord, operand: i32) -> i32 {
        B::fetch_apply(op, word, operand)
    }

    /// Store `value`, returning the old value
    #[inline(always)]
    pub fn exchange(word: &AtomicWord, value: i32) -> i32 {
        B::exchange(word, value)
    }

    /// Store `new` if the value equals `expected`
    #[inline(always)]
    pub fn compare_exchange(word: &AtomicWord, expected: i32, new: i32) -> Result<i32, i32> {
        B::compare_exchange(word, expected, new)
    }

    op_fns! {
        Add => add, add_return, fetch_add;
        Sub => sub, sub_return, fetch_sub;
        And => and, and_return, fetch_and;
        Or => or, or_return, fetch_or;
        Xor => xor, xor_return, fetch_xor;
        AndNot => andnot, andnot_return, fetch_andnot;
    }

    /// Increment by one
    #[inline(always)]
    pub fn inc(word: &AtomicWord) {
        Self::add(word, 1);
    }

    /// Decrement by one
    #[inline(always)]
    pub fn dec(word: &AtomicWord) {
        Self::sub(word, 1);
    }

    /// Increment by one, returning the new value
    #[inline(always)]
    pub fn inc_return(word: &AtomicWord) -> i32 {
        Self::add_return(word, 1)
    }

    /// Decrement by one, returning the new value
    #[inline(always)]
    pub fn dec_return(word: &AtomicWord) -> i32 {
        Self::sub_return(word, 1)
    }

    /// Increment by one, returning the old value
    #[inline(always)]
    pub fn fetch_inc(word: &AtomicWord) -> i32 {
        Self::fetch_add(word, 1)
    }

    /// Decrement by one, returning the old value
    #[inline(always)]
    pub fn fetch_dec(word: &AtomicWord) -> i32 {
        Self::fetch_sub(word, 1)
    }

    /// Add `a` unless the value is `unless`; returns the old value
    pub fn fetch_add_unless(word: &AtomicWord, a: i32, unless: i32) -> i32 {
        let mut cur = B::load(word);
        while cur != unless {
            match B::compare_exchange(word, cur, cur.wrapping_add(a)) {
                Ok(_) => break,
                Err(now) => cur = now,
            }
        }
        cur
    }

    /// Add `a` unless the value is `unless`; true if the add happened
    #[inline]
    pub fn add_unless(word: &AtomicWord, a: i32, unless: i32) -> bool {
        Self::fetch_add_unless(word, a, unless) != unless
    }

    /// Increment unless the value is zero; true if incremented
    #[inline]
    pub fn inc_not_zero(word: &AtomicWord) -> bool {
        Self::add_unless(word, 1, 0)
    }

    /// Decrement only if the result stays non-negative
    ///
    /// Returns the old value minus one whether or not the store happened,
    /// so a negative result means the word was left untouched.
    pub fn dec_if_positive(word: &AtomicWord) -> i32 {
        let mut cur = B::load(word);
        loop {
            let dec = cur.wrapping_sub(1);
            if dec < 0 {
                return dec;
            }
            match B::compare_exchange(word, cur, dec) {
                Ok(_) => return dec,
                Err(now) => cur = now,
            }
        }
    }

    /// Subtract and report whether the result is zero
    #[inline]
    pub fn sub_and_test(word: &AtomicWord, operand: i32) -> bool {
        Self::sub_return(word, operand) == 0
    }

    /// Decrement and report whether the result is zero
    #[inline]
    pub fn dec_and_test(word: &AtomicWord) -> bool {
        Self::dec_return(word) == 0
    }

    /// Increment and report whether the result is zero
    #[inline]
    pub fn inc_and_test(word: &AtomicWord) -> bool {
        Self::inc_return(word) == 0
    }

    /// Add and report whether the result is negative
    #[inline]
    pub fn add_negative(word: &AtomicWord, operand: i32) -> bool {
        Self::add_return(word, operand) < 0
    }
}
