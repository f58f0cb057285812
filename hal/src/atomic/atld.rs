//! Atomic load-modify backend
//!
//! ARCv3 cores provide `atld.<op>` which reads the old value, applies the
//! ALU operation and writes the result back in one instruction, so there is
//! no retry loop. Only add/and/or/xor are encoded; `sub` and `andnot` are
//! lowered onto add/and (see `AluOp::lower`).
//!
//! Plain stores go through the global atomic-ops lock, with local
//! interrupts masked through `I`, so that a store can never land in the
//! middle of a locked sequence elsewhere in the image.

use core::marker::PhantomData;
use core::sync::atomic::{AtomicI32, Ordering};

use super::lock::atomic_ops_lock;
use super::{AluOp, AtomicWord, Backend, HwOp};
use crate::arch::{IrqControl, PlatformIrq};

/// ATLD backend marker, generic over interrupt control for the store path
pub struct Atld<I: IrqControl = PlatformIrq>(PhantomData<I>);

/// Issue one atomic load-modify instruction, returning the old value
#[inline(always)]
pub(super) fn atomic_load_modify(cell: &AtomicI32, op: HwOp, operand: i32, order: Ordering) -> i32 {
    match op {
        HwOp::Add => cell.fetch_add(operand, order),
        HwOp::And => cell.fetch_and(operand, order),
        HwOp::Or => cell.fetch_or(operand, order),
        HwOp::Xor => cell.fetch_xor(operand, order),
    }
}

impl<I: IrqControl> Backend for Atld<I> {
    const NAME: &'static str = "atld";

    #[inline(always)]
    fn load(word: &AtomicWord) -> i32 {
        word.cell().load(Ordering::Relaxed)
    }

    #[inline]
    fn store(word: &AtomicWord, value: i32) {
        let _guard = atomic_ops_lock::<I>();
        word.cell().store(value, Ordering::Relaxed);
    }

    #[inline(always)]
    fn apply(op: AluOp, word: &AtomicWord, operand: i32) {
        let (hw, operand) = op.lower(operand);
        atomic_load_modify(word.cell(), hw, operand, Ordering::Relaxed);
    }

    #[inline(always)]
    fn fetch_apply(op: AluOp, word: &AtomicWord, operand: i32) -> i32 {
        let (hw, operand) = op.lower(operand);
        atomic_load_modify(word.cell(), hw, operand, Ordering::SeqCst)
    }

    #[inline(always)]
    fn exchange(word: &AtomicWord, value: i32) -> i32 {
        word.cell().swap(value, Ordering::SeqCst)
    }

    #[inline]
    fn compare_exchange(word: &AtomicWord, expected: i32, new: i32) -> Result<i32, i32> {
        word.cell()
            .compare_exchange(expected, new, Ordering::SeqCst, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::IrqFlags;
    use core::sync::atomic::{AtomicBool, AtomicUsize};

    type Host = Atld<PlatformIrq>;

    static SAVES: AtomicUsize = AtomicUsize::new(0);
    static RESTORES: AtomicUsize = AtomicUsize::new(0);
    static MASKED: AtomicBool = AtomicBool::new(false);

    struct CountingIrq;

    impl IrqControl for CountingIrq {
        fn local_irq_save() -> IrqFlags {
            SAVES.fetch_add(1, Ordering::SeqCst);
            IrqFlags(usize::from(!MASKED.swap(true, Ordering::SeqCst)))
        }

        fn local_irq_restore(flags: IrqFlags) {
            RESTORES.fetch_add(1, Ordering::SeqCst);
            MASKED.store(flags.0 == 0, Ordering::SeqCst);
        }
    }

    #[test]
    fn sub_is_lowered_to_negated_add() {
        let word = AtomicWord::new(0);
        assert_eq!(Host::fetch_apply(AluOp::Sub, &word, i32::MIN), 0);
        // -i32::MIN wraps to itself
        assert_eq!(Host::load(&word), i32::MIN);
    }

    #[test]
    fn andnot_is_lowered_to_and() {
        let word = AtomicWord::new(-1);
        assert_eq!(Host::apply_return(AluOp::AndNot, &word, 0xff), !0xff);
    }

    #[test]
    fn locked_store_round_trips() {
        let word = AtomicWord::new(0);
        Host::store(&word, 77);
        assert_eq!(Host::load(&word), 77);
    }

    #[test]
    fn store_masks_irqs_only_for_the_store() {
        type Counted = Atld<CountingIrq>;
        let word = AtomicWord::new(0);

        Counted::apply(AluOp::Add, &word, 4);
        assert_eq!(Counted::fetch_apply(AluOp::Or, &word, 1), 4);
        assert_eq!(SAVES.load(Ordering::SeqCst), 0);

        Counted::store(&word, 9);
        assert_eq!(Counted::load(&word), 9);
        assert_eq!(SAVES.load(Ordering::SeqCst), 1);
        assert_eq!(RESTORES.load(Ordering::SeqCst), 1);
        assert!(!MASKED.load(Ordering::SeqCst));
    }
}
