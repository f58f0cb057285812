//! Memory barrier implementations
//!
//! The atomic layer only orders accesses to a single location. Code that
//! needs one core's writes to different locations observed in order by
//! another core brackets them with these barriers.
//!
//! On ARC the full barrier is `dmb 3` and the read/write variants are
//! `dmb 1` / `dmb 2`; those are exactly what `fence` lowers to for the
//! corresponding orderings, so the portable fences are used here.

#![deny(missing_docs)]

use core::sync::atomic::{Ordering, compiler_fence, fence};

/// Full memory barrier
#[inline(always)]
pub fn mb() {
    fence(Ordering::SeqCst);
}

/// Read memory barrier, orders earlier loads before later loads
#[inline(always)]
pub fn rmb() {
    fence(Ordering::Acquire);
}

/// Write memory barrier, orders earlier stores before later stores
#[inline(always)]
pub fn wmb() {
    fence(Ordering::Release);
}

/// Full barrier between cores
#[inline(always)]
pub fn smp_mb() {
    mb();
}

/// Read barrier between cores
#[inline(always)]
pub fn smp_rmb() {
    rmb();
}

/// Write barrier between cores
#[inline(always)]
pub fn smp_wmb() {
    wmb();
}

/// Compiler-only barrier, emits no instruction
#[inline(always)]
pub fn barrier() {
    compiler_fence(Ordering::SeqCst);
}
