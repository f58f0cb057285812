//! Cluster register access
//!
//! `ClusterBus` is what the controller talks to. On hardware it is an
//! `IndirectBus`: select a cluster register by writing its index to
//! `CLNR_ADDR`, then move the value through `CLNR_DATA`. That pair is a
//! single shared window per core, so a read or write is two aux accesses
//! that must not be interleaved with another user on the same core.

#![deny(missing_docs)]

use super::regs::{ARC_REG_CLNR_ADDR, ARC_REG_CLNR_BCR_0, ARC_REG_CLNR_DATA};
use crate::arch::aux_regs::AuxRegisters;

/// Access to the cluster register file
pub trait ClusterBus {
    /// Read the cluster build-configuration register
    fn read_build_config(&mut self) -> u32;

    /// Read a cluster register
    fn read(&mut self, reg: u32) -> u32;

    /// Write a cluster register
    fn write(&mut self, reg: u32, value: u32);
}

/// Cluster registers reached through the `CLNR_ADDR` / `CLNR_DATA` pair
pub struct IndirectBus<A: AuxRegisters> {
    aux: A,
}

impl<A: AuxRegisters> IndirectBus<A> {
    /// Wrap an aux register accessor
    pub const fn new(aux: A) -> Self {
        Self { aux }
    }

    /// Aux accessor, for board-level fixups
    pub fn aux_mut(&mut self) -> &mut A {
        &mut self.aux
    }

    /// Release the aux accessor
    pub fn into_inner(self) -> A {
        self.aux
    }
}

impl<A: AuxRegisters> ClusterBus for IndirectBus<A> {
    #[inline]
    fn read_build_config(&mut self) -> u32 {
        self.aux.read_aux(ARC_REG_CLNR_BCR_0)
    }

    #[inline]
    fn read(&mut self, reg: u32) -> u32 {
        self.aux.write_aux(ARC_REG_CLNR_ADDR, reg);
        self.aux.read_aux(ARC_REG_CLNR_DATA)
    }

    #[inline]
    fn write(&mut self, reg: u32, value: u32) {
        self.aux.write_aux(ARC_REG_CLNR_ADDR, reg);
        self.aux.write_aux(ARC_REG_CLNR_DATA, value);
    }
}

impl<B: ClusterBus + ?Sized> ClusterBus for &mut B {
    #[inline]
    fn read_build_config(&mut self) -> u32 {
        (**self).read_build_config()
    }

    #[inline]
    fn read(&mut self, reg: u32) -> u32 {
        (**self).read(reg)
    }

    #[inline]
    fn write(&mut self, reg: u32, value: u32) {
        (**self).write(reg, value);
    }
}
