//! Auxiliary register access
//!
//! ARC cores expose control registers in a separate "auxiliary" address
//! space reached with the `lr`/`sr` instructions. Boards that route the aux
//! space onto the system bus (and every simulator) can reach it as plain
//! memory; `MmioAux` covers that case. Ports that use the real instructions
//! implement `AuxRegisters` themselves.
//!
//! # Byte Order
//!
//! Register values are handled as native-endian `u32`. All field layouts in
//! this crate are defined as mask/shift on that integer value, so a
//! big-endian core needs no layout change, only this primitive.

#![deny(missing_docs)]
#![warn(clippy::undocumented_unsafe_blocks)]

/// Raw access to 32-bit auxiliary registers
pub trait AuxRegisters {
    /// Read an auxiliary register (`lr`)
    fn read_aux(&mut self, reg: u32) -> u32;

    /// Write an auxiliary register (`sr`)
    fn write_aux(&mut self, reg: u32, value: u32);
}

/// Memory-mapped view of the auxiliary register space
///
/// Register `n` lives at `base + n * 4`.
pub struct MmioAux {
    /// Base address of the mapped aux window
    base: usize,
}

impl MmioAux {
    /// Create a memory-mapped aux accessor
    ///
    /// # Safety
    ///
    /// `base` must point at a mapped aux window large enough for every
    /// register index that will be accessed, and nothing else may treat
    /// that memory as ordinary data.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    #[inline]
    fn reg_ptr(&self, reg: u32) -> *mut u32 {
        (self.base + reg as usize * core::mem::size_of::<u32>()) as *mut u32
    }
}

impl AuxRegisters for MmioAux {
    #[inline]
    fn read_aux(&mut self, reg: u32) -> u32 {
        // SAFETY: The constructor contract guarantees the window is mapped
        unsafe { self.reg_ptr(reg).read_volatile() }
    }

    #[inline]
    fn write_aux(&mut self, reg: u32, value: u32) {
        // SAFETY: The constructor contract guarantees the window is mapped
        unsafe { self.reg_ptr(reg).write_volatile(value) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mmio_aux_indexes_by_word() {
        let mut window = [0u32; 8];
        // SAFETY: The window is a live local array covering indices 0..8
        let mut aux = unsafe { MmioAux::new(window.as_mut_ptr() as usize) };

        aux.write_aux(3, 0xdead_beef);
        assert_eq!(aux.read_aux(3), 0xdead_beef);
        assert_eq!(aux.read_aux(2), 0);

        drop(aux);
        assert_eq!(window[3], 0xdead_beef);
    }
}
