//! Programmer-visible register file.

use crate::Flags;

/// 6502-style register set.
///
/// - A: accumulator
/// - X, Y: index registers
/// - SP: stack pointer. A raw 8-bit address: the stack lives at
///   `0x0000 + sp` and grows downward. No page-1 offset is applied.
/// - PC: program counter
/// - P: status flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub p: Flags,
}

impl Registers {
    /// Registers as left by a reset: everything zero except `sp`.
    #[must_use]
    pub const fn reset(sp: u8) -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp,
            pc: 0,
            p: Flags::new(),
        }
    }

    /// Address for the next push. Post-decrements `sp`.
    pub fn push(&mut self) -> u16 {
        let address = u16::from(self.sp);
        self.sp = self.sp.wrapping_sub(1);
        address
    }

    /// Address for the next pop. Pre-increments `sp`.
    pub fn pop(&mut self) -> u16 {
        self.sp = self.sp.wrapping_add(1);
        u16::from(self.sp)
    }
}
