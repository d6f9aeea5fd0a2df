//! 6502 CPU registers.

use crate::Status;

/// Stack pointer value loaded on reset.
pub const RESET_STACK_POINTER: u8 = 0xFD;

/// Programmer-visible state of the 6502. The stack lives in page one, which
/// the 6507 in the 2600 shares with zero page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    /// Low byte of the next free stack slot.
    pub s: u8,
    pub pc: u16,
    pub p: Status,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Create registers in reset state.
    ///
    /// A, X, Y and P are cleared and S is $FD. PC stays zero until the
    /// reset vector is read through the bus.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: RESET_STACK_POINTER,
            pc: 0,
            p: Status::new(),
        }
    }

    /// Claim a stack slot for a push and return its address.
    pub fn push(&mut self) -> u16 {
        let addr = self.stack_addr();
        self.s = self.s.wrapping_sub(1);
        addr
    }

    /// Release the top stack slot and return its address.
    pub fn pop(&mut self) -> u16 {
        self.s = self.s.wrapping_add(1);
        self.stack_addr()
    }

    /// Address of the next free stack slot.
    #[must_use]
    pub const fn stack_addr(&self) -> u16 {
        0x0100 | (self.s as u16)
    }
}
