//! 6502 processor status register (P).

/// Carry flag - set if operation resulted in carry/borrow.
pub const C: u8 = 0x01;

/// Zero flag - set if result is zero.
pub const Z: u8 = 0x02;

/// Interrupt disable - when set, IRQ interrupts are ignored.
pub const I: u8 = 0x04;

/// Decimal mode - enables BCD arithmetic for ADC/SBC.
pub const D: u8 = 0x08;

/// Break flag. Only exists in the copy of P pushed by BRK/PHP.
pub const B: u8 = 0x10;

/// Unused bit. Always pushed as 1.
pub const U: u8 = 0x20;

/// Overflow flag - set if signed arithmetic overflowed.
pub const V: u8 = 0x40;

/// Negative flag - set if result has bit 7 set.
pub const N: u8 = 0x80;

/// Processor status register.
///
/// Holds only the real flags; B and U are added when the register is
/// pushed and dropped when it is pulled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status(pub u8);

impl Status {
    /// Create a status register with every flag clear.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Restore status from a byte pulled off the stack (PLP/RTI).
    #[must_use]
    pub const fn from_byte(value: u8) -> Self {
        Self(value & !(B | U))
    }

    /// Byte pushed by BRK and PHP (break and unused both set).
    #[must_use]
    pub const fn to_byte_brk(self) -> u8 {
        self.0 | U | B
    }

    /// Check if a flag is set.
    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Set a flag.
    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    /// Clear a flag.
    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    /// Set or clear a flag based on condition.
    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// Update N and Z flags based on a value.
    pub fn update_nz(&mut self, value: u8) {
        self.set_if(N, value & 0x80 != 0);
        self.set_if(Z, value == 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pull_drops_break_and_unused() {
        assert_eq!(Status::from_byte(0xFF), Status(0xCF));
    }

    #[test]
    fn push_adds_break_and_unused() {
        assert_eq!(Status(C | N).to_byte_brk(), 0xB1);
    }

    #[test]
    fn update_nz() {
        let mut p = Status::new();
        p.update_nz(0);
        assert!(p.is_set(Z));
        assert!(!p.is_set(N));
        p.update_nz(0x80);
        assert!(!p.is_set(Z));
        assert!(p.is_set(N));
    }
}
