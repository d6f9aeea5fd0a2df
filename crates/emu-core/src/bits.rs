//! Bit manipulation helpers for fixed-width registers.

/// Returns true if bit `n` of `value` is set.
#[must_use]
pub const fn bit(value: u8, n: u32) -> bool {
    value & (1 << n) != 0
}

/// Returns `value` with bit `n` set or cleared.
#[must_use]
pub const fn with_bit(value: u8, n: u32, set: bool) -> u8 {
    if set {
        value | (1 << n)
    } else {
        value & !(1 << n)
    }
}

/// Reverse the bit order of a byte (bit 0 becomes bit 7).
#[must_use]
pub const fn reverse(value: u8) -> u8 {
    value.reverse_bits()
}

/// Sign-extend the low `width` bits of `value`.
///
/// `width` must be between 1 and 8.
#[must_use]
pub const fn sign_extend(value: u8, width: u32) -> i8 {
    let shift = 8 - width;
    ((value << shift) as i8) >> shift
}

/// Combine two bytes into a little-endian word.
#[must_use]
pub const fn word(low: u8, high: u8) -> u16 {
    (high as u16) << 8 | low as u16
}

/// Returns true if `a` and `b` lie on different 256-byte pages.
#[must_use]
pub const fn crosses_page(a: u16, b: u16) -> bool {
    a & 0xFF00 != b & 0xFF00
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_access() {
        assert!(bit(0b0000_0010, 1));
        assert!(!bit(0b0000_0010, 0));
        assert_eq!(with_bit(0, 7, true), 0x80);
        assert_eq!(with_bit(0xFF, 0, false), 0xFE);
    }

    #[test]
    fn reverse_mirrors_bits() {
        assert_eq!(reverse(0b1000_0001), 0b1000_0001);
        assert_eq!(reverse(0b1100_0000), 0b0000_0011);
    }

    #[test]
    fn sign_extend_nibbles() {
        assert_eq!(sign_extend(0x07, 4), 7);
        assert_eq!(sign_extend(0x08, 4), -8);
        assert_eq!(sign_extend(0x0F, 4), -1);
        assert_eq!(sign_extend(0xF0, 8), -16);
    }

    #[test]
    fn words_and_pages() {
        assert_eq!(word(0x34, 0x12), 0x1234);
        assert!(crosses_page(0x10FF, 0x1100));
        assert!(!crosses_page(0x1000, 0x10FF));
    }
}
