//! A count of clock ticks.

/// A count of clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticks(pub u64);

impl Ticks {
    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Scale by a clock ratio (e.g. CPU cycles to colour clocks).
    #[must_use]
    pub const fn scaled(self, factor: u64) -> Self {
        Self(self.0 * factor)
    }
}

impl From<u32> for Ticks {
    fn from(count: u32) -> Self {
        Self(u64::from(count))
    }
}
