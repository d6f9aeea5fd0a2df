//! Console configuration.

use crate::peripherals::Switches;

/// Atari 2600 configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Atari2600Config {
    /// Seed for power-on RAM, timer, switch state and open-bus reads.
    /// `None` seeds from the operating system.
    pub seed: Option<u64>,
    /// Initial switch positions. `None` leaves them random, as on
    /// power-up.
    pub switches: Option<Switches>,
}

impl Atari2600Config {
    /// Deterministic configuration for tests and reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            switches: None,
        }
    }
}
