//! Atari 2600 bus: 6507 address decoding.
//!
//! The 6507 only drives address lines A0-A12, and the chips decode even
//! fewer, so most of the 64 KiB space is mirrors. Every address is first
//! folded onto its canonical location by [`unmirror`]:
//!
//! | Canonical      | Device             | Decoded when              |
//! |----------------|--------------------|---------------------------|
//! | `$0000-$003F`  | TIA registers      | A12 = 0, A7 = 0           |
//! | `$0080-$00FF`  | RIOT RAM           | A12 = 0, A7 = 1, A9 = 0   |
//! | `$0280-$02FF`  | RIOT registers     | A12 = 0, A7 = 1, A9 = 1   |
//! | `$F000-$FFFF`  | Cartridge ROM      | A12 = 1                   |

use atari_tia::Tia;
use emu_core::Bus;
use log::debug;
use mos_riot_6532::Riot6532;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cartridge::Cartridge;
use crate::peripherals::{Joysticks, Switches};

/// The console's RIOT, with joysticks on port A and switches on port B.
pub type Riot = Riot6532<Joysticks, Switches>;

/// Fold an address onto its canonical location. Idempotent.
#[must_use]
pub const fn unmirror(address: u16) -> u16 {
    if address & 0x1000 != 0 {
        0xF000 | (address & 0x0FFF)
    } else if address & 0x0080 == 0 {
        address & 0x003F
    } else if address & 0x0200 == 0 {
        0x0080 | (address & 0x007F)
    } else {
        0x0280 | (address & 0x007F)
    }
}

/// The Atari 2600 bus, implementing `emu_core::Bus`.
pub struct Atari2600Bus {
    /// TIA video chip.
    pub tia: Tia,
    /// RIOT RAM/IO/timer chip.
    pub riot: Riot,
    cartridge: Option<Cartridge>,
    /// Source of open-bus values.
    rng: StdRng,
}

impl Atari2600Bus {
    #[must_use]
    pub fn new(riot: Riot, rng: StdRng) -> Self {
        Self {
            tia: Tia::new(),
            riot,
            cartridge: None,
            rng,
        }
    }

    /// Bus with a fixed-seed open-bus source and zeroed RIOT.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::new(
            Riot::new(Joysticks::default(), Switches::default()),
            StdRng::seed_from_u64(seed),
        )
    }

    #[must_use]
    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn set_cartridge(&mut self, cartridge: Cartridge) {
        self.cartridge = Some(cartridge);
    }

    /// Read without side effects, for debugger memory views.
    ///
    /// Open-bus locations read as zero here rather than drawing a random
    /// value.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        match unmirror(address) {
            a @ 0x0000..=0x003F => self.tia.peek(a),
            a @ 0x0080..=0x00FF => self.riot.read_ram(a),
            a @ 0x0280..=0x02FF => self.riot.peek(a - 0x0280),
            a @ 0xF000..=0xFFFF => self.cartridge.as_ref().map_or(0, |c| c.read(a - 0xF000)),
            _ => 0,
        }
    }
}

impl Bus for Atari2600Bus {
    fn read(&mut self, address: u16) -> u8 {
        match unmirror(address) {
            a @ 0x0000..=0x003F => self.tia.read(a),
            a @ 0x0080..=0x00FF => self.riot.read_ram(a),
            a @ 0x0280..=0x02FF => self.riot.read(a - 0x0280),
            a @ 0xF000..=0xFFFF => match &self.cartridge {
                Some(cartridge) => cartridge.read(a - 0xF000),
                None => self.rng.random(),
            },
            _ => self.rng.random(),
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match unmirror(address) {
            a @ 0x0000..=0x003F => self.tia.write(a, value),
            a @ 0x0080..=0x00FF => self.riot.write_ram(a, value),
            a @ 0x0280..=0x02FF => self.riot.write(a - 0x0280, value),
            a => debug!("ignoring write ${value:02X} at ${a:04X}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_mirrors() {
        assert_eq!(unmirror(0x0045), 0x0005);
        assert_eq!(unmirror(0x0190), 0x0090);
        assert_eq!(unmirror(0x01FF), 0x00FF);
        assert_eq!(unmirror(0x5000), 0xF000);
        assert_eq!(unmirror(0x1FFC), 0xFFFC);
        assert_eq!(unmirror(0x0294), 0x0294);
    }

    #[test]
    fn unmirror_is_idempotent() {
        for address in 0..=u16::MAX {
            let canonical = unmirror(address);
            assert_eq!(unmirror(canonical), canonical, "${address:04X}");
        }
    }

    #[test]
    fn ram_is_shared_with_stack_page() {
        let mut bus = Atari2600Bus::with_seed(1);
        bus.write(0x01FE, 0x42);
        assert_eq!(bus.read(0x00FE), 0x42);
        assert_eq!(bus.peek(0x00FE), 0x42);
    }

    #[test]
    fn open_bus_is_reproducible_from_seed() {
        let mut a = Atari2600Bus::with_seed(7);
        let mut b = Atari2600Bus::with_seed(7);
        let left: Vec<u8> = (0..16).map(|_| a.read(0xF000)).collect();
        let right: Vec<u8> = (0..16).map(|_| b.read(0xF000)).collect();
        assert_eq!(left, right);
        assert_eq!(a.peek(0xF000), 0);
    }

    #[test]
    fn cartridge_is_mapped_at_top() {
        let mut bus = Atari2600Bus::with_seed(0);
        let mut rom = vec![0xEA; 4096];
        rom[0x0FFC] = 0x00;
        rom[0x0FFD] = 0xF0;
        bus.set_cartridge(Cartridge::new(rom).unwrap());
        assert_eq!(bus.read(0xFFFC), 0x00);
        assert_eq!(bus.read(0xFFFD), 0xF0);
        assert_eq!(bus.read(0x1FFD), 0xF0);
        bus.write(0xF000, 0x00);
        assert_eq!(bus.read(0xF000), 0xEA, "ROM ignores writes");
    }

    #[test]
    fn riot_registers_are_routed() {
        let mut bus = Atari2600Bus::with_seed(0);
        bus.write(0x0294, 0x10); // TIM1T
        assert_eq!(bus.read(0x0284), 0x10);
        assert_eq!(bus.read(0x0280), 0xFF, "joysticks idle");
    }
}
