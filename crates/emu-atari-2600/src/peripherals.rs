//! Devices on the RIOT ports: console switches and joysticks.

use mos_riot_6532::Port;

/// Console switch bits as seen on port B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Switches(pub u8);

impl Switches {
    pub const RESET: u8 = 1 << 0;
    pub const SELECT: u8 = 1 << 1;
    pub const COLOR: u8 = 1 << 3;
    pub const DIFFICULTY0: u8 = 1 << 6;
    pub const DIFFICULTY1: u8 = 1 << 7;

    /// Set or clear one of the switch bits.
    pub fn set(&mut self, switch: u8, on: bool) {
        if on {
            self.0 |= switch;
        } else {
            self.0 &= !switch;
        }
    }

    #[must_use]
    pub fn is_on(self, switch: u8) -> bool {
        self.0 & switch != 0
    }
}

impl Port for Switches {
    /// Reset and select are active low.
    fn read(&self) -> u8 {
        self.0 ^ (Self::RESET | Self::SELECT)
    }

    /// Port B has no outputs wired, but writes still latch the three
    /// unassigned bits.
    fn write(&mut self, value: u8) {
        self.0 |= value & 0x34;
    }
}

/// One joystick. `true` means pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Joystick {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

impl Joystick {
    /// Direction nibble, active low: right/left/down/up in bits 3-0.
    fn nibble(&self) -> u8 {
        let mut pressed = 0;
        if self.right {
            pressed |= 0x08;
        }
        if self.left {
            pressed |= 0x04;
        }
        if self.down {
            pressed |= 0x02;
        }
        if self.up {
            pressed |= 0x01;
        }
        !pressed & 0x0F
    }
}

/// Both joystick ports, wired to RIOT port A. Player 0 is the high nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Joysticks(pub [Joystick; 2]);

impl Port for Joysticks {
    fn read(&self) -> u8 {
        (self.0[0].nibble() << 4) | self.0[1].nibble()
    }

    fn write(&mut self, _value: u8) {}
}
