//! Movable raster objects: players, missiles and the ball.
//!
//! Positions are in visible pixels (0-159) measured from the end of
//! horizontal blank. Motion registers hold the raw `HMxx` value; only the
//! high nibble is used, as a signed 4-bit offset.

use emu_core::bits::{bit, sign_extend};

/// Visible pixels per scanline.
pub const VISIBLE_WIDTH: u8 = 160;

/// Copy layout for each `NUSIZ` number/size code.
///
/// Bit `n` set means a copy starts at pixel counter `8 * n`. Codes 5 and 7
/// are a single stretched copy and cover two and four groups respectively.
const COPY_TABLE: [u32; 8] = [
    0b1,                // one copy
    0b101,              // two copies, close
    0b1_0001,           // two copies, medium
    0b1_0101,           // three copies, close
    0b1_0000_0001,      // two copies, wide
    0b11,               // double size
    0b1_0001_0001,      // three copies, medium
    0b1111,             // quad size
];

/// Pixel stretch factor for each `NUSIZ` number/size code.
const fn stretch(code: u8) -> u8 {
    match code & 0x07 {
        5 => 2,
        7 => 4,
        _ => 1,
    }
}

/// Whether a player copy covers pixel `counter` for `NUSIZ` code `code`.
///
/// `counter` is the distance in pixels from the player's position.
#[must_use]
pub fn copy_visible(code: u8, counter: u8) -> bool {
    let group = u32::from(counter / 8);
    group < 32 && COPY_TABLE[usize::from(code & 0x07)] & (1 << group) != 0
}

/// Apply a signed motion nibble to a position.
fn apply_motion(position: u8, motion: u8) -> u8 {
    let offset = i16::from(sign_extend(motion >> 4, 4));
    (i16::from(position) - offset).rem_euclid(i16::from(VISIBLE_WIDTH)) as u8
}

/// Distance from `position` to `x`, wrapping around the scanline.
fn distance(position: u8, x: u8) -> u8 {
    (i16::from(x) - i16::from(position)).rem_euclid(i16::from(VISIBLE_WIDTH)) as u8
}

/// Position latched by a `RESxx` strobe at visible pixel `x`.
#[must_use]
pub fn reset_position(x: u8, delay: u8) -> u8 {
    ((u16::from(x) + u16::from(delay)) % u16::from(VISIBLE_WIDTH)) as u8
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Player {
    /// Graphics written through `GRPx`.
    pub graphics: u8,
    /// Graphics latched when the other player's `GRPx` is written.
    pub delayed: u8,
    pub reflect: bool,
    pub vertical_delay: bool,
    pub color: u8,
    pub position: u8,
    pub motion: u8,
    /// `NUSIZx` number/size code (bits 0-2).
    pub copies: u8,
}

impl Player {
    /// Whether the player draws a pixel at visible position `x`.
    #[must_use]
    pub fn pixel(&self, x: u8) -> bool {
        let counter = distance(self.position, x);
        if !copy_visible(self.copies, counter) {
            return false;
        }
        let scale = stretch(self.copies);
        let index = if scale == 1 { counter % 8 } else { counter / scale };
        if index > 7 {
            return false;
        }
        let graphics = if self.vertical_delay {
            self.delayed
        } else {
            self.graphics
        };
        if self.reflect {
            bit(graphics, u32::from(index))
        } else {
            bit(graphics, u32::from(7 - index))
        }
    }

    pub fn apply_motion(&mut self) {
        self.position = apply_motion(self.position, self.motion);
    }

    /// Offset from the player position at which a reset missile appears.
    #[must_use]
    pub fn missile_center(&self) -> u8 {
        match stretch(self.copies) {
            2 => 6,
            4 => 10,
            _ => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Missile {
    pub enabled: bool,
    /// `RESMPx`: missile hidden and locked to its player.
    pub locked: bool,
    pub position: u8,
    pub motion: u8,
    /// Size code from `NUSIZx` bits 4-5; width is `1 << size`.
    pub size: u8,
}

impl Missile {
    #[must_use]
    pub fn pixel(&self, x: u8) -> bool {
        self.enabled && !self.locked && distance(self.position, x) < (1 << self.size)
    }

    pub fn apply_motion(&mut self) {
        self.position = apply_motion(self.position, self.motion);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ball {
    pub enabled: bool,
    /// `ENABL` value latched when `GRP1` is written.
    pub delayed: bool,
    pub vertical_delay: bool,
    pub position: u8,
    pub motion: u8,
    /// Size code from `CTRLPF` bits 4-5.
    pub size: u8,
}

impl Ball {
    #[must_use]
    pub fn pixel(&self, x: u8) -> bool {
        let enabled = if self.vertical_delay {
            self.delayed
        } else {
            self.enabled
        };
        enabled && distance(self.position, x) < (1 << self.size)
    }

    pub fn apply_motion(&mut self) {
        self.position = apply_motion(self.position, self.motion);
    }
}
