//! Atari TIA (Television Interface Adapter).
//!
//! The TIA generates the video signal one colour clock at a time. It has
//! no frame buffer of its own on real hardware; here each visible clock is
//! written into a 262 x 228 array indexed by the screen clock, which is the
//! number of colour clocks since the last vertical sync.
//!
//! # Write registers ($00-$2C)
//!
//! | Reg | Name   | Description                              |
//! |-----|--------|------------------------------------------|
//! | $00 | VSYNC  | Vertical sync (bit 1)                    |
//! | $01 | VBLANK | Vertical blank (bit 1)                   |
//! | $02 | WSYNC  | Halt CPU until horizontal sync           |
//! | $03 | RSYNC  | Reset horizontal sync counter            |
//! | $04 | NUSIZ0 | Player 0 copies, missile 0 size          |
//! | $05 | NUSIZ1 | Player 1 copies, missile 1 size          |
//! | $06 | COLUP0 | Player/missile 0 colour                  |
//! | $07 | COLUP1 | Player/missile 1 colour                  |
//! | $08 | COLUPF | Playfield/ball colour                    |
//! | $09 | COLUBK | Background colour                        |
//! | $0A | CTRLPF | Reflect, score, priority, ball size      |
//! | $0B | REFP0  | Reflect player 0 (bit 3)                 |
//! | $0C | REFP1  | Reflect player 1 (bit 3)                 |
//! | $0D | PF0    | Playfield bits 4-7                       |
//! | $0E | PF1    | Playfield                                |
//! | $0F | PF2    | Playfield                                |
//! | $10 | RESP0  | Reset player 0 position                  |
//! | $11 | RESP1  | Reset player 1 position                  |
//! | $12 | RESM0  | Reset missile 0 position                 |
//! | $13 | RESM1  | Reset missile 1 position                 |
//! | $14 | RESBL  | Reset ball position                      |
//! | $1B | GRP0   | Player 0 graphics                        |
//! | $1C | GRP1   | Player 1 graphics                        |
//! | $1D | ENAM0  | Enable missile 0 (bit 1)                 |
//! | $1E | ENAM1  | Enable missile 1 (bit 1)                 |
//! | $1F | ENABL  | Enable ball (bit 1)                      |
//! | $20 | HMP0   | Player 0 motion                          |
//! | $21 | HMP1   | Player 1 motion                          |
//! | $22 | HMM0   | Missile 0 motion                         |
//! | $23 | HMM1   | Missile 1 motion                         |
//! | $24 | HMBL   | Ball motion                              |
//! | $25 | VDELP0 | Vertical delay player 0                  |
//! | $26 | VDELP1 | Vertical delay player 1                  |
//! | $27 | VDELBL | Vertical delay ball                      |
//! | $28 | RESMP0 | Lock missile 0 to player 0               |
//! | $29 | RESMP1 | Lock missile 1 to player 1               |
//! | $2A | HMOVE  | Apply motion registers                   |
//! | $2B | HMCLR  | Clear motion registers                   |
//! | $2C | CXCLR  | Clear collision latches                  |
//!
//! Audio registers ($15-$1A) are accepted and ignored.
//!
//! # Read registers ($x0-$xD)
//!
//! $0-$7 are the collision latches (bits 7 and 6), $C/$D are the fire
//! buttons INPT4/INPT5 (bit 7 low when pressed).

mod objects;

use emu_core::bits::{bit, reverse};
use emu_core::{Bus, Observable, Tickable, Value};
use log::trace;

pub use objects::{Ball, Missile, Player, VISIBLE_WIDTH, copy_visible, reset_position};

/// Colour clocks per scanline.
pub const SCANLINE_WIDTH: u64 = 228;

/// Colour clocks of horizontal blank at the start of each scanline.
pub const HBLANK_WIDTH: u64 = 68;

/// Scanlines per frame.
pub const SCANLINES: usize = 262;

/// Frame buffer length in bytes.
pub const FRAME_SIZE: usize = SCANLINES * SCANLINE_WIDTH as usize;

/// Minimum VSYNC length that starts a new frame.
const VSYNC_MIN_TICKS: u64 = 3 * SCANLINE_WIDTH;

/// Decode delay of RESP0/RESP1.
const PLAYER_RESET_DELAY: u8 = 5;

/// Decode delay of RESM0/RESM1/RESBL.
const OBJECT_RESET_DELAY: u8 = 4;

/// Clocks RSYNC leaves before the scanline boundary.
const RSYNC_CORRECTION: u64 = 3;

// Collision latch indices and bits, as read from $0-$7.
const CXM0P: usize = 0;
const CXM1P: usize = 1;
const CXP0FB: usize = 2;
const CXP1FB: usize = 3;
const CXM0FB: usize = 4;
const CXM1FB: usize = 5;
const CXBLPF: usize = 6;
const CXPPMM: usize = 7;
const BIT7: u8 = 0x80;
const BIT6: u8 = 0x40;

/// Objects present at one pixel.
#[derive(Clone, Copy)]
struct Hits {
    pf: bool,
    bl: bool,
    m0: bool,
    m1: bool,
    p0: bool,
    p1: bool,
}

/// Television Interface Adapter.
pub struct Tia {
    /// Colour clocks since the last vertical sync.
    clock: u64,
    /// Clock value when VSYNC was switched on.
    vsync_start: Option<u64>,
    vblank: bool,
    /// Set by WSYNC; cleared by `advance_to_hsync`.
    waiting_hsync: bool,
    frame_complete: bool,

    colubk: u8,
    colupf: u8,
    ctrlpf: u8,
    pf0: u8,
    pf1: u8,
    pf2: u8,
    /// 20-bit playfield; bit 0 is the leftmost playfield pixel.
    playfield: u32,

    players: [Player; 2],
    missiles: [Missile; 2],
    ball: Ball,

    collisions: [u8; 8],
    /// Fire buttons, true when pressed.
    fire: [bool; 2],

    frame: Box<[u8]>,
}

impl Default for Tia {
    fn default() -> Self {
        Self::new()
    }
}

impl Tia {
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: 0,
            vsync_start: None,
            vblank: false,
            waiting_hsync: false,
            frame_complete: false,
            colubk: 0,
            colupf: 0,
            ctrlpf: 0,
            pf0: 0,
            pf1: 0,
            pf2: 0,
            playfield: 0,
            players: [Player::default(); 2],
            missiles: [Missile::default(); 2],
            ball: Ball::default(),
            collisions: [0; 8],
            fire: [false; 2],
            frame: vec![0; FRAME_SIZE].into_boxed_slice(),
        }
    }

    /// Return every register and the screen clock to power-on state.
    ///
    /// Fire button state is kept, since it belongs to the controllers.
    pub fn reset(&mut self) {
        let fire = self.fire;
        *self = Self::new();
        self.fire = fire;
    }

    /// Colour clocks since the last vertical sync.
    #[must_use]
    pub fn screen_clock(&self) -> u64 {
        self.clock
    }

    /// Current scanline (may exceed 261 if the program never syncs).
    #[must_use]
    pub fn scanline(&self) -> u64 {
        self.clock / SCANLINE_WIDTH
    }

    /// Position within the current scanline, 0-227.
    #[must_use]
    pub fn horizontal_position(&self) -> u64 {
        self.clock % SCANLINE_WIDTH
    }

    /// True while the CPU is halted by a WSYNC strobe.
    #[must_use]
    pub fn waiting_hsync(&self) -> bool {
        self.waiting_hsync
    }

    /// Frame buffer: one colour index per clock, `SCANLINES` rows of
    /// `SCANLINE_WIDTH` cells.
    #[must_use]
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Read a register. TIA reads have no side effects.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        match address & 0x0F {
            r @ 0x00..=0x07 => self.collisions[usize::from(r)],
            0x0C => u8::from(!self.fire[0]) << 7,
            0x0D => u8::from(!self.fire[1]) << 7,
            _ => 0,
        }
    }

    /// Returns true once after a vertical sync completes a frame.
    pub fn take_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    /// Set fire button state for controller `index` (0 or 1).
    pub fn set_fire(&mut self, index: usize, pressed: bool) {
        if let Some(fire) = self.fire.get_mut(index) {
            *fire = pressed;
        }
    }

    /// Run the clock to the start of the next scanline, drawing as it goes,
    /// and release the CPU.
    ///
    /// Returns the number of colour clocks consumed.
    pub fn advance_to_hsync(&mut self) -> u64 {
        let ticks = self.run_to_boundary();
        self.waiting_hsync = false;
        ticks
    }

    fn run_to_boundary(&mut self) -> u64 {
        let ticks = SCANLINE_WIDTH - self.horizontal_position();
        for _ in 0..ticks {
            self.tick();
        }
        ticks
    }

    // ========================================================================
    // Raster
    // ========================================================================

    /// Compose the colour at the current clock and store it.
    fn draw(&mut self) {
        let hpos = self.horizontal_position();
        if hpos < HBLANK_WIDTH {
            return;
        }
        let x = (hpos - HBLANK_WIDTH) as u8;

        let hits = Hits {
            pf: self.playfield_pixel(x),
            bl: self.ball.pixel(x),
            m0: self.missiles[0].pixel(x),
            m1: self.missiles[1].pixel(x),
            p0: self.players[0].pixel(x),
            p1: self.players[1].pixel(x),
        };

        let color = if self.vblank {
            0
        } else {
            self.latch_collisions(&hits);
            self.compose(x, &hits)
        };

        if let Some(cell) = usize::try_from(self.clock)
            .ok()
            .and_then(|index| self.frame.get_mut(index))
        {
            *cell = color >> 1;
        }
    }

    fn compose(&self, x: u8, hits: &Hits) -> u8 {
        let field = hits.pf || hits.bl;
        let field_color = if self.ctrlpf & 0x02 != 0 {
            // Score mode: each half takes its player's colour.
            if x < VISIBLE_WIDTH / 2 {
                self.players[0].color
            } else {
                self.players[1].color
            }
        } else {
            self.colupf
        };
        let priority = self.ctrlpf & 0x04 != 0;

        let mut color = self.colubk;
        if field && !priority {
            color = field_color;
        }
        if hits.m1 {
            color = self.players[1].color;
        }
        if hits.p1 {
            color = self.players[1].color;
        }
        if hits.m0 {
            color = self.players[0].color;
        }
        if hits.p0 {
            color = self.players[0].color;
        }
        if field && priority {
            color = field_color;
        }
        color
    }

    fn playfield_pixel(&self, x: u8) -> bool {
        let index = u32::from(x / 4);
        let index = if index < 20 {
            index
        } else if self.ctrlpf & 0x01 != 0 {
            39 - index
        } else {
            index - 20
        };
        self.playfield & (1 << index) != 0
    }

    fn latch_collisions(&mut self, hits: &Hits) {
        let Hits {
            pf,
            bl,
            m0,
            m1,
            p0,
            p1,
        } = *hits;
        let pairs = [
            (CXM0P, BIT7, m0 && p1),
            (CXM0P, BIT6, m0 && p0),
            (CXM1P, BIT7, m1 && p0),
            (CXM1P, BIT6, m1 && p1),
            (CXP0FB, BIT7, p0 && pf),
            (CXP0FB, BIT6, p0 && bl),
            (CXP1FB, BIT7, p1 && pf),
            (CXP1FB, BIT6, p1 && bl),
            (CXM0FB, BIT7, m0 && pf),
            (CXM0FB, BIT6, m0 && bl),
            (CXM1FB, BIT7, m1 && pf),
            (CXM1FB, BIT6, m1 && bl),
            (CXBLPF, BIT7, bl && pf),
            (CXPPMM, BIT7, p0 && p1),
            (CXPPMM, BIT6, m0 && m1),
        ];
        for (register, mask, hit) in pairs {
            if hit {
                self.collisions[register] |= mask;
            }
        }
    }

    // ========================================================================
    // Register writes
    // ========================================================================

    fn write_vsync(&mut self, value: u8) {
        if bit(value, 1) {
            self.vsync_start.get_or_insert(self.clock);
        } else if let Some(start) = self.vsync_start.take()
            && self.clock.saturating_sub(start) >= VSYNC_MIN_TICKS
        {
            trace!("vsync after {} clocks, frame complete", self.clock);
            self.clock = 0;
            self.frame_complete = true;
        }
    }

    fn rsync(&mut self) {
        self.run_to_boundary();
        self.clock = self.clock.saturating_sub(RSYNC_CORRECTION);
    }

    /// Visible pixel the beam is at, or 0 during horizontal blank.
    fn beam_x(&self) -> u8 {
        self.horizontal_position().saturating_sub(HBLANK_WIDTH) as u8
    }

    fn update_playfield(&mut self) {
        self.playfield = u32::from(self.pf0 >> 4)
            | u32::from(reverse(self.pf1)) << 4
            | u32::from(self.pf2) << 12;
    }

    fn write_nusiz(&mut self, index: usize, value: u8) {
        self.players[index].copies = value & 0x07;
        self.missiles[index].size = (value >> 4) & 0x03;
    }

    fn write_resmp(&mut self, index: usize, value: u8) {
        let locked = bit(value, 1);
        let missile = &mut self.missiles[index];
        if missile.locked && !locked {
            let player = &self.players[index];
            missile.position = (player.position + player.missile_center()) % VISIBLE_WIDTH;
        }
        missile.locked = locked;
    }

    fn hmove(&mut self) {
        for player in &mut self.players {
            player.apply_motion();
        }
        for missile in &mut self.missiles {
            missile.apply_motion();
        }
        self.ball.apply_motion();
    }

    fn hmclr(&mut self) {
        for player in &mut self.players {
            player.motion = 0;
        }
        for missile in &mut self.missiles {
            missile.motion = 0;
        }
        self.ball.motion = 0;
    }
}

impl Tickable for Tia {
    fn tick(&mut self) {
        self.draw();
        self.clock += 1;
    }
}

impl Bus for Tia {
    fn read(&mut self, address: u16) -> u8 {
        self.peek(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        match address & 0x3F {
            0x00 => self.write_vsync(value),
            0x01 => self.vblank = bit(value, 1),
            0x02 => self.waiting_hsync = true,
            0x03 => self.rsync(),
            0x04 => self.write_nusiz(0, value),
            0x05 => self.write_nusiz(1, value),
            0x06 => self.players[0].color = value,
            0x07 => self.players[1].color = value,
            0x08 => self.colupf = value,
            0x09 => self.colubk = value,
            0x0A => {
                self.ctrlpf = value;
                self.ball.size = (value >> 4) & 0x03;
            }
            0x0B => self.players[0].reflect = bit(value, 3),
            0x0C => self.players[1].reflect = bit(value, 3),
            0x0D => {
                self.pf0 = value;
                self.update_playfield();
            }
            0x0E => {
                self.pf1 = value;
                self.update_playfield();
            }
            0x0F => {
                self.pf2 = value;
                self.update_playfield();
            }
            // The machine clocks the TIA after executing each instruction, so
            // strobes arrive at the clock the instruction started; the 5/4
            // decode delays are measured from there.
            0x10 => self.players[0].position = reset_position(self.beam_x(), PLAYER_RESET_DELAY),
            0x11 => self.players[1].position = reset_position(self.beam_x(), PLAYER_RESET_DELAY),
            0x12 => self.missiles[0].position = reset_position(self.beam_x(), OBJECT_RESET_DELAY),
            0x13 => self.missiles[1].position = reset_position(self.beam_x(), OBJECT_RESET_DELAY),
            0x14 => self.ball.position = reset_position(self.beam_x(), OBJECT_RESET_DELAY),
            0x1B => {
                self.players[0].graphics = value;
                self.players[1].delayed = self.players[1].graphics;
            }
            0x1C => {
                self.players[1].graphics = value;
                self.players[0].delayed = self.players[0].graphics;
                self.ball.delayed = self.ball.enabled;
            }
            0x1D => self.missiles[0].enabled = bit(value, 1),
            0x1E => self.missiles[1].enabled = bit(value, 1),
            0x1F => self.ball.enabled = bit(value, 1),
            0x20 => self.players[0].motion = value,
            0x21 => self.players[1].motion = value,
            0x22 => self.missiles[0].motion = value,
            0x23 => self.missiles[1].motion = value,
            0x24 => self.ball.motion = value,
            0x25 => self.players[0].vertical_delay = bit(value, 0),
            0x26 => self.players[1].vertical_delay = bit(value, 0),
            0x27 => self.ball.vertical_delay = bit(value, 0),
            0x28 => self.write_resmp(0, value),
            0x29 => self.write_resmp(1, value),
            0x2A => self.hmove(),
            0x2B => self.hmclr(),
            0x2C => self.collisions = [0; 8],
            // Audio and unused addresses.
            _ => {}
        }
    }
}

impl Observable for Tia {
    fn query(&self, path: &str) -> Option<Value> {
        let player = |i: usize| &self.players[i];
        match path {
            "clock" => Some(Value::U64(self.clock)),
            "scanline" => Some(Value::U64(self.scanline())),
            "hpos" => Some(Value::U64(self.horizontal_position())),
            "vsync" => Some(self.vsync_start.is_some().into()),
            "vblank" => Some(self.vblank.into()),
            "wsync" => Some(self.waiting_hsync.into()),
            "colubk" => Some(self.colubk.into()),
            "colupf" => Some(self.colupf.into()),
            "ctrlpf" => Some(self.ctrlpf.into()),
            "pf0" => Some(self.pf0.into()),
            "pf1" => Some(self.pf1.into()),
            "pf2" => Some(self.pf2.into()),
            "p0.position" => Some(player(0).position.into()),
            "p1.position" => Some(player(1).position.into()),
            "p0.graphics" => Some(player(0).graphics.into()),
            "p1.graphics" => Some(player(1).graphics.into()),
            "p0.color" => Some(player(0).color.into()),
            "p1.color" => Some(player(1).color.into()),
            "m0.position" => Some(self.missiles[0].position.into()),
            "m1.position" => Some(self.missiles[1].position.into()),
            "ball.position" => Some(self.ball.position.into()),
            "collisions" => Some(Value::from(&self.collisions[..])),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "clock",
            "scanline",
            "hpos",
            "vsync",
            "vblank",
            "wsync",
            "colubk",
            "colupf",
            "ctrlpf",
            "pf0",
            "pf1",
            "pf2",
            "p0.position",
            "p1.position",
            "p0.graphics",
            "p1.graphics",
            "p0.color",
            "p1.color",
            "m0.position",
            "m1.position",
            "ball.position",
            "collisions",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::Ticks;

    const VSYNC: u16 = 0x00;
    const WSYNC: u16 = 0x02;

    fn tick_lines(tia: &mut Tia, lines: u64) {
        tia.tick_n(Ticks::new(lines * SCANLINE_WIDTH));
    }

    #[test]
    fn vsync_of_three_lines_completes_frame() {
        let mut tia = Tia::new();
        tick_lines(&mut tia, 10);
        tia.write(VSYNC, 0x02);
        tick_lines(&mut tia, 3);
        tia.write(VSYNC, 0x00);

        assert!(tia.take_frame_complete());
        assert!(!tia.take_frame_complete(), "flag is taken once");
        assert_eq!(tia.screen_clock(), 0);
    }

    #[test]
    fn short_vsync_is_ignored() {
        let mut tia = Tia::new();
        tia.write(VSYNC, 0x02);
        tick_lines(&mut tia, 2);
        tia.write(VSYNC, 0x00);

        assert!(!tia.take_frame_complete());
        assert_eq!(tia.screen_clock(), 2 * SCANLINE_WIDTH);
        assert_eq!(tia.query("vsync"), Some(Value::Bool(false)));
    }

    #[test]
    fn hsync_fast_forward_reaches_boundary() {
        for start in [0, 1, 67, 68, 227, 228, 500] {
            let mut tia = Tia::new();
            tia.tick_n(Ticks::new(start));
            tia.write(WSYNC, 0);
            assert!(tia.waiting_hsync());

            let consumed = tia.advance_to_hsync();

            assert_eq!(consumed, SCANLINE_WIDTH - start % SCANLINE_WIDTH);
            assert_eq!(tia.horizontal_position(), 0);
            assert!(!tia.waiting_hsync());
        }
    }

    #[test]
    fn rsync_stops_short_of_boundary() {
        let mut tia = Tia::new();
        tia.tick_n(Ticks::new(100));
        tia.write(0x03, 0);
        assert_eq!(tia.screen_clock(), SCANLINE_WIDTH - 3);
    }

    #[test]
    fn resp_latches_with_decode_delay() {
        let mut tia = Tia::new();
        tia.tick_n(Ticks::new(HBLANK_WIDTH + 20));
        tia.write(0x10, 0);
        tia.write(0x12, 0);
        tia.write(0x14, 0);
        assert_eq!(tia.players[0].position, 25);
        assert_eq!(tia.missiles[0].position, 24);
        assert_eq!(tia.ball.position, 24);

        // During horizontal blank the beam counts as pixel 0.
        let mut tia = Tia::new();
        tia.tick_n(Ticks::new(10));
        tia.write(0x11, 0);
        assert_eq!(tia.players[1].position, 5);
    }

    #[test]
    fn hmove_and_hmclr() {
        let mut tia = Tia::new();
        tia.players[0].position = 50;
        tia.missiles[1].position = 50;
        tia.write(0x20, 0x30); // HMP0 = +3 (left)
        tia.write(0x23, 0xF0); // HMM1 = -1 (right)
        tia.write(0x2A, 0);
        assert_eq!(tia.players[0].position, 47);
        assert_eq!(tia.missiles[1].position, 51);

        tia.write(0x2B, 0);
        tia.write(0x2A, 0);
        assert_eq!(tia.players[0].position, 47);
        assert_eq!(tia.missiles[1].position, 51);
    }

    #[test]
    fn playfield_layout_and_reflection() {
        let mut tia = Tia::new();
        tia.write(0x0D, 0x10); // PF0 bit 4: pixels 0-3
        tia.write(0x0E, 0x80); // PF1 bit 7: pixels 16-19
        assert!(tia.playfield_pixel(0));
        assert!(tia.playfield_pixel(16));
        assert!(!tia.playfield_pixel(4));
        assert!(tia.playfield_pixel(80), "right half repeats");
        assert!(!tia.playfield_pixel(159));

        tia.write(0x0A, 0x01);
        assert!(tia.playfield_pixel(159), "right half mirrors");
        assert!(tia.playfield_pixel(140));
        assert!(!tia.playfield_pixel(80));

        tia.write(0x0F, 0x01); // PF2 bit 0: pixels 48-51
        assert!(tia.playfield_pixel(48));
        assert!(!tia.playfield_pixel(47));
    }

    #[test]
    fn draws_background_into_frame() {
        let mut tia = Tia::new();
        tia.write(0x09, 0x1E);
        tick_lines(&mut tia, 1);
        assert_eq!(tia.frame()[0], 0, "horizontal blank is not drawn");
        assert_eq!(tia.frame()[HBLANK_WIDTH as usize], 0x0F);
        assert_eq!(tia.frame()[227], 0x0F);
    }

    #[test]
    fn vblank_draws_black() {
        let mut tia = Tia::new();
        tia.write(0x09, 0x1E);
        tia.write(0x01, 0x02);
        tick_lines(&mut tia, 1);
        assert_eq!(tia.frame()[100], 0);
    }

    #[test]
    fn player_overrides_playfield() {
        let mut tia = Tia::new();
        tia.write(0x08, 0x40); // COLUPF
        tia.write(0x06, 0x80); // COLUP0
        tia.write(0x0D, 0xF0);
        tia.write(0x1B, 0xFF);
        tia.players[0].position = 0;
        tick_lines(&mut tia, 1);
        assert_eq!(tia.frame()[HBLANK_WIDTH as usize], 0x40);

        tia.write(0x0A, 0x04); // playfield priority
        tick_lines(&mut tia, 1);
        assert_eq!(tia.frame()[(SCANLINE_WIDTH + HBLANK_WIDTH) as usize], 0x20);
    }

    #[test]
    fn collisions_latch_until_cleared() {
        let mut tia = Tia::new();
        tia.write(0x0D, 0xF0);
        tia.write(0x1B, 0xFF);
        tia.players[0].position = 0;
        tick_lines(&mut tia, 1);
        assert_eq!(tia.read(0x02) & 0x80, 0x80, "P0-PF");
        assert_eq!(tia.read(0x07), 0);

        tia.write(0x2C, 0);
        assert_eq!(tia.read(0x02), 0);
    }

    #[test]
    fn vertical_delay_latches_on_other_player_write() {
        let mut tia = Tia::new();
        tia.write(0x1B, 0xAA);
        tia.write(0x1C, 0x55);
        assert_eq!(tia.players[0].delayed, 0xAA);
        assert_eq!(tia.players[1].delayed, 0x00);
        tia.write(0x1B, 0x11);
        assert_eq!(tia.players[1].delayed, 0x55);
    }

    #[test]
    fn fire_buttons_read_active_low() {
        let mut tia = Tia::new();
        assert_eq!(tia.read(0x0C), 0x80);
        tia.set_fire(0, true);
        assert_eq!(tia.read(0x0C), 0x00);
        assert_eq!(tia.read(0x3D), 0x80);
    }

    #[test]
    fn reset_keeps_fire_buttons() {
        let mut tia = Tia::new();
        tia.set_fire(1, true);
        tia.tick_n(Ticks::new(1000));
        tia.reset();
        assert_eq!(tia.screen_clock(), 0);
        assert_eq!(tia.read(0x0D), 0x00);
    }
}
