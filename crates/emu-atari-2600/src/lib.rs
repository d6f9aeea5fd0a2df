//! Atari 2600 emulator.
//!
//! The 2600's colour clock runs at 3,579,545 Hz (NTSC). The 6507 CPU and
//! the RIOT run at a third of that, so every CPU cycle is three TIA clocks.
//!
//! One frame is whatever the program makes it: the TIA has no frame timing
//! of its own and a frame ends when the program holds VSYNC for at least
//! three scanlines. A well-behaved NTSC program draws 262 lines of 228
//! clocks.

mod bus;
mod cartridge;
mod config;
mod console;
mod events;
mod peripherals;

pub use atari_tia::{FRAME_SIZE, SCANLINE_WIDTH, SCANLINES};
pub use bus::{Atari2600Bus, Riot, unmirror};
pub use cartridge::{Cartridge, CartridgeError, ROM_WINDOW};
pub use config::Atari2600Config;
pub use console::{Atari2600, Halt, StepError, TICKS_PER_CYCLE};
pub use events::Event;
pub use peripherals::{Joystick, Joysticks, Switches};
