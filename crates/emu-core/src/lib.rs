//! Core traits and types shared by every chip in the console.
//!
//! Timing is expressed in colour clocks. The CPU runs at one third of that
//! rate, so a CPU cycle is three ticks of the video chip.

pub mod bits;
mod bus;
mod cpu;
mod observable;
mod tickable;
mod ticks;

pub use bus::{Bus, SimpleBus};
pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use tickable::Tickable;
pub use ticks::Ticks;
