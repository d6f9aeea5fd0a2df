//! Top-level Atari 2600 system.
//!
//! The console owns the CPU and the bus; the bus owns the TIA, RIOT and
//! cartridge. Execution is instruction-stepped: after each instruction the
//! TIA is advanced three colour clocks and the RIOT one cycle for every CPU
//! cycle the instruction took. A pending WSYNC is always resolved before
//! the next instruction runs.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;

use atari_tia::Tia;
use emu_core::{Bus, Observable, Tickable, Ticks, Value};
use log::{debug, trace, warn};
use mos_6502::{ExecuteError, Mos6502};
use mos_riot_6532::RAM_SIZE;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::bus::{Atari2600Bus, Riot};
use crate::cartridge::{Cartridge, CartridgeError};
use crate::config::Atari2600Config;
use crate::events::{Event, Events};
use crate::peripherals::{Joystick, Joysticks, Switches};

/// TIA colour clocks per CPU cycle.
pub const TICKS_PER_CYCLE: u64 = 3;

/// Execution stopped before completing a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepError {
    #[error(transparent)]
    Execute(#[from] ExecuteError),
}

/// Why free-running execution stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// The program counter reached this breakpoint.
    Breakpoint(u16),
    /// The cancel flag was raised.
    Cancelled,
}

/// Atari 2600 system.
pub struct Atari2600 {
    cpu: Mos6502,
    bus: Atari2600Bus,
    /// Completed frame counter.
    frame_count: u64,
    /// Colour clocks consumed by WSYNC stalls not yet passed to the RIOT.
    stall_ticks: u64,
    events: Events,
}

impl Atari2600 {
    /// Create a console with no cartridge.
    ///
    /// RAM, the RIOT timer and (unless configured) the switches come up
    /// with values drawn from the configured seed.
    #[must_use]
    pub fn new(config: &Atari2600Config) -> Self {
        let mut rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        let switches = config.switches.unwrap_or_else(|| Switches(rng.random()));
        let mut riot = Riot::new(Joysticks::default(), switches);
        let mut ram = [0; RAM_SIZE];
        rng.fill(&mut ram[..]);
        riot.power_on(ram, rng.random());

        Self {
            cpu: Mos6502::new(),
            bus: Atari2600Bus::new(riot, rng),
            frame_count: 0,
            stall_ticks: 0,
            events: Events::default(),
        }
    }

    /// Register for event notifications.
    pub fn subscribe(&mut self) -> Receiver<Event> {
        self.events.subscribe()
    }

    /// Reset CPU, TIA and RIOT, then load PC from the reset vector.
    pub fn reset(&mut self) {
        self.bus.tia.reset();
        self.bus.riot.reset();
        self.cpu.reset(&mut self.bus);
        self.frame_count = 0;
        self.stall_ticks = 0;
        debug!("reset, PC=${:04X}", self.cpu.regs.pc);
        self.events.emit(Event::Reset);
    }

    /// Validate `bytes` as a cartridge, insert it and reset.
    ///
    /// Nothing changes if the image is rejected.
    pub fn insert_cartridge(&mut self, bytes: impl Into<Vec<u8>>) -> Result<(), CartridgeError> {
        let cartridge = Cartridge::new(bytes)?;
        self.insert(cartridge);
        Ok(())
    }

    /// Read a ROM image from disk, insert it and reset.
    pub fn load_cartridge(&mut self, path: impl AsRef<Path>) -> Result<(), CartridgeError> {
        let cartridge = Cartridge::load(path)?;
        self.insert(cartridge);
        Ok(())
    }

    fn insert(&mut self, cartridge: Cartridge) {
        debug!("inserting {} byte cartridge", cartridge.len());
        self.bus.set_cartridge(cartridge);
        self.reset();
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Execute one instruction, resolving a pending WSYNC first.
    ///
    /// Returns the cycles the instruction took. Emits `Break`.
    pub fn step_instruction(&mut self) -> Result<u32, StepError> {
        self.finish_hsync();
        let result = self.run_instruction();
        self.events.emit(Event::Break);
        result
    }

    /// Run until the TIA moves to another scanline. Emits one `Break`.
    ///
    /// A pending WSYNC counts as progress, so a step that ends on a WSYNC
    /// stops at the start of the next line without running the following
    /// instruction.
    pub fn step_scanline(&mut self) -> Result<(), StepError> {
        let scanline = self.bus.tia.scanline();
        let result = loop {
            if self.bus.tia.waiting_hsync() {
                self.finish_hsync();
            } else if let Err(e) = self.run_instruction() {
                break Err(e);
            }
            if self.bus.tia.scanline() != scanline {
                break Ok(());
            }
        };
        self.events.emit(Event::Break);
        result
    }

    /// Run until the screen clock wraps after a vertical sync. Emits one
    /// `Break`.
    ///
    /// Runs forever if the program never completes a VSYNC.
    pub fn step_frame(&mut self) -> Result<(), StepError> {
        let result = loop {
            let before = self.bus.tia.screen_clock();
            self.finish_hsync();
            if let Err(e) = self.run_instruction() {
                break Err(e);
            }
            if self.bus.tia.screen_clock() < before {
                break Ok(());
            }
        };
        self.events.emit(Event::Break);
        result
    }

    /// Repeat [`step_instruction`](Self::step_instruction) until PC is in
    /// `breakpoints`. At least one instruction always runs.
    ///
    /// Emits `Resume`, a `Break` per instruction, then a final `Break`.
    ///
    /// Runs forever if no breakpoint is reached.
    pub fn resume_until(&mut self, breakpoints: &HashSet<u16>) -> Result<u16, StepError> {
        let never = AtomicBool::new(false);
        match self.resume_until_cancelled(breakpoints, &never)? {
            Halt::Breakpoint(pc) => Ok(pc),
            Halt::Cancelled => Ok(self.cpu.regs.pc),
        }
    }

    /// Like [`resume_until`](Self::resume_until), but also stops when
    /// `cancel` is set. The flag is checked between instructions.
    pub fn resume_until_cancelled(
        &mut self,
        breakpoints: &HashSet<u16>,
        cancel: &AtomicBool,
    ) -> Result<Halt, StepError> {
        self.events.emit(Event::Resume);
        let result = loop {
            if let Err(e) = self.step_instruction() {
                break Err(e);
            }
            let pc = self.cpu.regs.pc;
            if breakpoints.contains(&pc) {
                break Ok(Halt::Breakpoint(pc));
            }
            if cancel.load(Ordering::Relaxed) {
                break Ok(Halt::Cancelled);
            }
        };
        self.events.emit(Event::Break);
        result
    }

    /// Release a WSYNC stall, advancing the RIOT by the cycles it covered.
    fn finish_hsync(&mut self) {
        if !self.bus.tia.waiting_hsync() {
            return;
        }
        self.stall_ticks += self.bus.tia.advance_to_hsync();
        let cycles = self.stall_ticks / TICKS_PER_CYCLE;
        self.stall_ticks %= TICKS_PER_CYCLE;
        self.bus.riot.tick_n(Ticks::new(cycles));
    }

    /// Execute one instruction and advance the chips by its duration.
    fn run_instruction(&mut self) -> Result<u32, StepError> {
        let cycles = self.cpu.step(&mut self.bus).inspect_err(|e| warn!("{e}"))?;

        let ticks = Ticks::from(cycles);
        self.bus.tia.tick_n(ticks.scaled(TICKS_PER_CYCLE));
        self.bus.riot.tick_n(ticks);

        if self.bus.tia.take_frame_complete() {
            self.frame_count += 1;
            trace!("frame {} complete", self.frame_count);
            self.events.emit(Event::Frame);
        }
        Ok(cycles)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn cpu(&self) -> &Mos6502 {
        &self.cpu
    }

    #[must_use]
    pub fn tia(&self) -> &Tia {
        &self.bus.tia
    }

    #[must_use]
    pub fn riot(&self) -> &Riot {
        &self.bus.riot
    }

    #[must_use]
    pub fn bus(&self) -> &Atari2600Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Atari2600Bus {
        &mut self.bus
    }

    #[must_use]
    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.bus.cartridge()
    }

    /// Frame buffer of `SCANLINES x SCANLINE_WIDTH` colour indices.
    #[must_use]
    pub fn frame(&self) -> &[u8] {
        self.bus.tia.frame()
    }

    /// Frames completed since the last reset.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// CPU cycles executed since the last reset.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles()
    }

    /// Read memory without side effects.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.bus.peek(address)
    }

    #[must_use]
    pub fn switches(&self) -> Switches {
        *self.bus.riot.port_b()
    }

    pub fn set_switch(&mut self, switch: u8, on: bool) {
        self.bus.riot.port_b_mut().set(switch, on);
    }

    /// Update joystick `index` (0 or 1): directions on RIOT port A, fire
    /// button on the TIA input latch.
    pub fn set_joystick(&mut self, index: usize, joystick: Joystick) {
        if let Some(slot) = self.bus.riot.port_a_mut().0.get_mut(index) {
            *slot = joystick;
            self.bus.tia.set_fire(index, joystick.fire);
        }
    }
}

impl Bus for Atari2600 {
    fn read(&mut self, address: u16) -> u8 {
        self.bus.read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.bus.write(address, value);
    }
}

/// Parse `memory.<addr>` suffixes: `$F000`, `0xF000` or decimal.
fn parse_address(text: &str) -> Option<u16> {
    if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix('$'))
    {
        u16::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

impl Observable for Atari2600 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("tia.") {
            self.bus.tia.query(rest)
        } else if let Some(rest) = path.strip_prefix("riot.") {
            self.bus.riot.query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            parse_address(rest).map(|a| Value::U8(self.peek(a)))
        } else {
            match path {
                "cycles" => Some(self.cycles().into()),
                "frame_count" => Some(self.frame_count.into()),
                "switches" => Some(self.switches().0.into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<6502_paths>",
            "tia.<tia_paths>",
            "riot.<riot_paths>",
            "memory.<address>",
            "cycles",
            "frame_count",
            "switches",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console_with(program: &[u8]) -> Atari2600 {
        let mut rom = vec![0xEA; 4096];
        rom[..program.len()].copy_from_slice(program);
        rom[0x0FFC] = 0x00;
        rom[0x0FFD] = 0xF0;
        let mut console = Atari2600::new(&Atari2600Config::seeded(1));
        console.insert_cartridge(rom).unwrap();
        console
    }

    #[test]
    fn insert_resets_to_vector() {
        let console = console_with(&[]);
        assert_eq!(console.cpu().regs.pc, 0xF000);
        assert_eq!(console.cpu().regs.s, 0xFD);
        assert_eq!(console.tia().screen_clock(), 0);
    }

    #[test]
    fn rejected_cartridge_leaves_console_untouched() {
        let mut console = console_with(&[0xA9, 0x01]);
        console.step_instruction().unwrap();
        assert!(console.insert_cartridge(Vec::new()).is_err());
        assert_eq!(console.cpu().regs.pc, 0xF002);
        assert_eq!(console.peek(0xF000), 0xA9);
    }

    #[test]
    fn instruction_advances_tia_three_times() {
        let mut console = console_with(&[0xEA]);
        assert_eq!(console.step_instruction(), Ok(2));
        assert_eq!(console.tia().screen_clock(), 6);
        assert_eq!(console.cycles(), 2);
    }

    #[test]
    fn wsync_is_resolved_before_next_instruction() {
        // STA WSYNC; NOP
        let mut console = console_with(&[0x85, 0x02, 0xEA]);
        console.step_instruction().unwrap();
        assert!(console.tia().waiting_hsync());
        assert_eq!(console.tia().screen_clock(), 9);

        console.step_instruction().unwrap();
        assert!(!console.tia().waiting_hsync());
        assert_eq!(console.tia().screen_clock(), 228 + 6);
    }

    #[test]
    fn riot_follows_wsync_stalls() {
        // LDA #$FF; STA TIM1T; STA WSYNC; NOP
        let mut console = console_with(&[0xA9, 0xFF, 0x8D, 0x94, 0x02, 0x85, 0x02, 0xEA]);
        for _ in 0..4 {
            console.step_instruction().unwrap();
        }
        // The write lands before the STA's own 4 cycles are clocked, then
        // STA WSYNC takes 3, the stall covers 228 - 27 = 201 clocks
        // (67 cycles) and NOP takes 2.
        assert_eq!(console.riot().timer(), 0xFF - 4 - 3 - 67 - 2);
    }

    #[test]
    fn resp_latches_at_instruction_start() {
        // STA WSYNC; 12 x NOP; STA RESP0
        let mut program = vec![0x85, 0x02];
        program.extend([0xEA; 12]);
        program.extend([0x85, 0x10]);
        let mut console = console_with(&program);
        for _ in 0..14 {
            console.step_instruction().unwrap();
        }
        // The NOPs leave the beam at clock 72 (pixel 4); the player lands
        // five pixels later.
        assert_eq!(console.query("tia.p0.position"), Some(Value::U8(9)));
    }

    #[test]
    fn invalid_opcode_breaks_and_reports() {
        let mut console = console_with(&[0x02]);
        let events = console.subscribe();
        let err = console.step_instruction().unwrap_err();
        assert_eq!(
            err,
            StepError::Execute(ExecuteError::InvalidOpcode {
                address: 0xF000,
                opcode: 0x02
            })
        );
        assert_eq!(events.try_recv(), Ok(Event::Break));
        assert_eq!(console.cpu().regs.pc, 0xF000);
    }

    #[test]
    fn query_paths_route_to_chips() {
        let mut console = console_with(&[0xA2, 0x42]);
        console.step_instruction().unwrap();
        assert_eq!(console.query("cpu.x"), Some(Value::U8(0x42)));
        assert_eq!(console.query("tia.clock"), Some(Value::U64(6)));
        assert_eq!(console.query("memory.$F001"), Some(Value::U8(0x42)));
        assert_eq!(console.query("memory.0xF000"), Some(Value::U8(0xA2)));
        assert_eq!(console.query("cycles"), Some(Value::U64(2)));
        assert_eq!(console.query("frame_count"), Some(Value::U64(0)));
        assert_eq!(console.query("nope"), None);
    }

    #[test]
    fn joystick_reaches_riot_and_tia() {
        let mut console = console_with(&[]);
        console.set_joystick(
            0,
            Joystick {
                up: true,
                fire: true,
                ..Joystick::default()
            },
        );
        assert_eq!(console.peek(0x0280), 0xEF);
        assert_eq!(console.peek(0x000C), 0x00);
    }

    #[test]
    fn seeded_power_on_is_reproducible() {
        let a = Atari2600::new(&Atari2600Config::seeded(99));
        let b = Atari2600::new(&Atari2600Config::seeded(99));
        assert_eq!(a.riot().ram(), b.riot().ram());
        assert_eq!(a.switches(), b.switches());
        assert_eq!(a.riot().timer(), b.riot().timer());
    }
}
