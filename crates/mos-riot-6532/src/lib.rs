//! MOS 6532 RIOT (RAM-I/O-Timer).
//!
//! The 6532 provides 128 bytes of RAM, two 8-bit I/O ports and an 8-bit
//! interval timer with a programmable prescaler. In the 2600, port A reads
//! the joysticks and port B the console switches.
//!
//! # Registers (offset from the register window)
//!
//! | Offset      | Read   | Write                      |
//! |-------------|--------|----------------------------|
//! | $00         | SWCHA  | Port A output              |
//! | $01         | SWACNT | Port A data direction      |
//! | $02         | SWCHB  | Port B output              |
//! | $03         | SWBCNT | Port B data direction      |
//! | $04 / $06   | INTIM  | -                          |
//! | $05 / $07   | TIMINT | -                          |
//! | $14-$17     | -      | TIM1T / TIM8T / TIM64T / T1024T |
//! | $1C-$1F     | -      | same, interrupt enabled    |
//!
//! Higher offsets mirror these through the low five address lines.

use emu_core::{Bus, Observable, Tickable, Value};
use log::debug;

/// Bytes of on-chip RAM.
pub const RAM_SIZE: usize = 128;

/// Prescaler values selected by the low two bits of a timer write.
const DIVIDERS: [u16; 4] = [1, 8, 64, 1024];

/// An external device wired to one of the I/O ports.
pub trait Port {
    /// Input lines as seen by the chip.
    fn read(&self) -> u8;

    /// Value written to the port's output register.
    fn write(&mut self, value: u8);
}

/// MOS 6532 RAM-I/O-Timer.
pub struct Riot6532<A: Port, B: Port> {
    ram: [u8; RAM_SIZE],

    /// Port A output register.
    ora: u8,
    /// Port A data direction register (1 = output).
    ddra: u8,
    /// Port B output register.
    orb: u8,
    /// Port B data direction register (1 = output).
    ddrb: u8,
    port_a: A,
    port_b: B,

    /// Current timer value (INTIM).
    timer: u8,
    /// Cycles per timer decrement, as last programmed.
    divider: u16,
    /// Cycles left until the next decrement.
    prescale: u16,
    /// Timer has passed zero; it now counts once per cycle.
    expired: bool,
    /// TIMINT bit 7; cleared by reading INTIM or writing the timer.
    interrupt: bool,
}

impl<A: Port, B: Port> Riot6532<A, B> {
    /// Create a RIOT with cleared RAM and timer.
    pub fn new(port_a: A, port_b: B) -> Self {
        Self {
            ram: [0; RAM_SIZE],
            ora: 0,
            ddra: 0,
            orb: 0,
            ddrb: 0,
            port_a,
            port_b,
            timer: 0,
            divider: 1024,
            prescale: 1024,
            expired: false,
            interrupt: false,
        }
    }

    /// Load power-on contents: RAM and the timer come up undefined on
    /// real hardware, so the caller supplies them.
    pub fn power_on(&mut self, ram: [u8; RAM_SIZE], timer: u8) {
        self.ram = ram;
        self.timer = timer;
    }

    /// Reset the I/O registers and timer control. RAM and the timer value
    /// are not affected.
    pub fn reset(&mut self) {
        self.ora = 0;
        self.ddra = 0;
        self.orb = 0;
        self.ddrb = 0;
        self.divider = 1024;
        self.prescale = 1024;
        self.expired = false;
        self.interrupt = false;
    }

    /// Read a RAM byte. Only the low seven address bits are decoded.
    #[must_use]
    pub fn read_ram(&self, address: u16) -> u8 {
        self.ram[usize::from(address) & (RAM_SIZE - 1)]
    }

    /// Write a RAM byte. Only the low seven address bits are decoded.
    pub fn write_ram(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address) & (RAM_SIZE - 1)] = value;
    }

    #[must_use]
    pub fn ram(&self) -> &[u8; RAM_SIZE] {
        &self.ram
    }

    /// Current INTIM value, without clearing the interrupt flag.
    #[must_use]
    pub fn timer(&self) -> u8 {
        self.timer
    }

    /// Cycles per timer decrement currently in effect.
    #[must_use]
    pub fn divider(&self) -> u16 {
        if self.expired { 1 } else { self.divider }
    }

    #[must_use]
    pub fn interrupt_flag(&self) -> bool {
        self.interrupt
    }

    pub fn port_a(&self) -> &A {
        &self.port_a
    }

    pub fn port_a_mut(&mut self) -> &mut A {
        &mut self.port_a
    }

    pub fn port_b(&self) -> &B {
        &self.port_b
    }

    pub fn port_b_mut(&mut self) -> &mut B {
        &mut self.port_b
    }

    /// Read a register without clearing the interrupt flag.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        if address & 0x04 == 0 {
            return match address & 0x03 {
                0x00 => self.read_port_a(),
                0x01 => self.ddra,
                0x02 => self.read_port_b(),
                _ => self.ddrb,
            };
        }
        if address & 0x01 == 0 {
            self.timer
        } else {
            u8::from(self.interrupt) << 7
        }
    }

    /// Set the timer and prescaler. `select` is the low two bits of the
    /// write address.
    fn set_timer(&mut self, value: u8, select: u16) {
        let divider = DIVIDERS[usize::from(select & 0x03)];
        self.timer = value;
        self.divider = divider;
        self.prescale = divider;
        self.expired = false;
        self.interrupt = false;
    }

    fn read_port_a(&self) -> u8 {
        (self.ora & self.ddra) | (self.port_a.read() & !self.ddra)
    }

    fn read_port_b(&self) -> u8 {
        (self.orb & self.ddrb) | (self.port_b.read() & !self.ddrb)
    }
}

impl<A: Port, B: Port> Tickable for Riot6532<A, B> {
    /// Advance one CPU cycle.
    fn tick(&mut self) {
        if self.prescale > 1 {
            self.prescale -= 1;
            return;
        }
        let (value, underflow) = self.timer.overflowing_sub(1);
        self.timer = value;
        if underflow {
            self.expired = true;
            self.interrupt = true;
        }
        self.prescale = self.divider();
    }
}

impl<A: Port, B: Port> Bus for Riot6532<A, B> {
    /// Read a register; `address` is relative to the register window.
    fn read(&mut self, address: u16) -> u8 {
        let value = self.peek(address);
        if address & 0x05 == 0x04 {
            // INTIM
            self.interrupt = false;
        }
        value
    }

    /// Write a register; `address` is relative to the register window.
    fn write(&mut self, address: u16, value: u8) {
        if address & 0x04 == 0 {
            match address & 0x03 {
                0x00 => {
                    self.ora = value;
                    self.port_a.write(value);
                }
                0x01 => self.ddra = value,
                0x02 => {
                    self.orb = value;
                    self.port_b.write(value);
                }
                _ => self.ddrb = value,
            }
        } else if address & 0x10 != 0 {
            self.set_timer(value, address);
        } else {
            debug!("ignoring RIOT edge-control write ${value:02X} at offset ${address:02X}");
        }
    }
}

impl<A: Port, B: Port> Observable for Riot6532<A, B> {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "timer" | "intim" => Some(self.timer.into()),
            "divider" => Some(Value::U16(self.divider())),
            "timint" => Some(self.interrupt.into()),
            "swcha" => Some(self.read_port_a().into()),
            "swacnt" => Some(self.ddra.into()),
            "swchb" => Some(self.read_port_b().into()),
            "swbcnt" => Some(self.ddrb.into()),
            "ram" => Some(Value::from(&self.ram[..])),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "timer", "divider", "timint", "swcha", "swacnt", "swchb", "swbcnt", "ram",
        ]
    }
}
