//! CPU core trait.

use crate::Bus;

/// A CPU core that executes whole instructions.
///
/// The bus is passed in rather than owned, so the machine that owns the CPU
/// can also own the devices behind the bus without a reference cycle.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Error raised when an instruction cannot be executed.
    type Error;

    /// Execute exactly one instruction and return the cycles it took.
    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, Self::Error>;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Reset the CPU, loading the program counter through the bus.
    fn reset<B: Bus>(&mut self, bus: &mut B);
}
