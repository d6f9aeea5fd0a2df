//! Instruction-stepped MOS 6502 CPU emulator.
//!
//! Covers the documented NMOS instruction set, which is all the 6507 in the
//! Atari 2600 ever runs. Each `step()` fetches, decodes and executes one
//! whole instruction and reports how many cycles it took, including
//! branch-taken and page-crossing penalties.
//!
//! Opcodes outside the documented set are reported as errors rather than
//! executed.

mod cpu;
mod disasm;
pub mod flags;
mod instruction;
mod registers;

pub use cpu::{ExecuteError, IRQ_VECTOR, Mos6502, RESET_VECTOR};
pub use disasm::{Disassembler, Line};
pub use flags::Status;
pub use instruction::{
    AddressingMode, DecodeError, Instruction, Operation, decode,
    base_cycles as instruction_cycles,
};
pub use registers::Registers;
