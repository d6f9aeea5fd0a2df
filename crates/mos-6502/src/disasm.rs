//! Disassembler over a byte buffer.
//!
//! Decoding is lazy: each call to `next()` decodes one instruction. Bytes
//! that do not start a documented instruction produce an error entry and
//! the walk resumes at the following byte. An instruction cut short by the
//! end of the buffer produces a final error entry and ends the walk, so its
//! operand bytes are never decoded as opcodes. The iterator is `Clone`, so
//! a listing can be restarted from any point without re-reading memory.

use std::fmt;

use crate::instruction::{DecodeError, Instruction};

/// One disassembled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub address: u16,
    pub instruction: Result<Instruction, DecodeError>,
}

impl Line {
    /// Bytes this entry decodes. A truncated instruction counts only its
    /// opcode; the walk still ends after it.
    #[must_use]
    pub fn len(&self) -> u16 {
        match &self.instruction {
            Ok(ins) => ins.len(),
            Err(_) => 1,
        }
    }

    /// Always false; every entry covers at least one byte.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.instruction {
            Ok(ins) => {
                let operand = ins.operand_text(Some(self.address));
                if operand.is_empty() {
                    write!(f, "${:04x}  {}", self.address, ins.mnemonic())
                } else {
                    write!(f, "${:04x}  {} {operand}", self.address, ins.mnemonic())
                }
            }
            Err(DecodeError::InvalidOpcode { opcode } | DecodeError::Truncated { opcode }) => {
                write!(f, "${:04x}  .byte ${opcode:02x}", self.address)
            }
        }
    }
}

/// Iterator of [`Line`]s over `bytes`, which are mapped at `base`.
#[derive(Debug, Clone)]
pub struct Disassembler<'a> {
    bytes: &'a [u8],
    base: u16,
    offset: usize,
}

impl<'a> Disassembler<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8], base: u16) -> Self {
        Self {
            bytes,
            base,
            offset: 0,
        }
    }

    /// Position the walk at `address`. Addresses outside the buffer end it.
    pub fn seek(&mut self, address: u16) {
        self.offset = usize::from(address.wrapping_sub(self.base));
    }
}

impl Iterator for Disassembler<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        let rest = self.bytes.get(self.offset..).filter(|r| !r.is_empty())?;
        let address = self.base.wrapping_add(self.offset as u16);
        let instruction = Instruction::from_bytes(rest);
        let line = Line {
            address,
            instruction,
        };
        self.offset = match line.instruction {
            Err(DecodeError::Truncated { .. }) => self.bytes.len(),
            _ => self.offset + usize::from(line.len()),
        };
        Some(line)
    }
}
