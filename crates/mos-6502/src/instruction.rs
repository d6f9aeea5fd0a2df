//! Opcode decoding.
//!
//! Documented 6502 opcodes follow an `aaabbbcc` layout: `cc` selects the
//! instruction group, `aaa` the operation within the group and `bbb` the
//! addressing mode. Single-byte instructions in groups 0 and 2 break the
//! pattern and are matched by value first.

use std::fmt;

use thiserror::Error;

/// Opcode decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The byte is not a documented opcode.
    #[error("invalid opcode ${opcode:02X}")]
    InvalidOpcode { opcode: u8 },
    /// The buffer ended before the instruction's operand bytes.
    #[error("opcode ${opcode:02X} is missing operand bytes")]
    Truncated { opcode: u8 },
}

/// Instruction operation (mnemonic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    // Group 1
    Ora,
    And,
    Eor,
    Adc,
    Sta,
    Lda,
    Cmp,
    Sbc,

    // Group 2
    Asl,
    Rol,
    Lsr,
    Ror,
    Stx,
    Ldx,
    Dec,
    Inc,

    // Group 0
    Bit,
    Jmp,
    Sty,
    Ldy,
    Cpy,
    Cpx,

    // Branches
    Bpl,
    Bmi,
    Bvc,
    Bvs,
    Bcc,
    Bcs,
    Bne,
    Beq,

    // Stack and control flow
    Brk,
    Jsr,
    Rti,
    Rts,
    Php,
    Plp,
    Pha,
    Pla,

    // Flags
    Clc,
    Sec,
    Cli,
    Sei,
    Clv,
    Cld,
    Sed,

    // Register transfers and increments
    Dey,
    Tay,
    Iny,
    Inx,
    Tya,
    Txa,
    Txs,
    Tax,
    Tsx,
    Dex,
    Nop,
}

const GROUP1: [Operation; 8] = [
    Operation::Ora,
    Operation::And,
    Operation::Eor,
    Operation::Adc,
    Operation::Sta,
    Operation::Lda,
    Operation::Cmp,
    Operation::Sbc,
];

const GROUP2: [Operation; 8] = [
    Operation::Asl,
    Operation::Rol,
    Operation::Lsr,
    Operation::Ror,
    Operation::Stx,
    Operation::Ldx,
    Operation::Dec,
    Operation::Inc,
];

const BRANCHES: [Operation; 8] = [
    Operation::Bpl,
    Operation::Bmi,
    Operation::Bvc,
    Operation::Bvs,
    Operation::Bcc,
    Operation::Bcs,
    Operation::Bne,
    Operation::Beq,
];

impl Operation {
    /// Lower-case assembler mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Ora => "ora",
            Self::And => "and",
            Self::Eor => "eor",
            Self::Adc => "adc",
            Self::Sta => "sta",
            Self::Lda => "lda",
            Self::Cmp => "cmp",
            Self::Sbc => "sbc",
            Self::Asl => "asl",
            Self::Rol => "rol",
            Self::Lsr => "lsr",
            Self::Ror => "ror",
            Self::Stx => "stx",
            Self::Ldx => "ldx",
            Self::Dec => "dec",
            Self::Inc => "inc",
            Self::Bit => "bit",
            Self::Jmp => "jmp",
            Self::Sty => "sty",
            Self::Ldy => "ldy",
            Self::Cpy => "cpy",
            Self::Cpx => "cpx",
            Self::Bpl => "bpl",
            Self::Bmi => "bmi",
            Self::Bvc => "bvc",
            Self::Bvs => "bvs",
            Self::Bcc => "bcc",
            Self::Bcs => "bcs",
            Self::Bne => "bne",
            Self::Beq => "beq",
            Self::Brk => "brk",
            Self::Jsr => "jsr",
            Self::Rti => "rti",
            Self::Rts => "rts",
            Self::Php => "php",
            Self::Plp => "plp",
            Self::Pha => "pha",
            Self::Pla => "pla",
            Self::Clc => "clc",
            Self::Sec => "sec",
            Self::Cli => "cli",
            Self::Sei => "sei",
            Self::Clv => "clv",
            Self::Cld => "cld",
            Self::Sed => "sed",
            Self::Dey => "dey",
            Self::Tay => "tay",
            Self::Iny => "iny",
            Self::Inx => "inx",
            Self::Tya => "tya",
            Self::Txa => "txa",
            Self::Txs => "txs",
            Self::Tax => "tax",
            Self::Tsx => "tsx",
            Self::Dex => "dex",
            Self::Nop => "nop",
        }
    }

    /// Operations that read their operand and take an extra cycle when
    /// indexing crosses a page.
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(
            self,
            Self::Ora
                | Self::And
                | Self::Eor
                | Self::Adc
                | Self::Lda
                | Self::Cmp
                | Self::Sbc
                | Self::Ldx
                | Self::Ldy
                | Self::Cpx
                | Self::Cpy
                | Self::Bit
        )
    }

    /// Read-modify-write operations.
    #[must_use]
    pub const fn is_read_modify_write(self) -> bool {
        matches!(
            self,
            Self::Asl | Self::Rol | Self::Lsr | Self::Ror | Self::Inc | Self::Dec
        )
    }

    /// Conditional branches.
    #[must_use]
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Self::Bpl
                | Self::Bmi
                | Self::Bvc
                | Self::Bvs
                | Self::Bcc
                | Self::Bcs
                | Self::Bne
                | Self::Beq
        )
    }
}

/// Operand addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// `($nnnn)`, JMP only.
    Indirect,
    /// `($nn,X)`
    IndirectX,
    /// `($nn),Y`
    IndirectY,
    Relative,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    #[must_use]
    pub const fn operand_len(self) -> u16 {
        match self {
            Self::Implied | Self::Accumulator => 0,
            Self::Immediate
            | Self::ZeroPage
            | Self::ZeroPageX
            | Self::ZeroPageY
            | Self::IndirectX
            | Self::IndirectY
            | Self::Relative => 1,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 2,
        }
    }

    /// Modes that add an index to a 16-bit base and so can cross a page.
    #[must_use]
    pub const fn is_indexed_absolute(self) -> bool {
        matches!(self, Self::AbsoluteX | Self::AbsoluteY | Self::IndirectY)
    }
}

/// Decode an opcode byte into its operation and addressing mode.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidOpcode`] for undocumented opcodes.
pub fn decode(opcode: u8) -> Result<(Operation, AddressingMode), DecodeError> {
    use AddressingMode as M;

    let aaa = usize::from(opcode >> 5);
    let bbb = (opcode >> 2) & 0x07;
    let invalid = Err(DecodeError::InvalidOpcode { opcode });

    match opcode & 0x03 {
        0b01 => {
            let operation = GROUP1[aaa];
            let mode = match bbb {
                0 => M::IndirectX,
                1 => M::ZeroPage,
                2 => M::Immediate,
                3 => M::Absolute,
                4 => M::IndirectY,
                5 => M::ZeroPageX,
                6 => M::AbsoluteY,
                _ => M::AbsoluteX,
            };
            if operation == Operation::Sta && mode == M::Immediate {
                return invalid;
            }
            Ok((operation, mode))
        }
        0b10 => {
            let single = match opcode {
                0x8A => Some(Operation::Txa),
                0x9A => Some(Operation::Txs),
                0xAA => Some(Operation::Tax),
                0xBA => Some(Operation::Tsx),
                0xCA => Some(Operation::Dex),
                0xEA => Some(Operation::Nop),
                _ => None,
            };
            if let Some(operation) = single {
                return Ok((operation, M::Implied));
            }

            let operation = GROUP2[aaa];
            // STX/LDX index with Y where the others index with X.
            let uses_y = matches!(operation, Operation::Stx | Operation::Ldx);
            let mode = match bbb {
                0 if operation == Operation::Ldx => M::Immediate,
                1 => M::ZeroPage,
                2 if aaa < 4 => M::Accumulator,
                3 => M::Absolute,
                5 if uses_y => M::ZeroPageY,
                5 => M::ZeroPageX,
                7 if operation == Operation::Ldx => M::AbsoluteY,
                7 if operation != Operation::Stx => M::AbsoluteX,
                _ => return invalid,
            };
            Ok((operation, mode))
        }
        0b00 => {
            let single = match opcode {
                0x00 => Some((Operation::Brk, M::Implied)),
                0x20 => Some((Operation::Jsr, M::Absolute)),
                0x40 => Some((Operation::Rti, M::Implied)),
                0x60 => Some((Operation::Rts, M::Implied)),
                0x6C => Some((Operation::Jmp, M::Indirect)),
                _ => None,
            };
            if let Some(decoded) = single {
                return Ok(decoded);
            }

            match bbb {
                2 => {
                    let operation = [
                        Operation::Php,
                        Operation::Plp,
                        Operation::Pha,
                        Operation::Pla,
                        Operation::Dey,
                        Operation::Tay,
                        Operation::Iny,
                        Operation::Inx,
                    ][aaa];
                    Ok((operation, M::Implied))
                }
                4 => Ok((BRANCHES[aaa], M::Relative)),
                6 => {
                    let operation = [
                        Operation::Clc,
                        Operation::Sec,
                        Operation::Cli,
                        Operation::Sei,
                        Operation::Tya,
                        Operation::Clv,
                        Operation::Cld,
                        Operation::Sed,
                    ][aaa];
                    Ok((operation, M::Implied))
                }
                _ => {
                    let operation = match aaa {
                        1 => Operation::Bit,
                        2 => Operation::Jmp,
                        4 => Operation::Sty,
                        5 => Operation::Ldy,
                        6 => Operation::Cpy,
                        7 => Operation::Cpx,
                        _ => return invalid,
                    };
                    let mode = match (operation, bbb) {
                        (Operation::Ldy | Operation::Cpy | Operation::Cpx, 0) => M::Immediate,
                        (Operation::Jmp, 1) => return invalid,
                        (_, 1) => M::ZeroPage,
                        (_, 3) => M::Absolute,
                        (Operation::Sty | Operation::Ldy, 5) => M::ZeroPageX,
                        (Operation::Ldy, 7) => M::AbsoluteX,
                        _ => return invalid,
                    };
                    Ok((operation, mode))
                }
            }
        }
        _ => invalid,
    }
}

/// Base cycle count, before branch and page-crossing penalties.
#[must_use]
pub const fn base_cycles(operation: Operation, mode: AddressingMode) -> u32 {
    use AddressingMode as M;

    match operation {
        Operation::Brk => 7,
        Operation::Jsr | Operation::Rts | Operation::Rti => 6,
        Operation::Jmp => match mode {
            M::Indirect => 5,
            _ => 3,
        },
        Operation::Pha | Operation::Php => 3,
        Operation::Pla | Operation::Plp => 4,
        Operation::Sta | Operation::Stx | Operation::Sty => match mode {
            M::ZeroPage => 3,
            M::ZeroPageX | M::ZeroPageY | M::Absolute => 4,
            M::AbsoluteX | M::AbsoluteY => 5,
            _ => 6,
        },
        _ if operation.is_read_modify_write() => match mode {
            M::Accumulator => 2,
            M::ZeroPage => 5,
            M::ZeroPageX | M::Absolute => 6,
            _ => 7,
        },
        _ => match mode {
            M::ZeroPage => 3,
            M::ZeroPageX | M::ZeroPageY | M::Absolute | M::AbsoluteX | M::AbsoluteY => 4,
            M::IndirectY => 5,
            M::IndirectX => 6,
            _ => 2,
        },
    }
}

/// A decoded instruction: operation, addressing mode and raw operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u8,
    pub operation: Operation,
    pub mode: AddressingMode,
    /// Operand bytes as a little-endian value (zero when there are none).
    pub operand: u16,
}

impl Instruction {
    /// Decode an instruction from the start of `bytes`.
    ///
    /// # Errors
    ///
    /// Fails on an undocumented opcode, an empty slice, or a slice too
    /// short to hold the operand.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let Some(&opcode) = bytes.first() else {
            return Err(DecodeError::Truncated { opcode: 0 });
        };
        let (operation, mode) = decode(opcode)?;
        let operand = match (mode.operand_len(), &bytes[1..]) {
            (0, _) => 0,
            (1, [low, ..]) => u16::from(*low),
            (2, [low, high, ..]) => emu_core::bits::word(*low, *high),
            _ => return Err(DecodeError::Truncated { opcode }),
        };
        Ok(Self {
            opcode,
            operation,
            mode,
            operand,
        })
    }

    /// Instruction length in bytes, opcode included.
    #[must_use]
    pub const fn len(&self) -> u16 {
        1 + self.mode.operand_len()
    }

    /// Always false; the opcode byte is always present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Cycles taken when no branch or page-crossing penalty applies.
    #[must_use]
    pub const fn base_cycles(&self) -> u32 {
        base_cycles(self.operation, self.mode)
    }

    /// Assembler mnemonic.
    #[must_use]
    pub const fn mnemonic(&self) -> &'static str {
        self.operation.mnemonic()
    }

    /// Branch destination when this instruction sits at `address`.
    #[must_use]
    pub fn branch_target(&self, address: u16) -> Option<u16> {
        if self.mode != AddressingMode::Relative {
            return None;
        }
        let offset = self.operand as u8 as i8;
        Some(
            address
                .wrapping_add(self.len())
                .wrapping_add_signed(i16::from(offset)),
        )
    }

    /// Formatted operand, resolving relative branches against `address`.
    #[must_use]
    pub fn operand_text(&self, address: Option<u16>) -> String {
        use AddressingMode as M;

        let value = self.operand;
        match self.mode {
            M::Implied => String::new(),
            M::Accumulator => "a".to_string(),
            M::Immediate => format!("#${value:02x}"),
            M::ZeroPage => format!("${value:02x}"),
            M::ZeroPageX => format!("${value:02x},X"),
            M::ZeroPageY => format!("${value:02x},Y"),
            M::Absolute => format!("${value:04x}"),
            M::AbsoluteX => format!("${value:04x},X"),
            M::AbsoluteY => format!("${value:04x},Y"),
            M::Indirect => format!("(${value:04x})"),
            M::IndirectX => format!("(${value:02x},X)"),
            M::IndirectY => format!("(${value:02x}),Y"),
            M::Relative => match address.and_then(|a| self.branch_target(a)) {
                Some(target) => format!("${target:04x}"),
                None => format!("{:+}", value as u8 as i8),
            },
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operand = self.operand_text(None);
        if operand.is_empty() {
            write!(f, "{}", self.mnemonic())
        } else {
            write!(f, "{} {operand}", self.mnemonic())
        }
    }
}
