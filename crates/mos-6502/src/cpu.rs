//! 6502 CPU implementation.
//!
//! Instruction-stepped: `step()` fetches and executes one whole instruction
//! and returns the cycles it took. Cycle counts follow the NMOS timing
//! tables, with +1 when a taken branch or an indexed read crosses a page
//! and +1 for any taken branch.

use emu_core::bits::{crosses_page, word};
use emu_core::{Bus, Cpu, Observable, Value};
use thiserror::Error;

use crate::flags::{B, C, D, I, N, V, Z};
use crate::instruction::{AddressingMode, Instruction, Operation, decode};
use crate::{Registers, Status};

/// Reset vector location.
pub const RESET_VECTOR: u16 = 0xFFFC;

/// IRQ/BRK vector location.
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Failure to execute the instruction at the program counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecuteError {
    /// The opcode byte is not a documented instruction. CPU state is
    /// unchanged; PC still points at the opcode.
    #[error("invalid opcode ${opcode:02X} at ${address:04X}")]
    InvalidOpcode { address: u16, opcode: u8 },
}

/// The MOS 6502 CPU.
#[derive(Debug, Default)]
pub struct Mos6502 {
    /// CPU registers.
    pub regs: Registers,

    /// Total cycles executed since reset.
    total_cycles: u64,
}

impl Mos6502 {
    /// Create a new 6502 with registers in their reset state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            total_cycles: 0,
        }
    }

    /// Total cycles executed since the last reset.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Decode the instruction at PC without executing it.
    ///
    /// Reads go through the bus, so this should only be used on buses whose
    /// reads at PC have no side effects (ROM).
    pub fn peek_instruction<B: Bus>(&self, bus: &mut B) -> Result<Instruction, ExecuteError> {
        let address = self.regs.pc;
        let opcode = bus.read(address);
        let (operation, mode) =
            decode(opcode).map_err(|_| ExecuteError::InvalidOpcode { address, opcode })?;
        let operand = match mode.operand_len() {
            0 => 0,
            1 => u16::from(bus.read(address.wrapping_add(1))),
            _ => word(
                bus.read(address.wrapping_add(1)),
                bus.read(address.wrapping_add(2)),
            ),
        };
        Ok(Instruction {
            opcode,
            operation,
            mode,
            operand,
        })
    }

    /// Fetch, decode and execute one instruction.
    ///
    /// Returns the number of cycles consumed.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError::InvalidOpcode`] without touching any state if
    /// the byte at PC is not a documented opcode.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, ExecuteError> {
        let instruction = self.peek_instruction(bus)?;
        self.regs.pc = self.regs.pc.wrapping_add(instruction.len());

        let cycles = self.execute(bus, &instruction);
        self.total_cycles += u64::from(cycles);
        Ok(cycles)
    }

    /// Reset: clear A/X/Y/P, set S to $FD and load PC from the reset vector.
    pub fn reset<B: Bus>(&mut self, bus: &mut B) {
        self.regs = Registers::new();
        self.regs.pc = read_word(bus, RESET_VECTOR);
        self.total_cycles = 0;
    }

    // ========================================================================
    // Operand resolution
    // ========================================================================

    /// Effective address and whether indexing crossed a page.
    fn effective_address<B: Bus>(&self, bus: &mut B, ins: &Instruction) -> (u16, bool) {
        let operand = ins.operand;
        let zp = operand as u8;
        match ins.mode {
            AddressingMode::ZeroPage => (u16::from(zp), false),
            AddressingMode::ZeroPageX => (u16::from(zp.wrapping_add(self.regs.x)), false),
            AddressingMode::ZeroPageY => (u16::from(zp.wrapping_add(self.regs.y)), false),
            AddressingMode::Absolute => (operand, false),
            AddressingMode::AbsoluteX => indexed(operand, self.regs.x),
            AddressingMode::AbsoluteY => indexed(operand, self.regs.y),
            AddressingMode::Indirect => {
                // The high byte is fetched without carrying into the page.
                let high_addr = (operand & 0xFF00) | (operand.wrapping_add(1) & 0x00FF);
                (word(bus.read(operand), bus.read(high_addr)), false)
            }
            AddressingMode::IndirectX => {
                let pointer = zp.wrapping_add(self.regs.x);
                (read_zero_page_word(bus, pointer), false)
            }
            AddressingMode::IndirectY => {
                let base = read_zero_page_word(bus, zp);
                indexed(base, self.regs.y)
            }
            AddressingMode::Relative => {
                let target = ins
                    .branch_target(self.regs.pc.wrapping_sub(ins.len()))
                    .unwrap_or(self.regs.pc);
                (target, crosses_page(self.regs.pc, target))
            }
            AddressingMode::Implied | AddressingMode::Accumulator | AddressingMode::Immediate => {
                (0, false)
            }
        }
    }

    /// Operand value for read operations, plus the page-crossing flag.
    fn load<B: Bus>(&self, bus: &mut B, ins: &Instruction) -> (u8, bool) {
        match ins.mode {
            AddressingMode::Immediate => (ins.operand as u8, false),
            AddressingMode::Accumulator => (self.regs.a, false),
            _ => {
                let (address, crossed) = self.effective_address(bus, ins);
                (bus.read(address), crossed)
            }
        }
    }

    fn push<B: Bus>(&mut self, bus: &mut B, value: u8) {
        let address = self.regs.push();
        bus.write(address, value);
    }

    fn pull<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let address = self.regs.pop();
        bus.read(address)
    }

    fn push_word<B: Bus>(&mut self, bus: &mut B, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, value as u8);
    }

    fn pull_word<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let low = self.pull(bus);
        let high = self.pull(bus);
        word(low, high)
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Execute a decoded instruction. PC already points past it.
    fn execute<B: Bus>(&mut self, bus: &mut B, ins: &Instruction) -> u32 {
        let mut cycles = ins.base_cycles();
        let op = ins.operation;

        if op.is_read() {
            let (value, crossed) = self.load(bus, ins);
            if crossed && ins.mode.is_indexed_absolute() {
                cycles += 1;
            }
            self.do_read(op, value);
            return cycles;
        }

        if op.is_read_modify_write() {
            if ins.mode == AddressingMode::Accumulator {
                self.regs.a = self.do_modify(op, self.regs.a);
            } else {
                let (address, _) = self.effective_address(bus, ins);
                let value = bus.read(address);
                let result = self.do_modify(op, value);
                bus.write(address, result);
            }
            return cycles;
        }

        if op.is_branch() {
            if self.branch_taken(op) {
                let (target, crossed) = self.effective_address(bus, ins);
                cycles += if crossed { 2 } else { 1 };
                self.regs.pc = target;
            }
            return cycles;
        }

        match op {
            Operation::Sta | Operation::Stx | Operation::Sty => {
                let value = match op {
                    Operation::Sta => self.regs.a,
                    Operation::Stx => self.regs.x,
                    _ => self.regs.y,
                };
                let (address, _) = self.effective_address(bus, ins);
                bus.write(address, value);
            }
            Operation::Jmp => {
                let (target, _) = self.effective_address(bus, ins);
                self.regs.pc = target;
            }
            Operation::Jsr => {
                // Pushes the address of the last operand byte.
                let return_addr = self.regs.pc.wrapping_sub(1);
                self.push_word(bus, return_addr);
                self.regs.pc = ins.operand;
            }
            Operation::Rts => {
                self.regs.pc = self.pull_word(bus).wrapping_add(1);
            }
            Operation::Rti => {
                let status = self.pull(bus);
                self.regs.p = Status::from_byte(status);
                self.regs.pc = self.pull_word(bus);
            }
            Operation::Brk => {
                // BRK skips a padding byte after the opcode.
                let return_addr = self.regs.pc.wrapping_add(1);
                self.push_word(bus, return_addr);
                self.push(bus, self.regs.p.to_byte_brk());
                self.regs.p.set(I);
                self.regs.pc = read_word(bus, IRQ_VECTOR);
            }
            Operation::Pha => self.push(bus, self.regs.a),
            Operation::Php => self.push(bus, self.regs.p.to_byte_brk()),
            Operation::Pla => {
                let value = self.pull(bus);
                self.regs.a = value;
                self.regs.p.update_nz(value);
            }
            Operation::Plp => {
                let value = self.pull(bus);
                self.regs.p = Status::from_byte(value);
            }
            Operation::Clc => self.regs.p.clear(C),
            Operation::Sec => self.regs.p.set(C),
            Operation::Cli => self.regs.p.clear(I),
            Operation::Sei => self.regs.p.set(I),
            Operation::Clv => self.regs.p.clear(V),
            Operation::Cld => self.regs.p.clear(D),
            Operation::Sed => self.regs.p.set(D),
            Operation::Tax => self.set_x(self.regs.a),
            Operation::Tay => self.set_y(self.regs.a),
            Operation::Txa => self.set_a(self.regs.x),
            Operation::Tya => self.set_a(self.regs.y),
            Operation::Tsx => self.set_x(self.regs.s),
            Operation::Txs => self.regs.s = self.regs.x,
            Operation::Inx => self.set_x(self.regs.x.wrapping_add(1)),
            Operation::Iny => self.set_y(self.regs.y.wrapping_add(1)),
            Operation::Dex => self.set_x(self.regs.x.wrapping_sub(1)),
            Operation::Dey => self.set_y(self.regs.y.wrapping_sub(1)),
            _ => {}
        }
        cycles
    }

    fn set_a(&mut self, value: u8) {
        self.regs.a = value;
        self.regs.p.update_nz(value);
    }

    fn set_x(&mut self, value: u8) {
        self.regs.x = value;
        self.regs.p.update_nz(value);
    }

    fn set_y(&mut self, value: u8) {
        self.regs.y = value;
        self.regs.p.update_nz(value);
    }

    fn branch_taken(&self, op: Operation) -> bool {
        let p = self.regs.p;
        match op {
            Operation::Bpl => !p.is_set(N),
            Operation::Bmi => p.is_set(N),
            Operation::Bvc => !p.is_set(V),
            Operation::Bvs => p.is_set(V),
            Operation::Bcc => !p.is_set(C),
            Operation::Bcs => p.is_set(C),
            Operation::Bne => !p.is_set(Z),
            Operation::Beq => p.is_set(Z),
            _ => false,
        }
    }

    fn do_read(&mut self, op: Operation, value: u8) {
        match op {
            Operation::Lda => self.set_a(value),
            Operation::Ldx => self.set_x(value),
            Operation::Ldy => self.set_y(value),
            Operation::Ora => self.set_a(self.regs.a | value),
            Operation::And => self.set_a(self.regs.a & value),
            Operation::Eor => self.set_a(self.regs.a ^ value),
            Operation::Adc => self.do_adc(value),
            Operation::Sbc => self.do_sbc(value),
            Operation::Cmp => self.do_compare(self.regs.a, value),
            Operation::Cpx => self.do_compare(self.regs.x, value),
            Operation::Cpy => self.do_compare(self.regs.y, value),
            Operation::Bit => {
                self.regs.p.set_if(Z, self.regs.a & value == 0);
                self.regs.p.set_if(N, value & 0x80 != 0);
                self.regs.p.set_if(V, value & 0x40 != 0);
            }
            _ => {}
        }
    }

    fn do_modify(&mut self, op: Operation, value: u8) -> u8 {
        let result = match op {
            Operation::Asl => {
                self.regs.p.set_if(C, value & 0x80 != 0);
                value << 1
            }
            Operation::Lsr => {
                self.regs.p.set_if(C, value & 0x01 != 0);
                value >> 1
            }
            Operation::Rol => {
                let carry = u8::from(self.regs.p.is_set(C));
                self.regs.p.set_if(C, value & 0x80 != 0);
                (value << 1) | carry
            }
            Operation::Ror => {
                let carry = if self.regs.p.is_set(C) { 0x80 } else { 0 };
                self.regs.p.set_if(C, value & 0x01 != 0);
                (value >> 1) | carry
            }
            Operation::Inc => value.wrapping_add(1),
            Operation::Dec => value.wrapping_sub(1),
            _ => value,
        };
        self.regs.p.update_nz(result);
        result
    }

    fn do_compare(&mut self, register: u8, value: u8) {
        self.regs.p.set_if(C, register >= value);
        self.regs.p.update_nz(register.wrapping_sub(value));
    }

    fn do_adc(&mut self, val: u8) {
        if self.regs.p.is_set(D) {
            self.do_adc_decimal(val);
        } else {
            self.do_adc_binary(val);
        }
    }

    fn do_adc_binary(&mut self, val: u8) {
        let a = self.regs.a;
        let carry = u16::from(self.regs.p.is_set(C));
        let sum = u16::from(a) + u16::from(val) + carry;
        let result = sum as u8;

        self.regs.p.set_if(C, sum > 0xFF);
        self.regs
            .p
            .set_if(V, (a ^ result) & (val ^ result) & 0x80 != 0);
        self.set_a(result);
    }

    fn do_adc_decimal(&mut self, val: u8) {
        let a = self.regs.a;
        let carry = u8::from(self.regs.p.is_set(C));

        let mut lo = (a & 0x0F) + (val & 0x0F) + carry;
        if lo > 9 {
            lo += 6;
        }
        let mut hi = (a >> 4) + (val >> 4) + u8::from(lo > 0x0F);

        // NMOS: Z comes from the binary sum, N and V from the
        // intermediate high nibble.
        let binary = a.wrapping_add(val).wrapping_add(carry);
        self.regs.p.set_if(Z, binary == 0);
        self.regs.p.set_if(N, hi & 0x08 != 0);
        let intermediate = (hi << 4) | (lo & 0x0F);
        self.regs
            .p
            .set_if(V, (a ^ intermediate) & !(a ^ val) & 0x80 != 0);

        if hi > 9 {
            hi += 6;
        }
        self.regs.p.set_if(C, hi > 0x0F);
        self.regs.a = (hi << 4) | (lo & 0x0F);
    }

    fn do_sbc(&mut self, val: u8) {
        if !self.regs.p.is_set(D) {
            // SBC is ADC with the operand inverted.
            self.do_adc_binary(!val);
            return;
        }

        let a = self.regs.a;
        let borrow = i16::from(!self.regs.p.is_set(C));

        // Flags come from the binary subtraction on NMOS parts.
        let binary = i16::from(a) - i16::from(val) - borrow;
        let binary_byte = binary as u8;
        self.regs.p.set_if(C, binary >= 0);
        self.regs.p.update_nz(binary_byte);
        self.regs
            .p
            .set_if(V, (a ^ binary_byte) & (a ^ val) & 0x80 != 0);

        let mut lo = i16::from(a & 0x0F) - i16::from(val & 0x0F) - borrow;
        let mut hi = i16::from(a >> 4) - i16::from(val >> 4);
        if lo < 0 {
            lo -= 6;
            hi -= 1;
        }
        if hi < 0 {
            hi -= 6;
        }
        self.regs.a = ((hi << 4) as u8) | ((lo & 0x0F) as u8);
    }
}

/// Add an index to a base address, reporting page crossings.
fn indexed(base: u16, index: u8) -> (u16, bool) {
    let address = base.wrapping_add(u16::from(index));
    (address, crosses_page(base, address))
}

fn read_word<B: Bus>(bus: &mut B, address: u16) -> u16 {
    let low = bus.read(address);
    let high = bus.read(address.wrapping_add(1));
    word(low, high)
}

/// Read a pointer from zero page; the high byte wraps within page zero.
fn read_zero_page_word<B: Bus>(bus: &mut B, pointer: u8) -> u16 {
    let low = bus.read(u16::from(pointer));
    let high = bus.read(u16::from(pointer.wrapping_add(1)));
    word(low, high)
}

// ============================================================================
// Trait implementations
// ============================================================================

impl Cpu for Mos6502 {
    type Registers = Registers;
    type Error = ExecuteError;

    fn step<Bs: Bus>(&mut self, bus: &mut Bs) -> Result<u32, Self::Error> {
        Mos6502::step(self, bus)
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Self::Registers {
        self.regs
    }

    fn reset<Bs: Bus>(&mut self, bus: &mut Bs) {
        Mos6502::reset(self, bus);
    }
}

impl Observable for Mos6502 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" | "sp" => Some(self.regs.s.into()),
            "p" | "status" => Some(self.regs.p.0.into()),
            "flags.c" | "c" => Some(self.regs.p.is_set(C).into()),
            "flags.z" | "z" => Some(self.regs.p.is_set(Z).into()),
            "flags.i" | "i" => Some(self.regs.p.is_set(I).into()),
            "flags.d" | "d" => Some(self.regs.p.is_set(D).into()),
            "flags.b" | "b" => Some(self.regs.p.is_set(B).into()),
            "flags.v" | "v" => Some(self.regs.p.is_set(V).into()),
            "flags.n" | "n" => Some(self.regs.p.is_set(N).into()),
            "cycles" => Some(Value::U64(self.total_cycles)),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "a", "x", "y", "s", "p", "flags.c", "flags.z", "flags.i", "flags.d", "flags.b",
            "flags.v", "flags.n", "cycles",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    fn run(program: &[u8]) -> (Mos6502, SimpleBus, u32) {
        let mut cpu = Mos6502::new();
        let mut bus = SimpleBus::new();
        bus.load(0x0200, program);
        cpu.regs.pc = 0x0200;
        let cycles = cpu.step(&mut bus).expect("valid opcode");
        (cpu, bus, cycles)
    }

    #[test]
    fn test_lda_immediate() {
        let (cpu, _, cycles) = run(&[0xA9, 0x42]);
        assert_eq!(cpu.regs.a, 0x42);
        assert_eq!(cpu.regs.pc, 0x0202);
        assert_eq!(cycles, 2);
    }

    #[test]
    fn test_jmp_absolute() {
        let (cpu, _, cycles) = run(&[0x4C, 0x00, 0x20]);
        assert_eq!(cpu.regs.pc, 0x2000);
        assert_eq!(cycles, 3);
        assert_eq!(cpu.cycles(), 3);
    }

    #[test]
    fn test_reset_reads_vector() {
        let mut cpu = Mos6502::new();
        let mut bus = SimpleBus::new();
        bus.load(RESET_VECTOR, &[0x00, 0xF0]);
        cpu.regs.a = 0x12;
        cpu.regs.p = Status(0xFF);
        cpu.reset(&mut bus);
        assert_eq!(cpu.regs.pc, 0xF000);
        assert_eq!(cpu.regs.s, 0xFD);
        assert_eq!(cpu.regs.a, 0);
        assert_eq!(cpu.regs.p, Status::new());
        assert_eq!(cpu.cycles(), 0);
    }

    #[test]
    fn test_invalid_opcode_leaves_state() {
        let mut cpu = Mos6502::new();
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0x02]);
        cpu.regs.pc = 0x0200;
        assert_eq!(
            cpu.step(&mut bus),
            Err(ExecuteError::InvalidOpcode {
                address: 0x0200,
                opcode: 0x02
            })
        );
        assert_eq!(cpu.regs.pc, 0x0200);
        assert_eq!(cpu.cycles(), 0);
    }

    #[test]
    fn test_indirect_jmp_page_bug() {
        let mut cpu = Mos6502::new();
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0x6C, 0xFF, 0x10]);
        bus.write(0x10FF, 0x34);
        bus.write(0x1000, 0x12);
        bus.write(0x1100, 0x99);
        cpu.regs.pc = 0x0200;
        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.regs.pc, 0x1234);
    }

    #[test]
    fn test_observable() {
        let (cpu, _, _) = run(&[0xA2, 0x80]);
        assert_eq!(cpu.query("x"), Some(Value::U8(0x80)));
        assert_eq!(cpu.query("flags.n"), Some(Value::Bool(true)));
        assert_eq!(cpu.query("pc"), Some(Value::U16(0x0202)));
        assert_eq!(cpu.query("nonsense"), None);
    }
}
