use crate::addressing_mode::AddressingMode;
use crate::bus::Bus;
use crate::error::CpuError;
use crate::opcode::Opcode;

/// A decoded instruction: everything the resolver and executor need, with
/// no memory or register access beyond the bytes already fetched.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Instruction {
    pub opcode: Opcode,
    pub mode: AddressingMode,
    pub operand: u16,
    pub length: u16,
    pub base_cycles: u32,
}

/// Decodes the instruction at `pc`. Pure: does not mutate the bus or advance
/// any program counter. Returns `CpuError::InvalidOpcode` for any of the 105
/// undocumented opcode values.
pub fn decode(bus: &impl Bus, pc: u16) -> Result<Instruction, CpuError> {
    let byte = bus.read_u8(pc);
    let (opcode, mode, base_cycles) = lookup(byte).ok_or(CpuError::InvalidOpcode { opcode: byte, pc })?;
    let length = mode.instruction_length();

    let operand = match length {
        1 => 0,
        2 => bus.read_u8(pc.wrapping_add(1)) as u16,
        3 => bus.read_u16(pc.wrapping_add(1)),
        _ => unreachable!("addressing modes only produce 1, 2 or 3 byte instructions"),
    };

    Ok(Instruction {
        opcode,
        mode,
        operand,
        length,
        base_cycles,
    })
}

use AddressingMode::*;
use Opcode::*;

/// The 151 documented opcodes, keyed by opcode byte. `None` marks an
/// undocumented/illegal opcode byte, out of scope for this core.
fn lookup(byte: u8) -> Option<(Opcode, AddressingMode, u32)> {
    let entry = match byte {
        0x69 => (ADC, Immediate, 2),
        0x65 => (ADC, ZeroPage, 3),
        0x75 => (ADC, ZeroPageX, 4),
        0x6D => (ADC, Absolute, 4),
        0x7D => (ADC, AbsoluteX, 4),
        0x79 => (ADC, AbsoluteY, 4),
        0x61 => (ADC, IndexedIndirect, 6),
        0x71 => (ADC, IndirectIndexed, 5),

        0x29 => (AND, Immediate, 2),
        0x25 => (AND, ZeroPage, 3),
        0x35 => (AND, ZeroPageX, 4),
        0x2D => (AND, Absolute, 4),
        0x3D => (AND, AbsoluteX, 4),
        0x39 => (AND, AbsoluteY, 4),
        0x21 => (AND, IndexedIndirect, 6),
        0x31 => (AND, IndirectIndexed, 5),

        0x0A => (ASL, Accumulator, 2),
        0x06 => (ASL, ZeroPage, 5),
        0x16 => (ASL, ZeroPageX, 6),
        0x0E => (ASL, Absolute, 6),
        0x1E => (ASL, AbsoluteX, 7),

        0x90 => (BCC, Relative, 2),
        0xB0 => (BCS, Relative, 2),
        0xF0 => (BEQ, Relative, 2),
        0x30 => (BMI, Relative, 2),
        0xD0 => (BNE, Relative, 2),
        0x10 => (BPL, Relative, 2),
        0x50 => (BVC, Relative, 2),
        0x70 => (BVS, Relative, 2),

        0x24 => (BIT, ZeroPage, 3),
        0x2C => (BIT, Absolute, 4),

        0x00 => (BRK, Implied, 7),

        0x18 => (CLC, Implied, 2),
        0xD8 => (CLD, Implied, 2),
        0x58 => (CLI, Implied, 2),
        0xB8 => (CLV, Implied, 2),

        0xC9 => (CMP, Immediate, 2),
        0xC5 => (CMP, ZeroPage, 3),
        0xD5 => (CMP, ZeroPageX, 4),
        0xCD => (CMP, Absolute, 4),
        0xDD => (CMP, AbsoluteX, 4),
        0xD9 => (CMP, AbsoluteY, 4),
        0xC1 => (CMP, IndexedIndirect, 6),
        0xD1 => (CMP, IndirectIndexed, 5),

        0xE0 => (CPX, Immediate, 2),
        0xE4 => (CPX, ZeroPage, 3),
        0xEC => (CPX, Absolute, 4),

        0xC0 => (CPY, Immediate, 2),
        0xC4 => (CPY, ZeroPage, 3),
        0xCC => (CPY, Absolute, 4),

        0xC6 => (DEC, ZeroPage, 5),
        0xD6 => (DEC, ZeroPageX, 6),
        0xCE => (DEC, Absolute, 6),
        0xDE => (DEC, AbsoluteX, 7),

        0xCA => (DEX, Implied, 2),
        0x88 => (DEY, Implied, 2),

        0x49 => (EOR, Immediate, 2),
        0x45 => (EOR, ZeroPage, 3),
        0x55 => (EOR, ZeroPageX, 4),
        0x4D => (EOR, Absolute, 4),
        0x5D => (EOR, AbsoluteX, 4),
        0x59 => (EOR, AbsoluteY, 4),
        0x41 => (EOR, IndexedIndirect, 6),
        0x51 => (EOR, IndirectIndexed, 5),

        0xE6 => (INC, ZeroPage, 5),
        0xF6 => (INC, ZeroPageX, 6),
        0xEE => (INC, Absolute, 6),
        0xFE => (INC, AbsoluteX, 7),

        0xE8 => (INX, Implied, 2),
        0xC8 => (INY, Implied, 2),

        0x4C => (JMP, Absolute, 3),
        0x6C => (JMP, Indirect, 5),

        0x20 => (JSR, Absolute, 6),

        0xA9 => (LDA, Immediate, 2),
        0xA5 => (LDA, ZeroPage, 3),
        0xB5 => (LDA, ZeroPageX, 4),
        0xAD => (LDA, Absolute, 4),
        0xBD => (LDA, AbsoluteX, 4),
        0xB9 => (LDA, AbsoluteY, 4),
        0xA1 => (LDA, IndexedIndirect, 6),
        0xB1 => (LDA, IndirectIndexed, 5),

        0xA2 => (LDX, Immediate, 2),
        0xA6 => (LDX, ZeroPage, 3),
        0xB6 => (LDX, ZeroPageY, 4),
        0xAE => (LDX, Absolute, 4),
        0xBE => (LDX, AbsoluteY, 4),

        0xA0 => (LDY, Immediate, 2),
        0xA4 => (LDY, ZeroPage, 3),
        0xB4 => (LDY, ZeroPageX, 4),
        0xAC => (LDY, Absolute, 4),
        0xBC => (LDY, AbsoluteX, 4),

        0x4A => (LSR, Accumulator, 2),
        0x46 => (LSR, ZeroPage, 5),
        0x56 => (LSR, ZeroPageX, 6),
        0x4E => (LSR, Absolute, 6),
        0x5E => (LSR, AbsoluteX, 7),

        0xEA => (NOP, Implied, 2),

        0x09 => (ORA, Immediate, 2),
        0x05 => (ORA, ZeroPage, 3),
        0x15 => (ORA, ZeroPageX, 4),
        0x0D => (ORA, Absolute, 4),
        0x1D => (ORA, AbsoluteX, 4),
        0x19 => (ORA, AbsoluteY, 4),
        0x01 => (ORA, IndexedIndirect, 6),
        0x11 => (ORA, IndirectIndexed, 5),

        0x48 => (PHA, Implied, 3),
        0x08 => (PHP, Implied, 3),
        0x68 => (PLA, Implied, 4),
        0x28 => (PLP, Implied, 4),

        0x2A => (ROL, Accumulator, 2),
        0x26 => (ROL, ZeroPage, 5),
        0x36 => (ROL, ZeroPageX, 6),
        0x2E => (ROL, Absolute, 6),
        0x3E => (ROL, AbsoluteX, 7),

        0x6A => (ROR, Accumulator, 2),
        0x66 => (ROR, ZeroPage, 5),
        0x76 => (ROR, ZeroPageX, 6),
        0x6E => (ROR, Absolute, 6),
        0x7E => (ROR, AbsoluteX, 7),

        0x40 => (RTI, Implied, 6),
        0x60 => (RTS, Implied, 6),

        0xE9 => (SBC, Immediate, 2),
        0xE5 => (SBC, ZeroPage, 3),
        0xF5 => (SBC, ZeroPageX, 4),
        0xED => (SBC, Absolute, 4),
        0xFD => (SBC, AbsoluteX, 4),
        0xF9 => (SBC, AbsoluteY, 4),
        0xE1 => (SBC, IndexedIndirect, 6),
        0xF1 => (SBC, IndirectIndexed, 5),

        0x38 => (SEC, Implied, 2),
        0xF8 => (SED, Implied, 2),
        0x78 => (SEI, Implied, 2),

        0x85 => (STA, ZeroPage, 3),
        0x95 => (STA, ZeroPageX, 4),
        0x8D => (STA, Absolute, 4),
        0x9D => (STA, AbsoluteX, 5),
        0x99 => (STA, AbsoluteY, 5),
        0x81 => (STA, IndexedIndirect, 6),
        0x91 => (STA, IndirectIndexed, 6),

        0x86 => (STX, ZeroPage, 3),
        0x96 => (STX, ZeroPageY, 4),
        0x8E => (STX, Absolute, 4),

        0x84 => (STY, ZeroPage, 3),
        0x94 => (STY, ZeroPageX, 4),
        0x8C => (STY, Absolute, 4),

        0xAA => (TAX, Implied, 2),
        0xA8 => (TAY, Implied, 2),
        0xBA => (TSX, Implied, 2),
        0x8A => (TXA, Implied, 2),
        0x9A => (TXS, Implied, 2),
        0x98 => (TYA, Implied, 2),

        _ => return None,
    };

    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::TestBus;

    #[test]
    pub fn decodes_lda_immediate() {
        let bus = TestBus::new().with_memory(vec![0xA9, 0x42]);
        let instruction = decode(&bus, 0x0000).unwrap();

        assert_eq!(instruction.opcode, Opcode::LDA);
        assert_eq!(instruction.mode, AddressingMode::Immediate);
        assert_eq!(instruction.operand, 0x42);
        assert_eq!(instruction.length, 2);
        assert_eq!(instruction.base_cycles, 2);
    }

    #[test]
    pub fn decodes_jmp_absolute() {
        let bus = TestBus::new().with_memory(vec![0x4C, 0x00, 0x06]);
        let instruction = decode(&bus, 0x0000).unwrap();

        assert_eq!(instruction.opcode, Opcode::JMP);
        assert_eq!(instruction.mode, AddressingMode::Absolute);
        assert_eq!(instruction.operand, 0x0600);
        assert_eq!(instruction.length, 3);
    }

    #[test]
    pub fn rejects_undocumented_opcode() {
        // 0x02 (JAM/KIL) is not a documented opcode.
        let bus = TestBus::new().with_memory(vec![0x02]);
        let result = decode(&bus, 0x0000);

        assert_eq!(result, Err(CpuError::InvalidOpcode { opcode: 0x02, pc: 0x0000 }));
    }

    #[test]
    pub fn documented_opcode_count_is_151() {
        let count = (0u8..=255).filter(|&b| lookup(b).is_some()).count();
        assert_eq!(count, 151);
    }

    #[test]
    pub fn every_entry_length_matches_its_mode() {
        for byte in 0u8..=255 {
            if let Some((opcode, mode, _)) = lookup(byte) {
                let bus = TestBus::new().with_memory(vec![byte, 0, 0]);
                let instruction = decode(&bus, 0x0000).unwrap();
                assert_eq!(
                    instruction.length,
                    mode.instruction_length(),
                    "{:?} ({:#04x}) decoded length {} does not match its mode's length rule",
                    opcode,
                    byte,
                    instruction.length
                );
            }
        }
    }
}
