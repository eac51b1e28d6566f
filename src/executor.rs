use crate::addressing_mode::AddressingMode;
use crate::bus::Bus;
use crate::cpu::Cpu;
use crate::decoder::Instruction;
use crate::interrupt::Interrupt;
use crate::opcode::Opcode;
use crate::resolver::OperandContext;
use crate::status::StatusFlag;

/// Addressing modes that incur a +1 cycle penalty on read-only instructions
/// when the effective address computation crosses a page boundary.
fn read_only_page_cross_penalty(mode: AddressingMode, page_crossed: bool) -> u32 {
    if !page_crossed {
        return 0;
    }
    match mode {
        AddressingMode::AbsoluteX | AddressingMode::AbsoluteY | AddressingMode::IndirectIndexed => 1,
        _ => 0,
    }
}

fn set_zero_negative(cpu: &mut Cpu, value: u8) {
    cpu.p.set(StatusFlag::Zero, value == 0);
    cpu.p.set(StatusFlag::Negative, value & 0b1000_0000 != 0);
}

fn add_with_carry(cpu: &mut Cpu, operand: u8) {
    let carry_in = cpu.p.get(StatusFlag::Carry) as u16;
    let sum = cpu.a as u16 + operand as u16 + carry_in;
    let result = sum as u8;

    let overflow = (!(cpu.a ^ operand) & (cpu.a ^ result) & 0b1000_0000) != 0;

    cpu.p.set(StatusFlag::Carry, sum > 0xFF);
    cpu.p.set(StatusFlag::Overflow, overflow);
    set_zero_negative(cpu, result);
    cpu.a = result;
}

fn subtract_with_carry(cpu: &mut Cpu, operand: u8) {
    // SBC is ADC with the operand's bits inverted; this naturally keeps the
    // carry and overflow formulas identical to `add_with_carry`.
    add_with_carry(cpu, !operand);
}

fn compare(cpu: &mut Cpu, register_value: u8, operand: u8) {
    let result = register_value.wrapping_sub(operand);
    cpu.p.set(StatusFlag::Carry, register_value >= operand);
    cpu.p.set(StatusFlag::Zero, register_value == operand);
    cpu.p.set(StatusFlag::Negative, result & 0b1000_0000 != 0);
}

fn write_operand(cpu: &mut Cpu, bus: &mut impl Bus, context: &OperandContext, value: u8) {
    match context.address() {
        Some(address) => bus.write_u8(address, value),
        None => cpu.a = value,
    }
}

/// Executes `instruction` against `cpu`/`bus` using the already-resolved
/// `context`, and returns the total number of cycles consumed (the
/// instruction's `base_cycles` plus any page-cross/branch penalties).
///
/// Must be called after `cpu.pc` has been advanced past the instruction;
/// opcodes that redirect control flow (`JMP`, `JSR`, `RTS`, `RTI`, `BRK`,
/// taken branches) overwrite `cpu.pc` again here.
pub fn execute(cpu: &mut Cpu, bus: &mut impl Bus, instruction: &Instruction, context: &OperandContext) -> u32 {
    let mut cycles = instruction.base_cycles;

    match instruction.opcode {
        Opcode::ADC => {
            let operand = context.read(cpu, bus);
            add_with_carry(cpu, operand);
            cycles += read_only_page_cross_penalty(instruction.mode, context.page_crossed);
        }
        Opcode::SBC => {
            let operand = context.read(cpu, bus);
            subtract_with_carry(cpu, operand);
            cycles += read_only_page_cross_penalty(instruction.mode, context.page_crossed);
        }
        Opcode::AND => {
            let operand = context.read(cpu, bus);
            cpu.a &= operand;
            set_zero_negative(cpu, cpu.a);
            cycles += read_only_page_cross_penalty(instruction.mode, context.page_crossed);
        }
        Opcode::ORA => {
            let operand = context.read(cpu, bus);
            cpu.a |= operand;
            set_zero_negative(cpu, cpu.a);
            cycles += read_only_page_cross_penalty(instruction.mode, context.page_crossed);
        }
        Opcode::EOR => {
            let operand = context.read(cpu, bus);
            cpu.a ^= operand;
            set_zero_negative(cpu, cpu.a);
            cycles += read_only_page_cross_penalty(instruction.mode, context.page_crossed);
        }

        Opcode::ASL => {
            let input = context.read(cpu, bus);
            let output = input << 1;
            cpu.p.set(StatusFlag::Carry, input & 0b1000_0000 != 0);
            set_zero_negative(cpu, output);
            write_operand(cpu, bus, context, output);
        }
        Opcode::LSR => {
            let input = context.read(cpu, bus);
            let output = input >> 1;
            cpu.p.set(StatusFlag::Carry, input & 0b0000_0001 != 0);
            set_zero_negative(cpu, output);
            write_operand(cpu, bus, context, output);
        }
        Opcode::ROL => {
            let input = context.read(cpu, bus);
            let carry_in = cpu.p.get(StatusFlag::Carry) as u8;
            let output = (input << 1) | carry_in;
            cpu.p.set(StatusFlag::Carry, input & 0b1000_0000 != 0);
            set_zero_negative(cpu, output);
            write_operand(cpu, bus, context, output);
        }
        Opcode::ROR => {
            let input = context.read(cpu, bus);
            let carry_in = cpu.p.get(StatusFlag::Carry) as u8;
            let output = (input >> 1) | (carry_in << 7);
            cpu.p.set(StatusFlag::Carry, input & 0b0000_0001 != 0);
            set_zero_negative(cpu, output);
            write_operand(cpu, bus, context, output);
        }

        Opcode::INC => {
            let output = context.read(cpu, bus).wrapping_add(1);
            set_zero_negative(cpu, output);
            write_operand(cpu, bus, context, output);
        }
        Opcode::DEC => {
            let output = context.read(cpu, bus).wrapping_sub(1);
            set_zero_negative(cpu, output);
            write_operand(cpu, bus, context, output);
        }
        Opcode::INX => {
            cpu.x = cpu.x.wrapping_add(1);
            set_zero_negative(cpu, cpu.x);
        }
        Opcode::INY => {
            cpu.y = cpu.y.wrapping_add(1);
            set_zero_negative(cpu, cpu.y);
        }
        Opcode::DEX => {
            cpu.x = cpu.x.wrapping_sub(1);
            set_zero_negative(cpu, cpu.x);
        }
        Opcode::DEY => {
            cpu.y = cpu.y.wrapping_sub(1);
            set_zero_negative(cpu, cpu.y);
        }

        Opcode::CMP => {
            let operand = context.read(cpu, bus);
            compare(cpu, cpu.a, operand);
            cycles += read_only_page_cross_penalty(instruction.mode, context.page_crossed);
        }
        Opcode::CPX => {
            let operand = context.read(cpu, bus);
            compare(cpu, cpu.x, operand);
        }
        Opcode::CPY => {
            let operand = context.read(cpu, bus);
            compare(cpu, cpu.y, operand);
        }

        Opcode::BIT => {
            let operand = context.read(cpu, bus);
            cpu.p.set(StatusFlag::Zero, (cpu.a & operand) == 0);
            cpu.p.set(StatusFlag::Overflow, operand & 0b0100_0000 != 0);
            cpu.p.set(StatusFlag::Negative, operand & 0b1000_0000 != 0);
        }

        Opcode::LDA => {
            cpu.a = context.read(cpu, bus);
            set_zero_negative(cpu, cpu.a);
            cycles += read_only_page_cross_penalty(instruction.mode, context.page_crossed);
        }
        Opcode::LDX => {
            cpu.x = context.read(cpu, bus);
            set_zero_negative(cpu, cpu.x);
            cycles += read_only_page_cross_penalty(instruction.mode, context.page_crossed);
        }
        Opcode::LDY => {
            cpu.y = context.read(cpu, bus);
            set_zero_negative(cpu, cpu.y);
            cycles += read_only_page_cross_penalty(instruction.mode, context.page_crossed);
        }
        Opcode::STA => write_operand(cpu, bus, context, cpu.a),
        Opcode::STX => write_operand(cpu, bus, context, cpu.x),
        Opcode::STY => write_operand(cpu, bus, context, cpu.y),

        Opcode::TAX => {
            cpu.x = cpu.a;
            set_zero_negative(cpu, cpu.x);
        }
        Opcode::TAY => {
            cpu.y = cpu.a;
            set_zero_negative(cpu, cpu.y);
        }
        Opcode::TXA => {
            cpu.a = cpu.x;
            set_zero_negative(cpu, cpu.a);
        }
        Opcode::TYA => {
            cpu.a = cpu.y;
            set_zero_negative(cpu, cpu.a);
        }
        Opcode::TSX => {
            cpu.x = cpu.sp;
            set_zero_negative(cpu, cpu.x);
        }
        Opcode::TXS => cpu.sp = cpu.x,

        Opcode::PHA => cpu.push_u8(bus, cpu.a),
        Opcode::PHP => {
            let pushed = cpu.p.to_pushed_byte(true);
            cpu.push_u8(bus, pushed);
        }
        Opcode::PLA => {
            cpu.a = cpu.pull_u8(bus);
            set_zero_negative(cpu, cpu.a);
        }
        Opcode::PLP => {
            let byte = cpu.pull_u8(bus);
            cpu.p = crate::status::Status::from_pulled_byte(byte);
        }

        Opcode::JMP => cpu.pc = context.address().expect("JMP always addresses memory"),
        Opcode::JSR => {
            // `cpu.pc` has already been advanced past this 3-byte
            // instruction; the return address pushed is the address of the
            // instruction's last byte, i.e. `pc - 1`.
            let return_address = cpu.pc.wrapping_sub(1);
            cpu.push_u16(bus, return_address);
            cpu.pc = context.address().expect("JSR always addresses memory");
        }
        Opcode::RTS => {
            let return_address = cpu.pull_u16(bus);
            cpu.pc = return_address.wrapping_add(1);
        }
        Opcode::RTI => {
            let byte = cpu.pull_u8(bus);
            cpu.p = crate::status::Status::from_pulled_byte(byte);
            cpu.pc = cpu.pull_u16(bus);
        }
        Opcode::BRK => {
            // `cpu.pc` was already advanced by the instruction's (1-byte)
            // length; BRK additionally skips a padding byte, so the
            // pushed return address is `pc + 1`, i.e. the original PC + 2.
            cpu.pc = cpu.pc.wrapping_add(1);
            cpu.enter_interrupt(bus, Interrupt::Brk);
        }

        Opcode::BCC => {
            let condition = !cpu.p.get(StatusFlag::Carry);
            branch(cpu, context, &mut cycles, condition);
        }
        Opcode::BCS => {
            let condition = cpu.p.get(StatusFlag::Carry);
            branch(cpu, context, &mut cycles, condition);
        }
        Opcode::BEQ => {
            let condition = cpu.p.get(StatusFlag::Zero);
            branch(cpu, context, &mut cycles, condition);
        }
        Opcode::BNE => {
            let condition = !cpu.p.get(StatusFlag::Zero);
            branch(cpu, context, &mut cycles, condition);
        }
        Opcode::BMI => {
            let condition = cpu.p.get(StatusFlag::Negative);
            branch(cpu, context, &mut cycles, condition);
        }
        Opcode::BPL => {
            let condition = !cpu.p.get(StatusFlag::Negative);
            branch(cpu, context, &mut cycles, condition);
        }
        Opcode::BVC => {
            let condition = !cpu.p.get(StatusFlag::Overflow);
            branch(cpu, context, &mut cycles, condition);
        }
        Opcode::BVS => {
            let condition = cpu.p.get(StatusFlag::Overflow);
            branch(cpu, context, &mut cycles, condition);
        }

        Opcode::CLC => cpu.p.set(StatusFlag::Carry, false),
        Opcode::SEC => cpu.p.set(StatusFlag::Carry, true),
        Opcode::CLD => cpu.p.set(StatusFlag::DecimalMode, false),
        Opcode::SED => cpu.p.set(StatusFlag::DecimalMode, true),
        Opcode::CLI => cpu.p.set(StatusFlag::InterruptDisable, false),
        Opcode::SEI => cpu.p.set(StatusFlag::InterruptDisable, true),
        Opcode::CLV => cpu.p.set(StatusFlag::Overflow, false),

        Opcode::NOP => {}
    }

    cycles
}

/// Shared branch-instruction behavior: if `condition` holds, jumps to the
/// already-resolved target and adds the taken (+1) and taken-and-crossed
/// (+1 more) cycle penalties.
fn branch(cpu: &mut Cpu, context: &OperandContext, cycles: &mut u32, condition: bool) {
    if !condition {
        return;
    }

    *cycles += 1;
    if context.page_crossed {
        *cycles += 1;
    }
    cpu.pc = context.address().expect("Relative addressing always resolves to memory");
}
