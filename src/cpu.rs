use crate::bus::Bus;
use crate::decoder::decode;
use crate::error::CpuError;
use crate::executor::execute;
use crate::interrupt::{Interrupt, RESET_VECTOR_ADDRESS};
use crate::resolver::resolve;
use crate::status::{Status, StatusFlag};

const STACK_BASE: u16 = 0x0100;

/// The MOS 6502 processor state: registers, status flags, and the pending
/// interrupt lines. Does not own memory; every access goes through the
/// `Bus` passed to `step`.
#[derive(Debug, Clone, Copy)]
pub struct Cpu {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub p: Status,

    /// Total cycles consumed since construction. Monotonically increasing;
    /// never reset by `reset()`.
    pub cycles: u64,

    nmi_pending: bool,
    irq_pending: bool,
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFF,
            pc: 0,
            p: Status::new(),
            cycles: 0,
            nmi_pending: false,
            irq_pending: false,
        }
    }

    /// Loads `pc` from the reset vector and disables interrupts, matching
    /// 6502 power-up/reset behavior. `a`, `x`, `y` are left untouched; `sp`
    /// goes to its post-reset value of 0xFF.
    pub fn reset(&mut self, bus: &impl Bus) {
        self.pc = bus.read_u16(RESET_VECTOR_ADDRESS);
        self.sp = 0xFF;
        self.p.set(StatusFlag::InterruptDisable, true);
    }

    /// Raises the non-maskable interrupt line. Serviced on the next `step`
    /// regardless of the `I` flag.
    pub fn request_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Raises the maskable interrupt line. Serviced on the next `step`
    /// only if the `I` flag is clear; the caller is responsible for
    /// clearing the request once the interrupting device deasserts it.
    pub fn request_irq(&mut self) {
        self.irq_pending = true;
    }

    pub fn push_u8(&mut self, bus: &mut impl Bus, value: u8) {
        bus.write_u8(STACK_BASE + self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub fn pull_u8(&mut self, bus: &impl Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read_u8(STACK_BASE + self.sp as u16)
    }

    pub fn push_u16(&mut self, bus: &mut impl Bus, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.push_u8(bus, hi);
        self.push_u8(bus, lo);
    }

    pub fn pull_u16(&mut self, bus: &impl Bus) -> u16 {
        let lo = self.pull_u8(bus);
        let hi = self.pull_u8(bus);
        u16::from_le_bytes([lo, hi])
    }

    /// Runs exactly one instruction, or services exactly one pending
    /// interrupt, to completion. Returns the number of cycles consumed.
    ///
    /// NMI takes priority over IRQ. IRQ is skipped while the `I` flag is
    /// set; NMI is never masked.
    pub fn step(&mut self, bus: &mut impl Bus) -> Result<u32, CpuError> {
        const INTERRUPT_ENTRY_CYCLES: u32 = 7;

        if self.nmi_pending {
            self.nmi_pending = false;
            self.enter_interrupt(bus, Interrupt::Nmi);
            self.cycles += INTERRUPT_ENTRY_CYCLES as u64;
            return Ok(INTERRUPT_ENTRY_CYCLES);
        }

        let irq_masked = Interrupt::Irq.maskable() && self.p.get(StatusFlag::InterruptDisable);
        if self.irq_pending && !irq_masked {
            self.enter_interrupt(bus, Interrupt::Irq);
            self.cycles += INTERRUPT_ENTRY_CYCLES as u64;
            return Ok(INTERRUPT_ENTRY_CYCLES);
        }

        let instruction = decode(bus, self.pc)?;
        log::trace!(
            "{:#06x}: {} {} operand={:#06x}",
            self.pc,
            instruction.opcode,
            instruction.mode,
            instruction.operand
        );

        let context = resolve(&instruction, self, bus);

        // Advance past the instruction before executing it. Control-flow
        // opcodes (JMP, JSR, RTS, RTI, BRK, taken branches) overwrite `pc`
        // again during execution; every other opcode leaves this alone.
        self.pc = self.pc.wrapping_add(instruction.length);

        let cycles = execute(self, bus, &instruction, &context);
        self.cycles += cycles as u64;
        Ok(cycles)
    }

    /// Shared entry sequence for NMI, IRQ and BRK: push PC, push P (with
    /// `B` set only for BRK), set `I`, and vector through the interrupt's
    /// vector address. Always takes 7 cycles; callers account for that
    /// themselves (BRK's entry is folded into its `base_cycles`).
    pub(crate) fn enter_interrupt(&mut self, bus: &mut impl Bus, interrupt: Interrupt) {
        self.push_u16(bus, self.pc);
        let pushed = self.p.to_pushed_byte(interrupt.sets_break_flag());
        self.push_u8(bus, pushed);
        self.p.set(StatusFlag::InterruptDisable, true);
        self.pc = bus.read_u16(interrupt.vector_address());
        log::trace!("servicing {:?}, vectoring to {:#06x}", interrupt, self.pc);
    }
}

impl Default for Cpu {
    fn default() -> Cpu {
        Cpu::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::TestBus;

    #[test]
    pub fn reset_loads_pc_from_vector() {
        let bus = TestBus::new().with_reset_vector(0x0600);
        let mut cpu = Cpu::new();

        cpu.reset(&bus);

        assert_eq!(cpu.pc, 0x0600);
        assert!(cpu.p.get(StatusFlag::InterruptDisable));
    }

    #[test]
    pub fn push_pull_u8_roundtrip() {
        let mut bus = TestBus::new();
        let mut cpu = Cpu::new();
        let sp = cpu.sp;

        cpu.push_u8(&mut bus, 0x42);
        assert_eq!(cpu.sp, sp.wrapping_sub(1));

        let value = cpu.pull_u8(&bus);
        assert_eq!(value, 0x42);
        assert_eq!(cpu.sp, sp);
    }

    #[test]
    pub fn push_pull_u16_roundtrip() {
        let mut bus = TestBus::new();
        let mut cpu = Cpu::new();

        cpu.push_u16(&mut bus, 0xBEEF);
        let value = cpu.pull_u16(&bus);

        assert_eq!(value, 0xBEEF);
    }

    #[test]
    pub fn irq_is_masked_by_interrupt_disable_flag() {
        let bus_program = TestBus::new().with_memory(vec![0xEA]); // NOP
        let mut bus = bus_program.with_nmi_vector(0x0700);
        bus.write_u16(crate::interrupt::IRQ_VECTOR_ADDRESS, 0x0800);

        let mut cpu = Cpu::new();
        cpu.pc = 0x0000;
        cpu.p.set(StatusFlag::InterruptDisable, true);
        cpu.request_irq();

        cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.pc, 0x0001); // executed the NOP, did not vector
    }

    #[test]
    pub fn nmi_is_never_masked() {
        let bus_program = TestBus::new().with_memory(vec![0xEA]); // NOP
        let mut bus = bus_program.with_nmi_vector(0x0700);

        let mut cpu = Cpu::new();
        cpu.pc = 0x0000;
        cpu.p.set(StatusFlag::InterruptDisable, true);
        cpu.request_nmi();

        let cycles = cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.pc, 0x0700);
        assert_eq!(cycles, 7);
    }

    #[test]
    pub fn interrupt_entry_never_sets_break_flag() {
        let bus_program = TestBus::new().with_memory(vec![0xEA]);
        let mut bus = bus_program.with_nmi_vector(0x0700);

        let mut cpu = Cpu::new();
        cpu.pc = 0x0000;
        cpu.request_nmi();
        cpu.step(&mut bus).unwrap();

        let pushed_p = cpu.pull_u8(&bus);
        assert_eq!(pushed_p & 0b0001_0000, 0);

        // Restore SP for unwind-safety in case more assertions are added later.
        let _ = cpu.pull_u16(&bus);
    }
}
