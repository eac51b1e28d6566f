//! A cycle-accurate MOS 6502 interpreter core.
//!
//! The crate is split into the stages a real 6502 implementation goes
//! through on every instruction: [`decoder`] turns a program counter and a
//! [`bus::Bus`] into an [`decoder::Instruction`], [`resolver`] turns that
//! instruction into a concrete [`resolver::OperandContext`], and
//! [`executor`] mutates [`cpu::Cpu`] state accordingly. [`cpu::Cpu::step`]
//! drives all three stages for a single instruction or interrupt.
//!
//! ```
//! use mos6502_core::bus::TestBus;
//! use mos6502_core::cpu::Cpu;
//!
//! let mut bus = TestBus::new().with_program(vec![0xA9, 0x01, 0x69, 0x01]); // LDA #1; ADC #1
//! let mut cpu = Cpu::new();
//! cpu.reset(&bus);
//!
//! cpu.step(&mut bus).unwrap();
//! cpu.step(&mut bus).unwrap();
//! assert_eq!(cpu.a, 2);
//! ```

pub mod addressing_mode;
pub mod bus;
pub mod cpu;
pub mod decoder;
pub mod error;
pub mod executor;
pub mod interrupt;
pub mod opcode;
pub mod resolver;
pub mod status;

pub use cpu::Cpu;
pub use error::CpuError;

pub type Result<T> = std::result::Result<T, CpuError>;
