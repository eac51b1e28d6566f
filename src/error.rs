use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CpuError {
    #[error("invalid opcode {opcode:#04x} at pc {pc:#06x}")]
    InvalidOpcode { opcode: u8, pc: u16 },
}
