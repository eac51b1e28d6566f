#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Interrupt {
    Nmi,
    Reset,
    Irq,
    Brk,
}

pub const NMI_VECTOR_ADDRESS: u16 = 0xFFFA;
pub const RESET_VECTOR_ADDRESS: u16 = 0xFFFC;
pub const IRQ_VECTOR_ADDRESS: u16 = 0xFFFE;

impl Interrupt {
    /// Whether this interrupt is masked by the `I` status flag. NMI and
    /// RESET are never masked; IRQ is; BRK is a software interrupt and runs
    /// unconditionally regardless of `I`.
    pub fn maskable(&self) -> bool {
        *self == Interrupt::Irq
    }

    pub fn vector_address(&self) -> u16 {
        match self {
            Interrupt::Nmi => NMI_VECTOR_ADDRESS,
            Interrupt::Reset => RESET_VECTOR_ADDRESS,
            Interrupt::Irq => IRQ_VECTOR_ADDRESS,
            Interrupt::Brk => IRQ_VECTOR_ADDRESS,
        }
    }

    /// Whether entry to this interrupt sets the `B` flag in the pushed copy
    /// of `P`. Only `BRK` does.
    pub fn sets_break_flag(&self) -> bool {
        *self == Interrupt::Brk
    }
}
