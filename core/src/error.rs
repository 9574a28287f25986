/// Faults raised while emulating.
///
/// Neither variant is process-fatal: the host decides whether to halt,
/// reset, or display diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmuError {
    /// The byte at `pc` does not decode to an instruction this CPU executes.
    /// No CPU or memory state was modified by the failed step.
    UnimplementedOpcode { opcode: u8, pc: u16 },

    /// The program wrote to read-only or unpopulated memory while the bus
    /// was in strict mode. The write itself had no effect.
    InvalidWrite { address: u16, value: u8 },
}

impl std::fmt::Display for EmuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnimplementedOpcode { opcode, pc } => write!(
                f,
                "unimplemented opcode 0x{opcode:02X} ({}) at 0x{pc:04X}",
                crate::cpu::i8080::mnemonic(*opcode)
            ),
            Self::InvalidWrite { address, value } => {
                write!(f, "write of 0x{value:02X} to read-only address 0x{address:04X}")
            }
        }
    }
}

impl std::error::Error for EmuError {}
