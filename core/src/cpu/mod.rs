use crate::core::Bus;
use crate::error::EmuError;

/// Generic CPU interface
pub trait Cpu: CpuStateTrait {
    /// Return to the reset vector (registers other than PC keep their values).
    fn reset(&mut self);

    /// Execute one instruction and return the number of clock cycles it took.
    fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<u32, EmuError>;

    /// Request a vectored interrupt. Returns the cycles spent acknowledging
    /// it, or 0 if the CPU is not accepting interrupts.
    fn interrupt<B: Bus + ?Sized>(&mut self, bus: &mut B, vector: u8) -> u32;

    /// Query if CPU is halted internally (HLT instruction)
    fn is_sleeping(&self) -> bool;
}

// Re-export state types
pub mod state;
pub use state::{CpuStateTrait, I8080State};

// Intel 8080
pub mod i8080;
pub use i8080::I8080;
