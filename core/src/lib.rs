pub mod core;
pub mod cpu;
pub mod device;
pub mod error;

pub mod prelude {
    pub use crate::core::machine::{InputButton, Machine};
    pub use crate::core::{Bus, FlatBus};
    pub use crate::cpu::{Cpu, CpuStateTrait};
    pub use crate::error::EmuError;
}
