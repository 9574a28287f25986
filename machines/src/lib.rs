pub mod emulator;
pub mod invaders;
pub mod rom_loader;

pub use emulator::Emulator;
pub use invaders::{InvadersConfig, InvadersSystem};
