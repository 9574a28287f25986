pub mod bus;
pub mod machine;

pub use bus::{Bus, FlatBus};
pub use machine::{InputButton, Machine};
