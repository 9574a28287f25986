use crate::error::EmuError;

/// Describes a single input button that a machine accepts.
pub struct InputButton {
    /// Machine-defined button identifier, passed to `set_input()`.
    pub id: u8,
    /// Human-readable name for display/configuration (e.g., "P1 Left", "Coin").
    pub name: &'static str,
}

/// Machine-agnostic interface for emulated systems.
///
/// A machine owns its CPU, memory map, and video hardware. The host only
/// sees frames, input events, and errors.
pub trait Machine {
    /// Displayed resolution as (width, height) in pixels, after any
    /// monitor rotation.
    fn display_size(&self) -> (u32, u32);

    /// Run one frame of emulation (advance the clock by one frame's worth of cycles).
    ///
    /// Returns an error if the CPU hits an instruction it cannot execute or,
    /// in strict mode, if the program writes to read-only memory. The machine
    /// state is left as it was at the failing instruction.
    fn run_frame(&mut self) -> Result<(), EmuError>;

    /// Render the current video state into an RGB24 pixel buffer.
    ///
    /// The buffer must be at least `width * height * 3` bytes (from `display_size()`).
    /// Pixels are stored left-to-right, top-to-bottom, 3 bytes per pixel (R, G, B).
    fn render_frame(&self, buffer: &mut [u8]);

    /// Handle an input event. `button` is a machine-defined ID from `input_map()`.
    /// `pressed` is true for key-down, false for key-up. Unknown IDs are ignored.
    fn set_input(&mut self, button: u8, pressed: bool);

    /// Get the list of input buttons this machine accepts.
    fn input_map(&self) -> &[InputButton];

    /// Reset the machine to its initial power-on state.
    fn reset(&mut self);

    /// Emulated display refresh rate.
    fn frame_rate_hz(&self) -> f64;
}
