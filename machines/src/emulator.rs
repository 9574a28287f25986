//! Host-facing emulator: four entry points over an [`InvadersSystem`].

use invaders_core::core::machine::Machine;
use invaders_core::cpu::state::I8080State;
use invaders_core::error::EmuError;

use crate::invaders::input::KeyBindings;
use crate::invaders::video::FrameBuffer;
use crate::invaders::{InvadersConfig, InvadersSystem};
use crate::rom_loader::RomLoadError;

pub struct Emulator {
    system: InvadersSystem,
    bindings: KeyBindings,
    frame: FrameBuffer,
    fault: Option<EmuError>,
}

impl Emulator {
    /// Emulator running `rom` (at most 8KB, loaded at 0x0000), ready to run.
    pub fn new(rom: &[u8], config: InvadersConfig) -> Result<Self, RomLoadError> {
        let mut emulator = Self {
            system: InvadersSystem::new(rom, config)?,
            bindings: KeyBindings::default(),
            frame: FrameBuffer::new(),
            fault: None,
        };
        emulator.initialize();
        Ok(emulator)
    }

    /// Put every component in its power-on state and clear a latched fault.
    pub fn initialize(&mut self) {
        self.system.reset();
        self.frame.clear();
        self.fault = None;
    }

    /// Press the control bound to `key`. Unbound keys are ignored.
    pub fn on_key_down(&mut self, key: &str) {
        self.set_key(key, true);
    }

    pub fn on_key_up(&mut self, key: &str) {
        self.set_key(key, false);
    }

    fn set_key(&mut self, key: &str, pressed: bool) {
        match self.bindings.lookup(key) {
            Some(button) => self.system.set_input(button.id(), pressed),
            None => log::trace!("unbound key {key:?}"),
        }
    }

    /// Run one frame of emulated time and return the rendered screen.
    ///
    /// An `UnimplementedOpcode` halts the machine: every later call returns
    /// the same error until [`initialize`](Self::initialize). A strict-mode
    /// `InvalidWrite` is reported for this call only, and the next call
    /// resumes the interrupted frame.
    pub fn render_next_frame(&mut self) -> Result<&FrameBuffer, EmuError> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        match self.system.run_frame() {
            Ok(()) => {}
            Err(fault @ EmuError::UnimplementedOpcode { .. }) => {
                log::warn!("emulation halted: {fault} ({})", self.system.cpu_state());
                self.fault = Some(fault);
                return Err(fault);
            }
            Err(violation) => {
                log::warn!("{violation} ({})", self.system.cpu_state());
                return Err(violation);
            }
        }
        self.system.render_frame(self.frame.pixels_mut());
        Ok(&self.frame)
    }

    /// The last frame rendered.
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn fault(&self) -> Option<EmuError> {
        self.fault
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    pub fn system(&self) -> &InvadersSystem {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut InvadersSystem {
        &mut self.system
    }

    pub fn cpu_state(&self) -> I8080State {
        self.system.cpu_state()
    }

    pub fn total_cycles(&self) -> u64 {
        self.system.total_cycles()
    }

    pub fn cycle_debt(&self) -> u64 {
        self.system.cycle_debt()
    }

    pub fn frame_rate_hz(&self) -> f64 {
        self.system.frame_rate_hz()
    }
}
