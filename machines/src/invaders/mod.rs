//! Space Invaders (Taito / Midway, 1978)
//!
//! Hardware: Intel 8080 @ 1.9968 MHz, MB14241 barrel shifter, discrete
//! sound. Video: 256×224 1bpp bitmap from RAM, displayed rotated 90° CCW.

pub mod input;
pub mod memory;
pub mod timing;
pub mod video;

use invaders_core::core::Bus;
use invaders_core::core::machine::{InputButton, Machine};
use invaders_core::cpu::state::I8080State;
use invaders_core::cpu::{CpuStateTrait, I8080};
use invaders_core::device::Mb14241;
use invaders_core::error::EmuError;

use crate::rom_loader::{RomEntry, RomLoadError, RomRegion, RomSet};
use input::{Dips, INVADERS_INPUT_MAP, InputLatch, LogicalButton};
use memory::{Memory, ROM_SIZE, WriteMode};
use timing::{CYCLES_PER_FRAME, FRAME_RATE_HZ, InterruptScheduler};
use video::{ColorOverlay, FrameBuffer, SCREEN_HEIGHT, SCREEN_WIDTH, VideoRenderer};

// ---------------------------------------------------------------------------
// ROM definitions ("invaders" Midway set)
// ---------------------------------------------------------------------------

/// Program ROM: 8KB at 0x0000-0x1FFF (four 2KB chips).
pub static INVADERS_PROGRAM_ROM: RomRegion = RomRegion {
    size: ROM_SIZE,
    entries: &[
        RomEntry {
            name: "invaders.h",
            size: 0x0800,
            offset: 0x0000,
            crc32: Some(0x734f5ad8),
        },
        RomEntry {
            name: "invaders.g",
            size: 0x0800,
            offset: 0x0800,
            crc32: Some(0x6bfaca4a),
        },
        RomEntry {
            name: "invaders.f",
            size: 0x0800,
            offset: 0x1000,
            crc32: Some(0x0ccead96),
        },
        RomEntry {
            name: "invaders.e",
            size: 0x0800,
            offset: 0x1800,
            crc32: Some(0x14e538b0),
        },
    ],
};

/// File names accepted for a pre-concatenated 8KB image.
pub const SINGLE_IMAGE_NAMES: &[&str] = &["invaders.rom", "game.rom"];

/// Assemble the program ROM from either the four-chip set or a single image.
pub fn program_rom(rom_set: &RomSet, verify_checksums: bool) -> Result<Vec<u8>, RomLoadError> {
    if INVADERS_PROGRAM_ROM.is_satisfied_by(rom_set) {
        return if verify_checksums {
            INVADERS_PROGRAM_ROM.load(rom_set)
        } else {
            INVADERS_PROGRAM_ROM.load_skip_checksums(rom_set)
        };
    }

    if let Some(name) = SINGLE_IMAGE_NAMES.iter().find(|n| rom_set.contains(n)) {
        return Ok(rom_set.require_sized(name, ROM_SIZE)?.to_vec());
    }

    // A set with exactly one file is taken as the image, whatever its name.
    if let [name] = rom_set.file_names().as_slice() {
        return Ok(rom_set.require_sized(name, ROM_SIZE)?.to_vec());
    }

    Err(RomLoadError::MissingFile(INVADERS_PROGRAM_ROM.entries[0].name.to_string()))
}

/// Frames without a watchdog kick (OUT 6) before the board resets itself.
pub const WATCHDOG_FRAMES: u32 = 255;

/// Board options chosen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvadersConfig {
    pub write_mode: WriteMode,
    pub undocumented_opcodes: bool,
    pub overlay: ColorOverlay,
    pub dips: Dips,
    pub watchdog: bool,
}

impl Default for InvadersConfig {
    fn default() -> Self {
        Self {
            write_mode: WriteMode::Lenient,
            undocumented_opcodes: false,
            overlay: ColorOverlay::default(),
            dips: Dips::default(),
            watchdog: true,
        }
    }
}

/// Everything the CPU reaches through its address and I/O buses.
pub struct Board {
    pub memory: Memory,
    pub input: InputLatch,
    pub shifter: Mb14241,
    sound: [u8; 2],
    watchdog_kicked: bool,
}

impl Board {
    fn new(config: &InvadersConfig) -> Self {
        Self {
            memory: Memory::new(config.write_mode),
            input: InputLatch::new(config.dips),
            shifter: Mb14241::new(),
            sound: [0; 2],
            watchdog_kicked: false,
        }
    }

    /// Sound latches written through OUT 3 and OUT 5.
    pub fn sound_latches(&self) -> [u8; 2] {
        self.sound
    }

    fn write_sound(&mut self, index: usize, data: u8) {
        let rising = data & !self.sound[index];
        if rising != 0 {
            log::trace!("sound latch {} triggers 0x{rising:02X}", index + 1);
        }
        self.sound[index] = data;
    }

    fn power_on(&mut self) {
        self.memory.clear_ram();
        self.input.release_all();
        self.shifter.reset();
        self.sound = [0; 2];
        self.watchdog_kicked = false;
    }
}

impl Bus for Board {
    fn read(&mut self, addr: u16) -> u8 {
        self.memory.read(addr)
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory.write(addr, data);
    }

    fn io_read(&mut self, port: u8) -> u8 {
        match port {
            0 => self.input.port0(),
            1 => self.input.port1(),
            2 => self.input.port2(),
            3 => self.shifter.result(),
            _ => {
                log::debug!("read from unmapped port {port}");
                0x00
            }
        }
    }

    fn io_write(&mut self, port: u8, data: u8) {
        match port {
            2 => self.shifter.set_offset(data),
            3 => self.write_sound(0, data),
            4 => self.shifter.write_data(data),
            5 => self.write_sound(1, data),
            6 => self.watchdog_kicked = true,
            _ => log::debug!("write of 0x{data:02X} to unmapped port {port}"),
        }
    }
}

/// Space Invaders board: CPU, bus devices and the frame clock.
pub struct InvadersSystem {
    cpu: I8080,
    board: Board,
    scheduler: InterruptScheduler,
    renderer: VideoRenderer,
    config: InvadersConfig,

    // Timing
    total_cycles: u64,
    frame_end: u64,
    frame_count: u64,
    frames_since_kick: u32,
}

impl InvadersSystem {
    /// Board with `rom` in program ROM, in power-on state.
    pub fn new(rom: &[u8], config: InvadersConfig) -> Result<Self, RomLoadError> {
        let mut board = Board::new(&config);
        board.memory.load_rom(rom)?;
        Ok(Self {
            cpu: I8080::with_undocumented(config.undocumented_opcodes),
            board,
            scheduler: InterruptScheduler::new(),
            renderer: VideoRenderer::new(config.overlay),
            config,
            total_cycles: 0,
            frame_end: 0,
            frame_count: 0,
            frames_since_kick: 0,
        })
    }

    pub fn from_rom_set(rom_set: &RomSet, config: InvadersConfig) -> Result<Self, RomLoadError> {
        Self::new(&program_rom(rom_set, true)?, config)
    }

    /// Execute one instruction plus any interrupt it makes due.
    /// Returns the cycles consumed.
    ///
    /// A strict-mode `InvalidWrite` from the instruction or from an
    /// interrupt acknowledge is returned once both are accounted in the
    /// cycle count and the scheduler. Stepping may continue afterwards.
    pub fn step(&mut self) -> Result<u32, EmuError> {
        let cycles = self.cpu.step(&mut self.board)?;

        let mut consumed = 0;
        let mut elapsed = cycles;
        while elapsed > 0 {
            let mut acknowledge = 0;
            let cpu = &mut self.cpu;
            let board = &mut self.board;
            self.scheduler.advance(elapsed, |vector| {
                acknowledge += cpu.interrupt(board, vector);
            });
            consumed += elapsed;
            elapsed = acknowledge;
        }

        self.total_cycles += consumed as u64;
        match self.board.memory.take_violation() {
            Some(violation) => Err(violation),
            None => Ok(consumed),
        }
    }

    pub fn cpu(&self) -> &I8080 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut I8080 {
        &mut self.cpu
    }

    pub fn cpu_state(&self) -> I8080State {
        self.cpu.snapshot()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn vram(&self) -> &[u8] {
        self.board.memory.vram()
    }

    pub fn config(&self) -> &InvadersConfig {
        &self.config
    }

    pub fn set_overlay(&mut self, overlay: ColorOverlay) {
        self.config.overlay = overlay;
        self.renderer.set_overlay(overlay);
    }

    pub fn render_into(&self, frame: &mut FrameBuffer) {
        self.renderer.render_into(self.vram(), frame);
    }

    pub fn set_button(&mut self, button: LogicalButton, pressed: bool) {
        self.board.input.set_pressed(button, pressed);
    }

    /// Cycles executed since power-on.
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Cycles the last frame ran past its budget; taken from the next frame.
    pub fn cycle_debt(&self) -> u64 {
        self.total_cycles.saturating_sub(self.frame_end)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn tick_watchdog(&mut self) {
        if !self.config.watchdog {
            return;
        }
        if std::mem::take(&mut self.board.watchdog_kicked) {
            self.frames_since_kick = 0;
            return;
        }
        self.frames_since_kick += 1;
        if self.frames_since_kick >= WATCHDOG_FRAMES {
            log::warn!(
                "watchdog expired after {WATCHDOG_FRAMES} frames at PC=0x{:04X}, resetting board",
                self.cpu.pc
            );
            self.board_reset();
        }
    }

    /// What the watchdog does: CPU to the reset vector, RAM and latches
    /// cleared. The frame clock keeps running.
    fn board_reset(&mut self) {
        self.cpu = I8080::with_undocumented(self.config.undocumented_opcodes);
        self.board.power_on();
        self.frames_since_kick = 0;
    }
}

impl Machine for InvadersSystem {
    fn display_size(&self) -> (u32, u32) {
        (SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32) // 224×256 (rotated)
    }

    fn run_frame(&mut self) -> Result<(), EmuError> {
        let target = self.frame_end + CYCLES_PER_FRAME as u64;
        while self.total_cycles < target {
            self.step()?;
        }
        self.frame_end = target;
        self.frame_count += 1;
        self.tick_watchdog();
        Ok(())
    }

    fn render_frame(&self, buffer: &mut [u8]) {
        self.renderer.render_rgb24(self.vram(), buffer);
    }

    fn set_input(&mut self, button: u8, pressed: bool) {
        if let Some(button) = LogicalButton::from_id(button) {
            self.set_button(button, pressed);
        }
    }

    fn input_map(&self) -> &[InputButton] {
        INVADERS_INPUT_MAP
    }

    fn reset(&mut self) {
        self.board_reset();
        self.scheduler.reset();
        self.total_cycles = 0;
        self.frame_end = 0;
        self.frame_count = 0;
        log::info!("board reset");
    }

    fn frame_rate_hz(&self) -> f64 {
        FRAME_RATE_HZ as f64
    }
}
