//! Board memory map.
//!
//! A15 is not decoded, so 0x8000-0xFFFF mirrors 0x0000-0x7FFF.
//!
//! ```text
//! 0x0000-0x1FFF  program ROM (invaders.h/g/f/e)
//! 0x2000-0x23FF  work RAM
//! 0x2400-0x3FFF  video RAM (256x224, 1bpp)
//! 0x4000-0x5FFF  unpopulated, reads 0
//! 0x6000-0x7FFF  mirror of 0x2000-0x3FFF
//! ```

use invaders_core::error::EmuError;

use crate::rom_loader::RomLoadError;

pub const ROM_SIZE: usize = 0x2000;
pub const RAM_SIZE: usize = 0x2000;
pub const VRAM_OFFSET: usize = 0x0400;
pub const VRAM_SIZE: usize = RAM_SIZE - VRAM_OFFSET;

/// What happens when the program writes to ROM or unpopulated space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Drop the write silently, as the hardware does.
    #[default]
    Lenient,
    /// Drop the write and report it as [`EmuError::InvalidWrite`].
    Strict,
}

impl std::str::FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown write mode '{other}' (expected lenient or strict)")),
        }
    }
}

pub struct Memory {
    rom: Box<[u8; ROM_SIZE]>,
    /// Work RAM followed by video RAM.
    ram: Box<[u8; RAM_SIZE]>,
    mode: WriteMode,
    violation: Option<EmuError>,
}

impl Memory {
    pub fn new(mode: WriteMode) -> Self {
        Self {
            rom: Box::new([0; ROM_SIZE]),
            ram: Box::new([0; RAM_SIZE]),
            mode,
            violation: None,
        }
    }

    /// Copy a program image into ROM. Images shorter than 8 KiB are padded
    /// with zeros.
    pub fn load_rom(&mut self, image: &[u8]) -> Result<(), RomLoadError> {
        if image.len() > ROM_SIZE {
            return Err(RomLoadError::SizeMismatch {
                file: "program ROM".to_string(),
                expected: ROM_SIZE,
                actual: image.len(),
            });
        }
        self.rom.fill(0);
        self.rom[..image.len()].copy_from_slice(image);
        Ok(())
    }

    pub fn read(&self, addr: u16) -> u8 {
        let addr = addr & 0x7FFF;
        match addr {
            0x0000..=0x1FFF => self.rom[addr as usize],
            0x2000..=0x3FFF => self.ram[(addr - 0x2000) as usize],
            0x4000..=0x5FFF => 0x00,
            _ => self.ram[(addr - 0x6000) as usize],
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        let masked = addr & 0x7FFF;
        match masked {
            0x2000..=0x3FFF => self.ram[(masked - 0x2000) as usize] = value,
            0x6000..=0x7FFF => self.ram[(masked - 0x6000) as usize] = value,
            _ => self.reject_write(addr, value),
        }
    }

    fn reject_write(&mut self, address: u16, value: u8) {
        match self.mode {
            WriteMode::Lenient => {
                log::trace!("dropped write of 0x{value:02X} to 0x{address:04X}");
            }
            WriteMode::Strict => {
                // Keep the first violation of the instruction.
                self.violation
                    .get_or_insert(EmuError::InvalidWrite { address, value });
            }
        }
    }

    /// The pending strict-mode violation, if any, clearing it.
    pub fn take_violation(&mut self) -> Option<EmuError> {
        self.violation.take()
    }

    /// Video RAM (0x2400-0x3FFF): 224 rows of 32 bytes.
    pub fn vram(&self) -> &[u8] {
        &self.ram[VRAM_OFFSET..]
    }

    pub fn ram(&self) -> &[u8] {
        &self.ram[..]
    }

    pub fn rom(&self) -> &[u8] {
        &self.rom[..]
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: WriteMode) {
        self.mode = mode;
        self.violation = None;
    }

    /// Power-on RAM contents. ROM is kept.
    pub fn clear_ram(&mut self) {
        self.ram.fill(0);
        self.violation = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rom_is_read_only_in_lenient_mode() {
        let mut mem = Memory::new(WriteMode::Lenient);
        mem.load_rom(&[0xC3, 0x00, 0x20]).unwrap();
        mem.write(0x0000, 0xFF);
        assert_eq!(mem.read(0x0000), 0xC3);
        assert_eq!(mem.take_violation(), None);
    }

    #[test]
    fn strict_mode_records_first_violation() {
        let mut mem = Memory::new(WriteMode::Strict);
        mem.write(0x1000, 0x12);
        mem.write(0x4000, 0x34);
        assert_eq!(
            mem.take_violation(),
            Some(EmuError::InvalidWrite { address: 0x1000, value: 0x12 })
        );
        assert_eq!(mem.take_violation(), None);
        assert_eq!(mem.read(0x1000), 0x00);
    }

    #[test]
    fn ram_mirrors() {
        let mut mem = Memory::new(WriteMode::Strict);
        mem.write(0x2001, 0xAA);
        assert_eq!(mem.read(0x6001), 0xAA);
        assert_eq!(mem.read(0xA001), 0xAA);
        assert_eq!(mem.read(0xE001), 0xAA);

        mem.write(0x7FFF, 0x55);
        assert_eq!(mem.read(0x3FFF), 0x55);
        assert_eq!(mem.take_violation(), None);
    }

    #[test]
    fn rom_mirrors_above_0x8000() {
        let mut mem = Memory::new(WriteMode::Lenient);
        mem.load_rom(&[0x31, 0x00, 0x24]).unwrap();
        assert_eq!(mem.read(0x8000), 0x31);
        assert_eq!(mem.read(0x8002), 0x24);
    }

    #[test]
    fn unpopulated_reads_zero() {
        let mem = Memory::new(WriteMode::Lenient);
        assert_eq!(mem.read(0x4000), 0x00);
        assert_eq!(mem.read(0x5FFF), 0x00);
    }

    #[test]
    fn vram_window_starts_at_0x2400() {
        let mut mem = Memory::new(WriteMode::Lenient);
        mem.write(0x2400, 0x81);
        mem.write(0x3FFF, 0x01);
        assert_eq!(mem.vram().len(), 0x1C00);
        assert_eq!(mem.vram()[0], 0x81);
        assert_eq!(mem.vram()[0x1BFF], 0x01);
    }

    #[test]
    fn oversized_rom_rejected() {
        let mut mem = Memory::new(WriteMode::Lenient);
        let image = vec![0u8; ROM_SIZE + 1];
        assert!(matches!(
            mem.load_rom(&image),
            Err(RomLoadError::SizeMismatch { expected: ROM_SIZE, .. })
        ));
    }

    #[test]
    fn clear_ram_keeps_rom() {
        let mut mem = Memory::new(WriteMode::Lenient);
        mem.load_rom(&[0x76]).unwrap();
        mem.write(0x2100, 0x42);
        mem.clear_ram();
        assert_eq!(mem.read(0x2100), 0x00);
        assert_eq!(mem.read(0x0000), 0x76);
    }

    #[test]
    fn write_mode_parses() {
        assert_eq!("Strict".parse::<WriteMode>(), Ok(WriteMode::Strict));
        assert_eq!("lenient".parse::<WriteMode>(), Ok(WriteMode::Lenient));
        assert!("loose".parse::<WriteMode>().is_err());
    }
}
