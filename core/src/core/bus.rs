/// Memory and port interface seen by the CPU.
///
/// The 8080 has a 16-bit memory space and a separate 8-bit I/O port space
/// reached only through `IN`/`OUT`. Implementors decide how addresses are
/// decoded (ROM, RAM, mirrors, unpopulated space).
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);

    /// Read from I/O port space (`IN port`).
    /// Default: floating bus, all bits high.
    fn io_read(&mut self, _port: u8) -> u8 {
        0xFF
    }

    /// Write to I/O port space (`OUT port`).
    /// Default: no device responds.
    fn io_write(&mut self, _port: u8, _data: u8) {}
}

/// Flat 64KB read/write memory with no I/O devices.
///
/// Useful for tests, CPU validation, and running bare 8080 programs.
pub struct FlatBus {
    pub memory: Box<[u8; 0x10000]>,
}

impl FlatBus {
    pub fn new() -> Self {
        Self {
            memory: Box::new([0; 0x10000]),
        }
    }

    /// Copy `data` into memory starting at `addr`, wrapping at 0xFFFF.
    pub fn load(&mut self, addr: u16, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            self.memory[addr.wrapping_add(i as u16) as usize] = byte;
        }
    }
}

impl Default for FlatBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for FlatBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
    }
}
