#![allow(dead_code)]

use invaders_core::core::Bus;
use invaders_core::cpu::I8080;

/// Minimal bus for testing: flat 64KB read/write memory plus an I/O port
/// file. Port reads return `ports_in[port]`; port writes are logged in order.
pub struct TestBus {
    pub memory: Box<[u8; 0x10000]>,
    pub ports_in: [u8; 256],
    pub ports_out: Vec<(u8, u8)>,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: Box::new([0; 0x10000]),
            ports_in: [0; 256],
            ports_out: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }
}

impl Bus for TestBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
    }

    fn io_read(&mut self, port: u8) -> u8 {
        self.ports_in[port as usize]
    }

    fn io_write(&mut self, port: u8, data: u8) {
        self.ports_out.push((port, data));
    }
}

/// Execute one instruction, panicking on decode errors.
pub fn step(cpu: &mut I8080, bus: &mut TestBus) -> u32 {
    cpu.step(bus).expect("instruction should decode")
}

/// Load `program` at 0 and execute `count` instructions. Returns total cycles.
pub fn run_program(cpu: &mut I8080, bus: &mut TestBus, program: &[u8], count: usize) -> u32 {
    bus.load(0, program);
    (0..count).map(|_| step(cpu, bus)).sum()
}

pub const S: u8 = 0x80;
pub const Z: u8 = 0x40;
pub const AC: u8 = 0x10;
pub const P: u8 = 0x04;
pub const CY: u8 = 0x01;
