use std::error::Error;
use std::io::Read;
use std::path::Path;

use invaders_core::core::{Bus, FlatBus};
use invaders_core::cpu::I8080;
use invaders_core::error::EmuError;
use serde::{Deserialize, Serialize};

// --- TracingBus: flat 64KB memory with access recording ---

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BusOp {
    Read,
    Write,
    IoRead,
    IoWrite,
    Internal,
}

impl BusOp {
    /// Short tag used in the JSON `cycles` list.
    pub fn tag(self) -> &'static str {
        match self {
            BusOp::Read => "read",
            BusOp::Write => "write",
            BusOp::IoRead => "in",
            BusOp::IoWrite => "out",
            BusOp::Internal => "internal",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BusCycle {
    pub addr: u16,
    pub data: u8,
    pub op: BusOp,
}

pub struct TracingBus {
    pub memory: Box<[u8; 0x10000]>,
    /// Values returned by IN, indexed by port.
    pub ports: [u8; 256],
    pub cycles: Vec<BusCycle>,
}

impl TracingBus {
    pub fn new() -> Self {
        Self {
            memory: Box::new([0; 0x10000]),
            ports: [0; 256],
            cycles: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn clear_cycles(&mut self) {
        self.cycles.clear();
    }
}

impl Default for TracingBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for TracingBus {
    fn read(&mut self, addr: u16) -> u8 {
        let data = self.memory[addr as usize];
        self.cycles.push(BusCycle {
            addr,
            data,
            op: BusOp::Read,
        });
        data
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
        self.cycles.push(BusCycle {
            addr,
            data,
            op: BusOp::Write,
        });
    }

    fn io_read(&mut self, port: u8) -> u8 {
        let data = self.ports[port as usize];
        self.cycles.push(BusCycle {
            addr: port as u16,
            data,
            op: BusOp::IoRead,
        });
        data
    }

    fn io_write(&mut self, port: u8, data: u8) {
        self.cycles.push(BusCycle {
            addr: port as u16,
            data,
            op: BusOp::IoWrite,
        });
    }
}

// --- I8080 JSON test vector types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I8080TestCase {
    pub name: String,
    pub initial: I8080CpuState,
    #[serde(rename = "final")]
    pub final_state: I8080CpuState,
    /// One entry per clock cycle: (address, data, op tag). Clocks with no
    /// bus activity are recorded as internal.
    pub cycles: Vec<(u16, u8, String)>,
    /// Port values seen by IN: (port, value).
    #[serde(default)]
    pub ports: Vec<(u8, u8)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I8080CpuState {
    pub pc: u16,
    pub sp: u16,
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub f: u8,
    pub h: u8,
    pub l: u8,
    #[serde(default)]
    pub inte: u8,
    pub ram: Vec<(u16, u8)>,
}

impl I8080CpuState {
    /// Registers of `cpu`, with `ram` left empty.
    pub fn from_cpu(cpu: &I8080) -> Self {
        Self {
            pc: cpu.pc,
            sp: cpu.sp,
            a: cpu.a,
            b: cpu.b,
            c: cpu.c,
            d: cpu.d,
            e: cpu.e,
            f: cpu.f,
            h: cpu.h,
            l: cpu.l,
            inte: cpu.inte as u8,
            ram: Vec::new(),
        }
    }

    pub fn apply_to(&self, cpu: &mut I8080) {
        cpu.pc = self.pc;
        cpu.sp = self.sp;
        cpu.a = self.a;
        cpu.b = self.b;
        cpu.c = self.c;
        cpu.d = self.d;
        cpu.e = self.e;
        cpu.f = self.f;
        cpu.h = self.h;
        cpu.l = self.l;
        cpu.inte = self.inte != 0;
        cpu.halted = false;
    }
}

/// Read a vector file, plain `.json` or gzip-compressed `.json.gz`.
pub fn load_test_file(path: &Path) -> Result<Vec<I8080TestCase>, Box<dyn Error>> {
    let file = std::fs::File::open(path)?;
    let mut json = String::new();
    if path.extension().is_some_and(|ext| ext == "gz") {
        flate2::read::GzDecoder::new(file).read_to_string(&mut json)?;
    } else {
        std::io::BufReader::new(file).read_to_string(&mut json)?;
    }
    Ok(serde_json::from_str(&json)?)
}

/// Run one vector. Returns a description of the first mismatch.
pub fn run_test_case(tc: &I8080TestCase) -> Option<String> {
    let mut cpu = I8080::new();
    let mut bus = TracingBus::new();

    tc.initial.apply_to(&mut cpu);
    for &(addr, val) in &tc.initial.ram {
        bus.memory[addr as usize] = val;
    }
    for &(port, val) in &tc.ports {
        bus.ports[port as usize] = val;
    }

    let cycles = match cpu.step(&mut bus) {
        Ok(cycles) => cycles,
        Err(e) => return Some(format!("{}: {e}", tc.name)),
    };

    let fs = &tc.final_state;

    macro_rules! check {
        ($got:expr, $exp:expr, $name:expr) => {
            if $got != $exp {
                return Some(format!(
                    "{}: {} (got 0x{:X} exp 0x{:X})",
                    tc.name, $name, $got as u64, $exp as u64
                ));
            }
        };
    }

    check!(cpu.a, fs.a, "A");
    check!(cpu.f, fs.f, "F");
    check!(cpu.b, fs.b, "B");
    check!(cpu.c, fs.c, "C");
    check!(cpu.d, fs.d, "D");
    check!(cpu.e, fs.e, "E");
    check!(cpu.h, fs.h, "H");
    check!(cpu.l, fs.l, "L");
    check!(cpu.sp, fs.sp, "SP");
    check!(cpu.pc, fs.pc, "PC");
    check!(cpu.inte as u8, fs.inte, "INTE");

    for &(addr, expected) in &fs.ram {
        let got = bus.memory[addr as usize];
        if got != expected {
            return Some(format!(
                "{}: RAM[0x{addr:04X}] (got 0x{got:02X} exp 0x{expected:02X})",
                tc.name
            ));
        }
    }

    if cycles as usize != tc.cycles.len() {
        return Some(format!(
            "{}: cycles (got {} exp {})",
            tc.name,
            cycles,
            tc.cycles.len()
        ));
    }

    None
}

// --- CP/M harness for the classic 8080 diagnostic programs ---

/// Where CP/M loads .COM programs.
pub const TPA_START: u16 = 0x0100;
const BDOS_ENTRY: u16 = 0x0005;
/// Top of memory as reported through the BDOS jump vector.
const MEMORY_TOP: u16 = 0xF000;

#[derive(Debug)]
pub enum CpmError {
    /// The CPU faulted (unimplemented opcode).
    Cpu(EmuError),
    /// The program did not warm-boot within the cycle budget.
    Timeout { cycles: u64, output: String },
    /// The program does not fit in the TPA.
    TooLarge(usize),
}

impl std::fmt::Display for CpmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpu(e) => write!(f, "CPU fault: {e}"),
            Self::Timeout { cycles, output } => {
                write!(f, "no warm boot after {cycles} cycles; output so far: {output:?}")
            }
            Self::TooLarge(len) => write!(f, "program of {len} bytes does not fit in the TPA"),
        }
    }
}

impl Error for CpmError {}

impl From<EmuError> for CpmError {
    fn from(e: EmuError) -> Self {
        Self::Cpu(e)
    }
}

/// Result of a program that returned to CP/M.
#[derive(Debug, Clone)]
pub struct CpmRun {
    pub output: String,
    pub instructions: u64,
    pub cycles: u64,
}

/// Run a .COM image under a minimal BDOS (console output functions 2 and 9)
/// until it jumps to 0x0000.
pub fn run_cpm_program(com: &[u8], max_cycles: u64) -> Result<CpmRun, CpmError> {
    let tpa = TPA_START as usize;
    if com.len() > MEMORY_TOP as usize - tpa {
        return Err(CpmError::TooLarge(com.len()));
    }

    let mut bus = FlatBus::new();
    bus.load(TPA_START, com);
    bus.memory[0x0000] = 0x76; // HLT at the warm boot vector
    bus.memory[BDOS_ENTRY as usize] = 0xC9; // RET
    let [lo, hi] = MEMORY_TOP.to_le_bytes();
    bus.memory[0x0006] = lo;
    bus.memory[0x0007] = hi;

    let mut cpu = I8080::new();
    cpu.pc = TPA_START;
    cpu.sp = MEMORY_TOP;

    let mut output = String::new();
    let mut instructions = 0u64;
    let mut cycles = 0u64;

    while cycles < max_cycles {
        match cpu.pc {
            0x0000 => {
                return Ok(CpmRun {
                    output,
                    instructions,
                    cycles,
                });
            }
            BDOS_ENTRY => bdos_call(&cpu, &bus, &mut output),
            _ => {}
        }
        cycles += cpu.step(&mut bus)? as u64;
        instructions += 1;
    }

    Err(CpmError::Timeout { cycles, output })
}

fn bdos_call(cpu: &I8080, bus: &FlatBus, output: &mut String) {
    match cpu.c {
        2 => output.push(cpu.e as char),
        9 => {
            let mut addr = cpu.de();
            loop {
                let ch = bus.memory[addr as usize];
                if ch == b'$' {
                    break;
                }
                output.push(ch as char);
                addr = addr.wrapping_add(1);
            }
        }
        _ => {}
    }
}
