//! CPU state snapshot types and traits

/// Trait for CPU types that can provide state snapshots
pub trait CpuStateTrait {
    type Snapshot;
    fn snapshot(&self) -> Self::Snapshot;
}

/// I8080 CPU state snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I8080State {
    pub a: u8,      // Accumulator
    pub f: u8,      // Flags (S Z 0 AC 0 P 1 CY)
    pub b: u8,      // Register B
    pub c: u8,      // Register C
    pub d: u8,      // Register D
    pub e: u8,      // Register E
    pub h: u8,      // Register H
    pub l: u8,      // Register L
    pub sp: u16,    // Stack pointer
    pub pc: u16,    // Program counter
    pub inte: bool, // Interrupt enable flip-flop
    pub halted: bool,
}

impl std::fmt::Display for I8080State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PC={:04X} SP={:04X} A={:02X} F={:02X} BC={:02X}{:02X} DE={:02X}{:02X} HL={:02X}{:02X} INTE={} HALT={}",
            self.pc,
            self.sp,
            self.a,
            self.f,
            self.b,
            self.c,
            self.d,
            self.e,
            self.h,
            self.l,
            self.inte as u8,
            self.halted as u8
        )
    }
}
