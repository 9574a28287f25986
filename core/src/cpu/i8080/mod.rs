mod alu;
mod branch;
mod load_store;
mod stack;
pub mod timing;

pub use timing::{instruction_len, mnemonic};

use crate::core::Bus;
use crate::cpu::{
    Cpu,
    state::{CpuStateTrait, I8080State},
};
use crate::error::EmuError;
use timing::{CYCLES, HALT_IDLE_CYCLES, INTERRUPT_CYCLES};

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum Flag {
    CY = 0x01, // Carry
    P = 0x04,  // Parity (even)
    AC = 0x10, // Auxiliary carry (out of bit 3)
    Z = 0x40,  // Zero
    S = 0x80,  // Sign
}

/// Bits of F that hold real flags. Bit 1 always reads 1, bits 3 and 5 read 0.
pub const FLAGS_MASK: u8 = 0xD7;
pub const FLAGS_FIXED: u8 = 0x02;

/// Register operand encoding used in opcode bit fields (`ddd`/`sss`).
/// Index 6 is the memory operand M = (HL).
pub const REG_M: u8 = 6;

pub struct I8080 {
    // Registers
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,

    // Internal state
    pub inte: bool,
    pub halted: bool,

    /// Execute the undocumented opcode aliases (0x08 NOP, 0xCB JMP, 0xD9 RET,
    /// 0xDD/0xED/0xFD CALL, ...) instead of rejecting them.
    pub undocumented: bool,
}

impl Default for I8080 {
    fn default() -> Self {
        Self::new()
    }
}

impl I8080 {
    pub fn new() -> Self {
        Self {
            a: 0,
            f: FLAGS_FIXED,
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            sp: 0,
            pc: 0,
            inte: false,
            halted: false,
            undocumented: false,
        }
    }

    /// CPU that executes undocumented opcodes like the silicon does.
    pub fn with_undocumented(undocumented: bool) -> Self {
        Self {
            undocumented,
            ..Self::new()
        }
    }

    // --- Flag helpers ---

    #[inline]
    pub(crate) fn set_flag(&mut self, flag: Flag, set: bool) {
        if set {
            self.f |= flag as u8;
        } else {
            self.f &= !(flag as u8);
        }
    }

    #[inline]
    pub fn flag_set(&self, flag: Flag) -> bool {
        self.f & (flag as u8) != 0
    }

    /// Set S, Z and P from an 8-bit result. AC and CY are left alone.
    #[inline]
    pub(crate) fn set_szp(&mut self, result: u8) {
        self.set_flag(Flag::S, result & 0x80 != 0);
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::P, result.count_ones() % 2 == 0);
    }

    /// Load F from a byte, forcing the fixed bits.
    #[inline]
    pub(crate) fn set_f(&mut self, value: u8) {
        self.f = (value & FLAGS_MASK) | FLAGS_FIXED;
    }

    // --- Register access ---

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        [self.b, self.c] = value.to_be_bytes();
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        [self.d, self.e] = value.to_be_bytes();
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        [self.h, self.l] = value.to_be_bytes();
    }

    /// Read an 8-bit operand by its 3-bit encoding (B C D E H L M A).
    pub(crate) fn get_reg<B: Bus + ?Sized>(&self, r: u8, bus: &mut B) -> u8 {
        match r & 0x07 {
            0 => self.b,
            1 => self.c,
            2 => self.d,
            3 => self.e,
            4 => self.h,
            5 => self.l,
            REG_M => bus.read(self.hl()),
            _ => self.a,
        }
    }

    /// Write an 8-bit operand by its 3-bit encoding (B C D E H L M A).
    pub(crate) fn set_reg<B: Bus + ?Sized>(&mut self, r: u8, val: u8, bus: &mut B) {
        match r & 0x07 {
            0 => self.b = val,
            1 => self.c = val,
            2 => self.d = val,
            3 => self.e = val,
            4 => self.h = val,
            5 => self.l = val,
            REG_M => bus.write(self.hl(), val),
            _ => self.a = val,
        }
    }

    /// Read a register pair by its 2-bit encoding (BC DE HL SP).
    pub(crate) fn get_rp(&self, rp: u8) -> u16 {
        match rp & 0x03 {
            0 => self.bc(),
            1 => self.de(),
            2 => self.hl(),
            _ => self.sp,
        }
    }

    /// Write a register pair by its 2-bit encoding (BC DE HL SP).
    pub(crate) fn set_rp(&mut self, rp: u8, value: u16) {
        match rp & 0x03 {
            0 => self.set_bc(value),
            1 => self.set_de(value),
            2 => self.set_hl(value),
            _ => self.sp = value,
        }
    }

    // --- Operand fetch ---

    #[inline]
    pub(crate) fn fetch_byte<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let val = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        val
    }

    #[inline]
    pub(crate) fn fetch_word<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch_byte(bus);
        let hi = self.fetch_byte(bus);
        u16::from_le_bytes([lo, hi])
    }

    // --- Decode ---

    /// Map an opcode byte to the documented opcode it executes as.
    /// Returns `None` for undocumented opcodes when aliases are disabled.
    fn decode(&self, opcode: u8) -> Option<u8> {
        let alias = match opcode {
            0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => 0x00,
            0xCB => 0xC3,
            0xD9 => 0xC9,
            0xDD | 0xED | 0xFD => 0xCD,
            _ => return Some(opcode),
        };
        self.undocumented.then_some(alias)
    }

    // --- Execution ---

    /// Execute one instruction.
    ///
    /// A halted CPU idles for [`HALT_IDLE_CYCLES`] without fetching.
    /// On `UnimplementedOpcode` nothing has been modified: the opcode is
    /// read without advancing PC and rejected before any side effect.
    pub fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<u32, EmuError> {
        if self.halted {
            return Ok(HALT_IDLE_CYCLES);
        }

        let pc = self.pc;
        let raw = bus.read(pc);
        let opcode = self
            .decode(raw)
            .ok_or(EmuError::UnimplementedOpcode { opcode: raw, pc })?;

        log::trace!("{pc:04X}  {:<12} {}", mnemonic(raw), self.snapshot());

        self.pc = pc.wrapping_add(1);
        Ok(self.execute_instruction(opcode, bus))
    }

    fn execute_instruction<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let mut cycles = CYCLES[opcode as usize] as u32;

        match opcode {
            // ===== NOP / HLT =====
            0x00 => {}
            0x76 => self.halted = true,

            // ===== 8-bit data movement =====
            0x40..=0x7F => self.op_mov(opcode, bus),
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => self.op_mvi(opcode, bus),
            0x0A | 0x1A => self.op_ldax(opcode, bus),
            0x02 | 0x12 => self.op_stax(opcode, bus),
            0x3A => self.op_lda(bus),
            0x32 => self.op_sta(bus),

            // ===== 16-bit data movement =====
            0x01 | 0x11 | 0x21 | 0x31 => self.op_lxi(opcode, bus),
            0x2A => self.op_lhld(bus),
            0x22 => self.op_shld(bus),
            0xEB => self.op_xchg(),

            // ===== ALU =====
            0x80..=0xBF => self.op_alu_r(opcode, bus),
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => self.op_alu_n(opcode, bus),
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => self.op_inr(opcode, bus),
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => self.op_dcr(opcode, bus),
            0x03 | 0x13 | 0x23 | 0x33 => self.op_inx(opcode),
            0x0B | 0x1B | 0x2B | 0x3B => self.op_dcx(opcode),
            0x09 | 0x19 | 0x29 | 0x39 => self.op_dad(opcode),
            0x27 => self.op_daa(),

            // ===== Accumulator rotates / flag ops =====
            0x07 => self.op_rlc(),
            0x0F => self.op_rrc(),
            0x17 => self.op_ral(),
            0x1F => self.op_rar(),
            0x2F => self.a = !self.a,                                 // CMA
            0x37 => self.set_flag(Flag::CY, true),                    // STC
            0x3F => self.set_flag(Flag::CY, !self.flag_set(Flag::CY)), // CMC

            // ===== Jumps / calls / returns =====
            0xC3 => self.op_jmp(bus),
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => self.op_jcc(opcode, bus),
            0xCD => self.op_call(bus),
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
                cycles += self.op_ccc(opcode, bus);
            }
            0xC9 => self.op_ret(bus),
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
                cycles += self.op_rcc(opcode, bus);
            }
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => self.op_rst(opcode, bus),
            0xE9 => self.pc = self.hl(), // PCHL

            // ===== Stack =====
            0xC5 | 0xD5 | 0xE5 | 0xF5 => self.op_push(opcode, bus),
            0xC1 | 0xD1 | 0xE1 | 0xF1 => self.op_pop(opcode, bus),
            0xE3 => self.op_xthl(bus),
            0xF9 => self.sp = self.hl(), // SPHL

            // ===== I/O and interrupt control =====
            0xDB => self.op_in(bus),
            0xD3 => self.op_out(bus),
            0xFB => self.inte = true,
            0xF3 => self.inte = false,

            // Undocumented opcodes never reach here: decode() maps or rejects them.
            _ => unreachable!("undecoded opcode 0x{opcode:02X}"),
        }

        cycles
    }

    /// Accept a vectored interrupt (RST `vector`) if INTE is set.
    ///
    /// Wakes a halted CPU, pushes PC, clears INTE and jumps to `vector * 8`.
    /// Requests made while interrupts are disabled are dropped.
    pub fn interrupt<B: Bus + ?Sized>(&mut self, bus: &mut B, vector: u8) -> u32 {
        if !self.inte {
            log::trace!("RST {vector} dropped (interrupts disabled)");
            return 0;
        }

        self.inte = false;
        self.halted = false;
        let pc = self.pc;
        self.push_word(bus, pc);
        self.pc = u16::from(vector & 0x07) << 3;
        INTERRUPT_CYCLES
    }
}

impl Cpu for I8080 {
    fn reset(&mut self) {
        self.pc = 0;
        self.inte = false;
        self.halted = false;
    }

    fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<u32, EmuError> {
        I8080::step(self, bus)
    }

    fn interrupt<B: Bus + ?Sized>(&mut self, bus: &mut B, vector: u8) -> u32 {
        I8080::interrupt(self, bus, vector)
    }

    fn is_sleeping(&self) -> bool {
        self.halted
    }
}

impl CpuStateTrait for I8080 {
    type Snapshot = I8080State;

    fn snapshot(&self) -> I8080State {
        I8080State {
            a: self.a,
            f: self.f,
            b: self.b,
            c: self.c,
            d: self.d,
            e: self.e,
            h: self.h,
            l: self.l,
            sp: self.sp,
            pc: self.pc,
            inte: self.inte,
            halted: self.halted,
        }
    }
}
