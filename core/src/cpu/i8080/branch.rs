use crate::core::Bus;
use crate::cpu::i8080::timing::BRANCH_TAKEN_EXTRA_CYCLES;
use crate::cpu::i8080::{Flag, I8080};

impl I8080 {
    /// Evaluate condition code `ccc` (bits 5-3 of the opcode):
    /// NZ Z NC C PO PE P M.
    pub(crate) fn condition(&self, opcode: u8) -> bool {
        match (opcode >> 3) & 0x07 {
            0 => !self.flag_set(Flag::Z),
            1 => self.flag_set(Flag::Z),
            2 => !self.flag_set(Flag::CY),
            3 => self.flag_set(Flag::CY),
            4 => !self.flag_set(Flag::P),
            5 => self.flag_set(Flag::P),
            6 => !self.flag_set(Flag::S),
            _ => self.flag_set(Flag::S),
        }
    }

    pub(crate) fn op_jmp<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.pc = self.fetch_word(bus);
    }

    /// Jcc a16: the address is always fetched; timing does not depend on the outcome.
    pub(crate) fn op_jcc<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let target = self.fetch_word(bus);
        if self.condition(opcode) {
            self.pc = target;
        }
    }

    pub(crate) fn op_call<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let target = self.fetch_word(bus);
        let ret = self.pc;
        self.push_word(bus, ret);
        self.pc = target;
    }

    /// Ccc a16. Returns extra cycles when the call is taken.
    pub(crate) fn op_ccc<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let target = self.fetch_word(bus);
        if !self.condition(opcode) {
            return 0;
        }
        let ret = self.pc;
        self.push_word(bus, ret);
        self.pc = target;
        BRANCH_TAKEN_EXTRA_CYCLES
    }

    pub(crate) fn op_ret<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.pc = self.pop_word(bus);
    }

    /// Rcc. Returns extra cycles when the return is taken.
    pub(crate) fn op_rcc<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        if !self.condition(opcode) {
            return 0;
        }
        self.pc = self.pop_word(bus);
        BRANCH_TAKEN_EXTRA_CYCLES
    }

    /// RST n (11 nnn 111): call to n * 8
    pub(crate) fn op_rst<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let ret = self.pc;
        self.push_word(bus, ret);
        self.pc = (opcode & 0x38) as u16;
    }
}
