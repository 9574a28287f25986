use crate::core::Bus;
use crate::cpu::i8080::{FLAGS_FIXED, FLAGS_MASK, I8080};

impl I8080 {
    /// Push high byte first so the word sits little-endian at the new SP.
    pub(crate) fn push_word<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.sp = self.sp.wrapping_sub(1);
        bus.write(self.sp, hi);
        self.sp = self.sp.wrapping_sub(1);
        bus.write(self.sp, lo);
    }

    pub(crate) fn pop_word<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read(self.sp);
        self.sp = self.sp.wrapping_add(1);
        let hi = bus.read(self.sp);
        self.sp = self.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    /// PUSH rp (11 rp0 101). rp 3 is PSW = A:F with the fixed bits forced.
    pub(crate) fn op_push<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let value = match (opcode >> 4) & 0x03 {
            3 => u16::from_be_bytes([self.a, (self.f & FLAGS_MASK) | FLAGS_FIXED]),
            rp => self.get_rp(rp),
        };
        self.push_word(bus, value);
    }

    /// POP rp (11 rp0 001). POP PSW normalises the fixed flag bits.
    pub(crate) fn op_pop<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let value = self.pop_word(bus);
        match (opcode >> 4) & 0x03 {
            3 => {
                let [a, f] = value.to_be_bytes();
                self.a = a;
                self.set_f(f);
            }
            rp => self.set_rp(rp, value),
        }
    }

    /// XTHL: exchange HL with the word at (SP)
    pub(crate) fn op_xthl<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let lo = bus.read(self.sp);
        let hi = bus.read(self.sp.wrapping_add(1));
        bus.write(self.sp, self.l);
        bus.write(self.sp.wrapping_add(1), self.h);
        self.l = lo;
        self.h = hi;
    }
}
