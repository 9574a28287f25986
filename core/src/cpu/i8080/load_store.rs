use crate::core::Bus;
use crate::cpu::i8080::I8080;

impl I8080 {
    /// MOV r1,r2 (01 ddd sss). 0x76 (MOV M,M) is HLT and never gets here.
    pub(crate) fn op_mov<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let val = self.get_reg(opcode, bus);
        self.set_reg(opcode >> 3, val, bus);
    }

    /// MVI r,d8 (00 ddd 110)
    pub(crate) fn op_mvi<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let val = self.fetch_byte(bus);
        self.set_reg(opcode >> 3, val, bus);
    }

    /// LDAX B / LDAX D
    pub(crate) fn op_ldax<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let addr = self.get_rp(opcode >> 4);
        self.a = bus.read(addr);
    }

    /// STAX B / STAX D
    pub(crate) fn op_stax<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let addr = self.get_rp(opcode >> 4);
        bus.write(addr, self.a);
    }

    pub(crate) fn op_lda<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch_word(bus);
        self.a = bus.read(addr);
    }

    pub(crate) fn op_sta<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch_word(bus);
        bus.write(addr, self.a);
    }

    /// LXI rp,d16
    pub(crate) fn op_lxi<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let val = self.fetch_word(bus);
        self.set_rp(opcode >> 4, val);
    }

    /// LHLD a16: L <- (a16), H <- (a16+1)
    pub(crate) fn op_lhld<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch_word(bus);
        self.l = bus.read(addr);
        self.h = bus.read(addr.wrapping_add(1));
    }

    /// SHLD a16: (a16) <- L, (a16+1) <- H
    pub(crate) fn op_shld<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch_word(bus);
        bus.write(addr, self.l);
        bus.write(addr.wrapping_add(1), self.h);
    }

    pub(crate) fn op_xchg(&mut self) {
        std::mem::swap(&mut self.h, &mut self.d);
        std::mem::swap(&mut self.l, &mut self.e);
    }

    pub(crate) fn op_in<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let port = self.fetch_byte(bus);
        self.a = bus.io_read(port);
    }

    pub(crate) fn op_out<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let port = self.fetch_byte(bus);
        bus.io_write(port, self.a);
    }
}
