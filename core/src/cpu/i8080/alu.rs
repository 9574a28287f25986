use crate::core::Bus;
use crate::cpu::i8080::{Flag, I8080};

impl I8080 {
    /// `a + val + carry_in`, setting every flag. Returns the 8-bit result.
    fn add_with_flags(&mut self, a: u8, val: u8, carry_in: bool) -> u8 {
        let c = carry_in as u16;
        let sum = a as u16 + val as u16 + c;
        let result = sum as u8;
        self.set_szp(result);
        self.set_flag(Flag::CY, sum > 0xFF);
        self.set_flag(Flag::AC, (a & 0x0F) as u16 + (val & 0x0F) as u16 + c > 0x0F);
        result
    }

    /// `a - val - borrow_in`, done as `a + !val + !borrow_in` the way the
    /// 8080 adder does it. CY is the inverted carry out (set on borrow); AC
    /// is the raw half-carry of the addition.
    fn sub_with_flags(&mut self, a: u8, val: u8, borrow_in: bool) -> u8 {
        let result = self.add_with_flags(a, !val, !borrow_in);
        let carry = self.flag_set(Flag::CY);
        self.set_flag(Flag::CY, !carry);
        result
    }

    /// Apply one of the eight accumulator ops (ADD ADC SUB SBB ANA XRA ORA CMP).
    fn alu_op(&mut self, op: u8, val: u8) {
        let a = self.a;
        let carry = self.flag_set(Flag::CY);
        match op & 0x07 {
            0 => self.a = self.add_with_flags(a, val, false),
            1 => self.a = self.add_with_flags(a, val, carry),
            2 => self.a = self.sub_with_flags(a, val, false),
            3 => self.a = self.sub_with_flags(a, val, carry),
            4 => {
                // ANA: AC reflects bit 3 of either operand
                self.a = a & val;
                self.set_szp(self.a);
                self.set_flag(Flag::AC, (a | val) & 0x08 != 0);
                self.set_flag(Flag::CY, false);
            }
            5 => {
                self.a = a ^ val;
                self.set_szp(self.a);
                self.set_flag(Flag::AC, false);
                self.set_flag(Flag::CY, false);
            }
            6 => {
                self.a = a | val;
                self.set_szp(self.a);
                self.set_flag(Flag::AC, false);
                self.set_flag(Flag::CY, false);
            }
            _ => {
                self.sub_with_flags(a, val, false);
            }
        }
    }

    /// 10 ooo sss: ALU op with register/memory operand
    pub(crate) fn op_alu_r<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let val = self.get_reg(opcode, bus);
        self.alu_op(opcode >> 3, val);
    }

    /// 11 ooo 110: ALU op with immediate operand
    pub(crate) fn op_alu_n<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let val = self.fetch_byte(bus);
        self.alu_op(opcode >> 3, val);
    }

    /// INR r: CY unaffected.
    pub(crate) fn op_inr<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let r = opcode >> 3;
        let result = self.get_reg(r, bus).wrapping_add(1);
        self.set_reg(r, result, bus);
        self.set_szp(result);
        self.set_flag(Flag::AC, result & 0x0F == 0);
    }

    /// DCR r: CY unaffected.
    pub(crate) fn op_dcr<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let r = opcode >> 3;
        let result = self.get_reg(r, bus).wrapping_sub(1);
        self.set_reg(r, result, bus);
        self.set_szp(result);
        self.set_flag(Flag::AC, result & 0x0F != 0x0F);
    }

    pub(crate) fn op_inx(&mut self, opcode: u8) {
        let rp = opcode >> 4;
        self.set_rp(rp, self.get_rp(rp).wrapping_add(1));
    }

    pub(crate) fn op_dcx(&mut self, opcode: u8) {
        let rp = opcode >> 4;
        self.set_rp(rp, self.get_rp(rp).wrapping_sub(1));
    }

    /// DAD rp: HL += rp, only CY affected.
    pub(crate) fn op_dad(&mut self, opcode: u8) {
        let sum = self.hl() as u32 + self.get_rp(opcode >> 4) as u32;
        self.set_hl(sum as u16);
        self.set_flag(Flag::CY, sum > 0xFFFF);
    }

    pub(crate) fn op_daa(&mut self) {
        let mut carry = self.flag_set(Flag::CY);
        let lsb = self.a & 0x0F;
        let msb = self.a >> 4;
        let mut correction = 0u8;

        if self.flag_set(Flag::AC) || lsb > 9 {
            correction += 0x06;
        }
        if carry || msb > 9 || (msb >= 9 && lsb > 9) {
            correction += 0x60;
            carry = true;
        }

        self.a = self.add_with_flags(self.a, correction, false);
        self.set_flag(Flag::CY, carry);
    }

    // --- Accumulator rotates (only CY affected) ---

    pub(crate) fn op_rlc(&mut self) {
        let out = self.a >> 7;
        self.a = (self.a << 1) | out;
        self.set_flag(Flag::CY, out != 0);
    }

    pub(crate) fn op_rrc(&mut self) {
        let out = self.a & 0x01;
        self.a = (self.a >> 1) | (out << 7);
        self.set_flag(Flag::CY, out != 0);
    }

    pub(crate) fn op_ral(&mut self) {
        let carry_in = self.flag_set(Flag::CY) as u8;
        let out = self.a >> 7;
        self.a = (self.a << 1) | carry_in;
        self.set_flag(Flag::CY, out != 0);
    }

    pub(crate) fn op_rar(&mut self) {
        let carry_in = self.flag_set(Flag::CY) as u8;
        let out = self.a & 0x01;
        self.a = (self.a >> 1) | (carry_in << 7);
        self.set_flag(Flag::CY, out != 0);
    }
}
