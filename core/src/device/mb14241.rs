/// Fujitsu MB14241 barrel shifter
///
/// A 16-bit register fed a byte at a time from the top: each data write
/// moves the previous byte into the low half. The CPU reads back an 8-bit
/// window whose position is set by a 3-bit shift amount. Midway-era 8080
/// boards use it to draw sprites at arbitrary pixel offsets, since the CPU
/// has no multi-bit shift instruction.
#[derive(Debug, Clone, Default)]
pub struct Mb14241 {
    data: u16,
    offset: u8,
}

impl Mb14241 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a new byte into the high half; the old high half drops to the low half.
    pub fn write_data(&mut self, value: u8) {
        self.data = ((value as u16) << 8) | (self.data >> 8);
    }

    /// Set the shift amount. Only the low 3 bits are used.
    pub fn set_offset(&mut self, value: u8) {
        self.offset = value & 0x07;
    }

    /// The 8 bits starting `offset` bits below the top of the register.
    pub fn result(&self) -> u8 {
        (self.data >> (8 - self.offset)) as u8
    }

    pub fn offset(&self) -> u8 {
        self.offset
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
