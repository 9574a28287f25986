#![allow(dead_code)]

/// Program that counts interrupts: RST 1 increments 0x2000, RST 2
/// increments 0x2001. The main loop spins with interrupts enabled.
pub fn interrupt_counter_program() -> Vec<u8> {
    let mut rom = vec![0u8; 0x60];
    let main = [
        0x31, 0x00, 0x24, // LXI SP,0x2400
        0xFB, // EI
        0xC3, 0x04, 0x00, // JMP 0x0004
    ];
    rom[..main.len()].copy_from_slice(&main);
    rom[0x08..0x0B].copy_from_slice(&[0xC3, 0x40, 0x00]); // RST 1: JMP 0x0040
    rom[0x10..0x13].copy_from_slice(&[0xC3, 0x50, 0x00]); // RST 2: JMP 0x0050
    rom[0x40..0x46].copy_from_slice(&[0x21, 0x00, 0x20, 0x34, 0xFB, 0xC9]); // LXI H,0x2000; INR M; EI; RET
    rom[0x50..0x56].copy_from_slice(&[0x21, 0x01, 0x20, 0x34, 0xFB, 0xC9]); // LXI H,0x2001; INR M; EI; RET
    rom
}

/// Same counters, but the main loop waits in HLT.
pub fn halting_counter_program() -> Vec<u8> {
    let mut rom = interrupt_counter_program();
    rom[..7].copy_from_slice(&[
        0x31, 0x00, 0x24, // LXI SP,0x2400
        0xFB, // EI
        0x76, // HLT
        0xC3, 0x03, // JMP 0x0003 (high byte at 0x0007)
    ]);
    rom[7] = 0x00;
    rom
}

/// Copies IN 1 to 0x2000 and IN 2 to 0x2001 forever.
pub fn port_mirror_program() -> Vec<u8> {
    vec![
        0xDB, 0x01, // IN 1
        0x32, 0x00, 0x20, // STA 0x2000
        0xDB, 0x02, // IN 2
        0x32, 0x01, 0x20, // STA 0x2001
        0xC3, 0x00, 0x00, // JMP 0x0000
    ]
}

/// Longest 8080 instruction (XTHL) plus an interrupt acknowledge.
pub const MAX_DEBT: u64 = 18 + 11;
