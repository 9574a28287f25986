use invaders_core::core::Bus;
use invaders_core::cpu::{CpuStateTrait, I8080};
use invaders_core::error::EmuError;
mod common;
use common::{run_program, TestBus};

const UNDOCUMENTED: [u8; 12] = [
    0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38, 0xCB, 0xD9, 0xDD, 0xED, 0xFD,
];

/// Datasheet timing, written out by instruction group rather than by opcode.
/// `taken` is whether a conditional CALL/RET's condition holds.
fn datasheet_cycles(op: u8, taken: bool) -> u32 {
    let branch = |base: u32| if taken { base + 6 } else { base };
    match op {
        0x76 => 7, // HLT
        0x40..=0x7F if op & 0x07 == 6 || (op >> 3) & 0x07 == 6 => 7, // MOV with M
        0x40..=0x7F => 5,
        0x80..=0xBF if op & 0x07 == 6 => 7, // ALU M
        0x80..=0xBF => 4,
        0x34 | 0x35 | 0x36 => 10, // INR M, DCR M, MVI M
        0x00..=0x3F if op & 0x07 == 4 || op & 0x07 == 5 => 5, // INR/DCR r
        0x00..=0x3F if op & 0x07 == 6 => 7,                   // MVI r
        0x00..=0x3F if op & 0x0F == 0x01 => 10,               // LXI
        0x00..=0x3F if op & 0x0F == 0x09 => 10,               // DAD
        0x00..=0x3F if op & 0x07 == 3 => 5,                   // INX/DCX
        0x02 | 0x12 | 0x0A | 0x1A => 7,                       // STAX/LDAX
        0x22 | 0x2A => 16,                                    // SHLD/LHLD
        0x32 | 0x3A => 13,                                    // STA/LDA
        0x00..=0x3F => 4, // NOP, rotates, DAA, CMA, STC, CMC
        0xC3 | 0xC9 | 0xD3 | 0xDB => 10,
        0xCD => 17,
        0xE3 => 18,
        0xE9 | 0xF9 => 5,
        0xEB | 0xF3 | 0xFB => 4,
        _ => match op & 0x0F {
            0x00 | 0x08 => branch(5),  // Rcc
            0x02 | 0x0A => 10,         // Jcc
            0x04 | 0x0C => branch(11), // Ccc
            0x06 | 0x0E => 7,          // ALU immediate
            0x07 | 0x0F => 11,         // RST
            0x01 => 10,                // POP
            0x05 => 11,                // PUSH
            _ => unreachable!("documented opcode 0x{op:02X} not covered"),
        },
    }
}

#[test]
fn test_every_documented_opcode_matches_datasheet_timing() {
    // All flags clear: NZ/NC/PO/P hold. All flags set: Z/C/PE/M hold.
    for (flags, odd_conditions_hold) in [(0x02u8, false), (0xD7u8, true)] {
        for op in 0..=255u8 {
            if UNDOCUMENTED.contains(&op) {
                continue;
            }
            let mut cpu = I8080::new();
            let mut bus = TestBus::new();
            cpu.pc = 0x0100;
            cpu.sp = 0x3000;
            cpu.f = flags;
            bus.load(0x0100, &[op, 0x00, 0x20]);

            let taken = ((op >> 3) & 0x01 == 1) == odd_conditions_hold;
            let cycles = cpu.step(&mut bus).unwrap();
            assert_eq!(
                cycles,
                datasheet_cycles(op, taken),
                "opcode 0x{op:02X} cycle count with F=0x{flags:02X}"
            );
        }
    }
}

#[test]
fn test_conditional_call_and_return_both_outcomes() {
    let calls = [0xC4, 0xCC, 0xD4, 0xDC, 0xE4, 0xEC, 0xF4, 0xFC];
    let returns = [0xC0, 0xC8, 0xD0, 0xD8, 0xE0, 0xE8, 0xF0, 0xF8];
    for flags in [0x02u8, 0xD7] {
        for op in calls.into_iter().chain(returns) {
            let mut cpu = I8080::new();
            let mut bus = TestBus::new();
            cpu.pc = 0x0100;
            cpu.sp = 0x3000;
            cpu.f = flags;
            bus.load(0x0100, &[op, 0x00, 0x20]);

            let cycles = cpu.step(&mut bus).unwrap();
            let moved = cpu.pc != if calls.contains(&op) { 0x0103 } else { 0x0101 };
            let (skipped, taken) = if calls.contains(&op) { (11, 17) } else { (5, 11) };
            let expected = if moved { taken } else { skipped };
            assert_eq!(cycles, expected, "opcode 0x{op:02X} with F=0x{flags:02X}");
        }
    }
}

#[test]
fn test_three_instruction_program() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    let program = [
        0x3E, 0x20, // MVI A,0x20
        0xC6, 0x22, // ADI 0x22
        0x32, 0x00, 0x24, // STA 0x2400
    ];

    let cycles = run_program(&mut cpu, &mut bus, &program, 3);
    assert_eq!(cycles, 7 + 7 + 13);
    assert_eq!(cpu.a, 0x42);
    assert_eq!(cpu.pc, 0x0007);
    assert_eq!(bus.memory[0x2400], 0x42);
    assert_eq!(cpu.f, 0x06, "even parity, nothing else");
}

#[test]
fn test_unimplemented_opcode_leaves_state_unchanged() {
    for &op in &UNDOCUMENTED {
        let mut cpu = I8080::new();
        let mut bus = TestBus::new();
        cpu.pc = 0x0040;
        cpu.sp = 0x2400;
        cpu.a = 0x11;
        bus.load(0x0040, &[op, 0x00, 0x10]);

        let before = cpu.snapshot();
        let memory_before = bus.memory.clone();

        let err = cpu.step(&mut bus).unwrap_err();
        assert_eq!(err, EmuError::UnimplementedOpcode { opcode: op, pc: 0x0040 });
        assert_eq!(cpu.snapshot(), before);
        assert!(bus.memory[..] == memory_before[..], "memory modified by 0x{op:02X}");

        // Retrying fails the same way.
        assert_eq!(cpu.step(&mut bus), Err(err));
    }
}

#[test]
fn test_undocumented_aliases_when_enabled() {
    let mut cpu = I8080::with_undocumented(true);
    let mut bus = TestBus::new();
    cpu.sp = 0x2400;
    bus.load(0, &[
        0x08, // *NOP
        0xDD, 0x00, 0x10, // *CALL 0x1000
    ]);
    bus.load(0x1000, &[0xCB, 0x00, 0x11]); // *JMP 0x1100
    bus.load(0x1100, &[0xD9]); // *RET

    assert_eq!(cpu.step(&mut bus), Ok(4));
    assert_eq!(cpu.step(&mut bus), Ok(17));
    assert_eq!(cpu.pc, 0x1000);
    assert_eq!(cpu.step(&mut bus), Ok(10));
    assert_eq!(cpu.pc, 0x1100);
    assert_eq!(cpu.step(&mut bus), Ok(10));
    assert_eq!(cpu.pc, 0x0004);
}

#[test]
fn test_fresh_cpu_state() {
    let cpu = I8080::new();
    let state = cpu.snapshot();
    assert_eq!(state.pc, 0x0000);
    assert_eq!(state.sp, 0x0000);
    assert_eq!(state.f, 0x02);
    assert!(!state.inte);
    assert!(!cpu.undocumented);
}

#[test]
fn test_snapshot_display() {
    let mut cpu = I8080::new();
    cpu.pc = 0x1A2B;
    cpu.a = 0x42;
    cpu.set_hl(0x2400);
    let text = cpu.snapshot().to_string();
    assert!(text.starts_with("PC=1A2B SP=0000 A=42 F=02"));
    assert!(text.contains("HL=2400"));
}

#[test]
fn test_bus_defaults_for_io() {
    struct NoIo;
    impl Bus for NoIo {
        fn read(&mut self, _addr: u16) -> u8 {
            0xDB // IN d8, operand also 0xDB
        }
        fn write(&mut self, _addr: u16, _data: u8) {}
    }

    let mut cpu = I8080::new();
    cpu.step(&mut NoIo).unwrap();
    assert_eq!(cpu.a, 0xFF, "unmapped ports float high");
}
