use invaders_core::core::machine::Machine;
use invaders_core::error::EmuError;
use invaders_machines::invaders::input::LogicalButton;
use invaders_machines::invaders::memory::WriteMode;
use invaders_machines::invaders::timing::CYCLES_PER_FRAME;
use invaders_machines::invaders::video::ColorOverlay;
use invaders_machines::{Emulator, InvadersConfig, InvadersSystem};
mod common;
use common::*;

fn emulator(program: &[u8]) -> Emulator {
    Emulator::new(program, InvadersConfig::default()).unwrap()
}

// =================================================================
// Machine Trait Tests
// =================================================================

#[test]
fn test_display_size() {
    let sys = InvadersSystem::new(&[], InvadersConfig::default()).unwrap();
    assert_eq!(sys.display_size(), (224, 256));
    assert_eq!(sys.frame_rate_hz(), 60.0);
}

#[test]
fn test_input_map_has_all_buttons() {
    let sys = InvadersSystem::new(&[], InvadersConfig::default()).unwrap();
    let map = sys.input_map();
    assert_eq!(map.len(), 9);
    for button in map {
        assert!(!button.name.is_empty());
        assert!(LogicalButton::from_id(button.id).is_some());
    }
}

#[test]
fn test_set_input_by_id() {
    let mut sys = InvadersSystem::new(&port_mirror_program(), InvadersConfig::default()).unwrap();
    sys.set_input(LogicalButton::P2Right.id(), true);
    sys.set_input(200, true); // unknown id ignored
    sys.run_frame().unwrap();
    assert_eq!(sys.board().memory.read(0x2001), 0x40);
}

#[test]
fn test_frame_runs_fixed_cycle_budget() {
    let mut sys = InvadersSystem::new(&interrupt_counter_program(), InvadersConfig::default()).unwrap();
    sys.run_frame().unwrap();
    assert_eq!(sys.total_cycles(), CYCLES_PER_FRAME as u64 + sys.cycle_debt());
    assert!(sys.cycle_debt() <= MAX_DEBT);
}

// =================================================================
// Emulator Façade Tests
// =================================================================

#[test]
fn test_initialize_sets_reset_vector() {
    let mut emu = emulator(&interrupt_counter_program());
    assert_eq!(emu.cpu_state().pc, 0x0000);

    for _ in 0..3 {
        emu.render_next_frame().unwrap();
    }
    assert_ne!(emu.cpu_state().pc, 0x0000);

    emu.initialize();
    let state = emu.cpu_state();
    assert_eq!(state.pc, 0x0000);
    assert!(!state.inte);
    assert_eq!(emu.total_cycles(), 0);
    assert_eq!(emu.system().board().memory.read(0x2000), 0);
}

#[test]
fn test_interrupts_fire_twice_per_frame() {
    let mut emu = emulator(&interrupt_counter_program());
    for _ in 0..10 {
        emu.render_next_frame().unwrap();
    }
    let mem = &emu.system().board().memory;
    assert_eq!(mem.read(0x2000), 10, "RST 1 count");
    assert_eq!(mem.read(0x2001), 10, "RST 2 count");
}

#[test]
fn test_halted_cpu_woken_by_interrupts() {
    let mut emu = emulator(&halting_counter_program());
    for _ in 0..5 {
        emu.render_next_frame().unwrap();
    }
    let mem = &emu.system().board().memory;
    assert_eq!(mem.read(0x2000), 5);
    assert_eq!(mem.read(0x2001), 5);
    assert_eq!(emu.total_cycles(), 5 * CYCLES_PER_FRAME as u64 + emu.cycle_debt());
}

#[test]
fn test_key_events_reach_ports() {
    let mut emu = emulator(&port_mirror_program());

    emu.on_key_down("c");
    emu.on_key_down("ArrowLeft");
    emu.on_key_down("s");
    emu.render_next_frame().unwrap();
    let mem = &emu.system().board().memory;
    assert_eq!(mem.read(0x2000), 0x08 | 0x01 | 0x20);
    assert_eq!(mem.read(0x2001), 0x10);

    emu.on_key_up("C");
    emu.on_key_up("ARROWLEFT");
    emu.on_key_up("S");
    emu.render_next_frame().unwrap();
    let mem = &emu.system().board().memory;
    assert_eq!(mem.read(0x2000), 0x08);
    assert_eq!(mem.read(0x2001), 0x00);
}

#[test]
fn test_unbound_keys_are_ignored() {
    let mut emu = emulator(&port_mirror_program());
    emu.on_key_down("Escape");
    emu.on_key_down("F1");
    emu.on_key_up("q");
    emu.render_next_frame().unwrap();
    assert_eq!(emu.system().board().memory.read(0x2000), 0x08);
}

#[test]
fn test_rebound_key() {
    let mut emu = emulator(&port_mirror_program());
    emu.bindings_mut().bind("Enter", LogicalButton::P1Start);
    emu.on_key_down("Enter");
    emu.render_next_frame().unwrap();
    assert_eq!(emu.system().board().memory.read(0x2000), 0x0C);
}

#[test]
fn test_shift_register_program() {
    let program = [
        0x3E, 0xF0, 0xD3, 0x04, // MVI A,0xF0; OUT 4
        0x3E, 0x0F, 0xD3, 0x04, // MVI A,0x0F; OUT 4
        0x3E, 0x04, 0xD3, 0x02, // MVI A,4; OUT 2
        0xDB, 0x03, // IN 3
        0x32, 0x00, 0x20, // STA 0x2000
        0x76, // HLT
    ];
    let mut emu = emulator(&program);
    emu.render_next_frame().unwrap();
    assert_eq!(emu.system().board().memory.read(0x2000), 0xFF);
}

#[test]
fn test_frame_shows_vram() {
    let program = [
        0x3E, 0x01, // MVI A,1
        0x32, 0x00, 0x24, // STA 0x2400
        0x3E, 0x80, // MVI A,0x80
        0x32, 0xFF, 0x3F, // STA 0x3FFF
        0x76, // HLT
    ];
    let mut emu = emulator(&program);
    let frame = emu.render_next_frame().unwrap();
    assert_eq!(frame.pixel(0, 255), [0xFF, 0xFF, 0xFF]);
    assert_eq!(frame.pixel(223, 0), [0xFF, 0xFF, 0xFF]);
    assert_eq!(frame.pixel(1, 255), [0x00, 0x00, 0x00]);
    let lit = frame.pixels().chunks(3).filter(|p| p.iter().any(|&b| b != 0)).count();
    assert_eq!(lit, 2);
}

#[test]
fn test_overlay_colours_frame() {
    // Native row 100: byte 20 bit 0 (nx = 160) shows at (100, 95), outside
    // the bands; byte 26 bit 0 (nx = 208) shows at (100, 47), in the red band.
    let program = [
        0x3E, 0x01, // MVI A,1
        0x32, 0x94, 0x30, // STA 0x3094
        0x32, 0x9A, 0x30, // STA 0x309A
        0x76, // HLT
    ];
    let mut emu = emulator(&program);
    let frame = emu.render_next_frame().unwrap().clone();
    assert_eq!(frame.pixel(100, 95), [0xFF, 0xFF, 0xFF]);
    assert_eq!(frame.pixel(100, 47), [0xFF, 0x20, 0x20]);

    emu.system_mut().set_overlay(ColorOverlay::Monochrome);
    emu.initialize();
    let frame = emu.render_next_frame().unwrap();
    assert_eq!(frame.pixel(100, 47), [0xFF, 0xFF, 0xFF]);
}

#[test]
fn test_unimplemented_opcode_latches_fault() {
    let program = [0x00, 0x00, 0x00, 0xED];
    let mut emu = emulator(&program);

    let expected = EmuError::UnimplementedOpcode { opcode: 0xED, pc: 0x0003 };
    assert_eq!(emu.render_next_frame().err(), Some(expected));
    assert_eq!(emu.cpu_state().pc, 0x0003, "CPU stopped at the bad opcode");
    let cycles = emu.total_cycles();
    assert_eq!(cycles, 12);

    assert_eq!(emu.render_next_frame().err(), Some(expected));
    assert_eq!(emu.total_cycles(), cycles, "latched fault runs nothing");
    assert_eq!(emu.fault(), Some(expected));

    emu.initialize();
    assert_eq!(emu.fault(), None);
    assert_eq!(emu.render_next_frame().err(), Some(expected));
}

#[test]
fn test_undocumented_opcodes_option() {
    let program = [0x00, 0x00, 0x00, 0xED, 0x00, 0x01, 0x76];
    let config = InvadersConfig {
        undocumented_opcodes: true,
        ..InvadersConfig::default()
    };
    let mut emu = Emulator::new(&program, config).unwrap();
    assert!(emu.render_next_frame().is_ok());
    // *CALL 0x0100 lands on zeroed ROM (NOPs)
    assert!(emu.fault().is_none());
}

#[test]
fn test_strict_mode_reports_rom_write() {
    let program = [
        0x3E, 0x5A, // MVI A,0x5A
        0x32, 0x00, 0x01, // STA 0x0100
        0x76, // HLT
    ];
    let strict = InvadersConfig {
        write_mode: WriteMode::Strict,
        ..InvadersConfig::default()
    };
    let mut emu = Emulator::new(&program, strict).unwrap();
    assert_eq!(
        emu.render_next_frame().err(),
        Some(EmuError::InvalidWrite { address: 0x0100, value: 0x5A })
    );
    assert_eq!(emu.system().board().memory.read(0x0100), 0x00);

    // Not latched: the next call finishes the frame.
    assert_eq!(emu.fault(), None);
    assert!(emu.render_next_frame().is_ok());
    assert_eq!(emu.system().frame_count(), 1);
    assert_eq!(emu.system().board().memory.read(0x0100), 0x00);

    let mut lenient = emulator(&program);
    assert!(lenient.render_next_frame().is_ok());
    assert_eq!(lenient.system().board().memory.read(0x0100), 0x00);
}

/// Main loop that stores into ROM forever while the counters run.
fn rom_writing_counter_program() -> Vec<u8> {
    let mut rom = interrupt_counter_program();
    rom[4..7].copy_from_slice(&[0xC3, 0x18, 0x00]); // JMP 0x0018
    rom[0x18..0x1E].copy_from_slice(&[
        0x32, 0x00, 0x01, // STA 0x0100
        0xC3, 0x18, 0x00, // JMP 0x0018
    ]);
    rom
}

fn run_frames(sys: &mut InvadersSystem, frames: usize) -> usize {
    let mut violations = 0;
    for _ in 0..frames {
        while sys.run_frame().is_err() {
            violations += 1;
        }
    }
    violations
}

#[test]
fn test_strict_mode_keeps_interrupt_schedule() {
    let program = rom_writing_counter_program();
    let strict = InvadersConfig {
        write_mode: WriteMode::Strict,
        ..InvadersConfig::default()
    };
    let mut checked = InvadersSystem::new(&program, strict).unwrap();
    let mut plain = InvadersSystem::new(&program, InvadersConfig::default()).unwrap();

    assert!(run_frames(&mut checked, 4) > 0);
    assert_eq!(run_frames(&mut plain, 4), 0);

    let counters = |sys: &InvadersSystem| {
        let memory = &sys.board().memory;
        (memory.read(0x2000), memory.read(0x2001))
    };
    assert_eq!(counters(&plain).0, 4);
    assert_eq!(counters(&checked), counters(&plain));
    assert_eq!(checked.total_cycles(), plain.total_cycles());
    assert_eq!(checked.frame_count(), plain.frame_count());
}

#[test]
fn test_strict_mode_reports_acknowledge_push_into_rom() {
    // The stack sits in ROM, so the RST 1 return address push is refused.
    let program = [
        0x31, 0x00, 0x01, // LXI SP,0x0100
        0xFB, // EI
        0xC3, 0x04, 0x00, // JMP 0x0004
    ];
    let strict = InvadersConfig {
        write_mode: WriteMode::Strict,
        ..InvadersConfig::default()
    };
    let mut sys = InvadersSystem::new(&program, strict).unwrap();
    assert_eq!(
        sys.run_frame(),
        Err(EmuError::InvalidWrite { address: 0x00FF, value: 0x00 })
    );
    // The interrupt was taken before the error surfaced.
    assert_eq!(sys.cpu().pc, 0x0008);
    assert!(sys.total_cycles() >= CYCLES_PER_FRAME as u64 / 2);
}

#[test]
fn test_oversized_rom_rejected() {
    let rom = vec![0u8; 0x2001];
    assert!(Emulator::new(&rom, InvadersConfig::default()).is_err());
}
