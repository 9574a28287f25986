use sdl2::keyboard::Scancode;

/// SDL scancodes and the browser-style key names the emulator binds to.
#[rustfmt::skip]
const KEY_NAMES: &[(Scancode, &str)] = &[
    (Scancode::A, "A"), (Scancode::B, "B"), (Scancode::C, "C"), (Scancode::D, "D"),
    (Scancode::E, "E"), (Scancode::F, "F"), (Scancode::G, "G"), (Scancode::H, "H"),
    (Scancode::I, "I"), (Scancode::J, "J"), (Scancode::K, "K"), (Scancode::L, "L"),
    (Scancode::M, "M"), (Scancode::N, "N"), (Scancode::O, "O"), (Scancode::P, "P"),
    (Scancode::Q, "Q"), (Scancode::R, "R"), (Scancode::S, "S"), (Scancode::T, "T"),
    (Scancode::U, "U"), (Scancode::V, "V"), (Scancode::W, "W"), (Scancode::X, "X"),
    (Scancode::Y, "Y"), (Scancode::Z, "Z"),
    (Scancode::Num0, "0"), (Scancode::Num1, "1"), (Scancode::Num2, "2"),
    (Scancode::Num3, "3"), (Scancode::Num4, "4"), (Scancode::Num5, "5"),
    (Scancode::Num6, "6"), (Scancode::Num7, "7"), (Scancode::Num8, "8"),
    (Scancode::Num9, "9"),
    (Scancode::Left, "ArrowLeft"), (Scancode::Right, "ArrowRight"),
    (Scancode::Up, "ArrowUp"), (Scancode::Down, "ArrowDown"),
    (Scancode::Space, " "), (Scancode::Return, "Enter"), (Scancode::Tab, "Tab"),
    (Scancode::LCtrl, "Control"), (Scancode::RCtrl, "Control"),
    (Scancode::LShift, "Shift"), (Scancode::RShift, "Shift"),
    (Scancode::LAlt, "Alt"), (Scancode::RAlt, "Alt"),
];

/// Browser `KeyboardEvent.key` name for a scancode, if it has one.
pub fn key_name(scancode: Scancode) -> Option<&'static str> {
    KEY_NAMES
        .iter()
        .find(|(sc, _)| *sc == scancode)
        .map(|&(_, name)| name)
}
