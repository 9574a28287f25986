//! Player controls, DIP switches and host key bindings.
//!
//! ```text
//! IN 0   0x0E (unused on this board, bits 1-3 pulled high)
//! IN 1   bit 0 coin, 1 P2 start, 2 P1 start, 3 always 1,
//!        bit 4 P1 fire, 5 P1 left, 6 P1 right
//! IN 2   bits 0-1 lives, 2 tilt, 3 bonus life, 4 P2 fire,
//!        5 P2 left, 6 P2 right, 7 coin info
//! ```
//!
//! All control bits are active-high.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use invaders_core::core::machine::InputButton;

pub const PORT0_IMAGE: u8 = 0x0E;
const PORT1_ALWAYS_SET: u8 = 0x08;

/// A cabinet control, independent of any host key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalButton {
    Coin,
    P1Start,
    P2Start,
    P1Left,
    P1Right,
    P1Fire,
    P2Left,
    P2Right,
    P2Fire,
}

impl LogicalButton {
    pub const ALL: [LogicalButton; 9] = [
        Self::Coin,
        Self::P1Start,
        Self::P2Start,
        Self::P1Left,
        Self::P1Right,
        Self::P1Fire,
        Self::P2Left,
        Self::P2Right,
        Self::P2Fire,
    ];

    /// Input port and bit this control drives.
    pub fn port_bit(self) -> (u8, u8) {
        match self {
            Self::Coin => (1, 0),
            Self::P2Start => (1, 1),
            Self::P1Start => (1, 2),
            Self::P1Fire => (1, 4),
            Self::P1Left => (1, 5),
            Self::P1Right => (1, 6),
            Self::P2Fire => (2, 4),
            Self::P2Left => (2, 5),
            Self::P2Right => (2, 6),
        }
    }

    /// Stable numeric id used through [`Machine::set_input`](invaders_core::core::machine::Machine::set_input).
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Coin => "coin",
            Self::P1Start => "p1-start",
            Self::P2Start => "p2-start",
            Self::P1Left => "p1-left",
            Self::P1Right => "p1-right",
            Self::P1Fire => "p1-fire",
            Self::P2Left => "p2-left",
            Self::P2Right => "p2-right",
            Self::P2Fire => "p2-fire",
        }
    }
}

impl fmt::Display for LogicalButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseButtonError(pub String);

impl fmt::Display for ParseButtonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown button '{}'", self.0)
    }
}

impl std::error::Error for ParseButtonError {}

impl FromStr for LogicalButton {
    type Err = ParseButtonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseButtonError(s.to_string()))
    }
}

pub const INVADERS_INPUT_MAP: &[InputButton] = &[
    InputButton { id: LogicalButton::Coin as u8, name: "Coin" },
    InputButton { id: LogicalButton::P1Start as u8, name: "P1 Start" },
    InputButton { id: LogicalButton::P2Start as u8, name: "P2 Start" },
    InputButton { id: LogicalButton::P1Left as u8, name: "P1 Left" },
    InputButton { id: LogicalButton::P1Right as u8, name: "P1 Right" },
    InputButton { id: LogicalButton::P1Fire as u8, name: "P1 Fire" },
    InputButton { id: LogicalButton::P2Left as u8, name: "P2 Left" },
    InputButton { id: LogicalButton::P2Right as u8, name: "P2 Right" },
    InputButton { id: LogicalButton::P2Fire as u8, name: "P2 Fire" },
];

/// Bonus life threshold (DIP switch on port 2 bit 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BonusLife {
    At1000,
    #[default]
    At1500,
}

/// Cabinet DIP switch settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dips {
    /// Ships per game, 3 to 6.
    pub lives: u8,
    pub bonus_life: BonusLife,
    /// Show the coin info line on the attract screen.
    pub coin_info: bool,
}

impl Default for Dips {
    fn default() -> Self {
        Self {
            lives: 3,
            bonus_life: BonusLife::default(),
            coin_info: true,
        }
    }
}

impl Dips {
    /// Port 2 bits owned by the switches. Out-of-range lives are clamped.
    pub fn port2_bits(&self) -> u8 {
        let lives = self.lives.clamp(3, 6) - 3;
        let bonus = match self.bonus_life {
            BonusLife::At1000 => 0x08,
            BonusLife::At1500 => 0x00,
        };
        let coin_info = if self.coin_info { 0x00 } else { 0x80 };
        lives | bonus | coin_info
    }
}

/// Latched state of the input ports.
#[derive(Debug, Clone, Default)]
pub struct InputLatch {
    port1: u8,
    port2: u8,
    dips: Dips,
}

impl InputLatch {
    pub fn new(dips: Dips) -> Self {
        Self {
            port1: 0,
            port2: 0,
            dips,
        }
    }

    /// Press or release a control. Takes effect on the next port read.
    pub fn set_pressed(&mut self, button: LogicalButton, pressed: bool) {
        let (port, bit) = button.port_bit();
        let reg = match port {
            1 => &mut self.port1,
            _ => &mut self.port2,
        };
        set_bit_active_high(reg, bit, pressed);
    }

    pub fn is_pressed(&self, button: LogicalButton) -> bool {
        let (port, bit) = button.port_bit();
        let reg = if port == 1 { self.port1 } else { self.port2 };
        reg & (1 << bit) != 0
    }

    pub fn port0(&self) -> u8 {
        PORT0_IMAGE
    }

    pub fn port1(&self) -> u8 {
        self.port1 | PORT1_ALWAYS_SET
    }

    pub fn port2(&self) -> u8 {
        self.port2 | self.dips.port2_bits()
    }

    pub fn dips(&self) -> Dips {
        self.dips
    }

    pub fn set_dips(&mut self, dips: Dips) {
        self.dips = dips;
    }

    /// Release every control. DIP switches are kept.
    pub fn release_all(&mut self) {
        self.port1 = 0;
        self.port2 = 0;
    }
}

fn set_bit_active_high(reg: &mut u8, bit: u8, pressed: bool) {
    if pressed {
        *reg |= 1 << bit;
    } else {
        *reg &= !(1 << bit);
    }
}

/// Host key name to control mapping.
///
/// Key names follow the browser `KeyboardEvent.key` convention
/// (`"ArrowLeft"`, `" "`, `"c"`) and are matched case-insensitively.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<String, LogicalButton>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self::empty();
        for (key, button) in [
            ("C", LogicalButton::Coin),
            ("1", LogicalButton::P1Start),
            ("2", LogicalButton::P2Start),
            ("ArrowLeft", LogicalButton::P1Left),
            ("ArrowRight", LogicalButton::P1Right),
            (" ", LogicalButton::P1Fire),
            ("A", LogicalButton::P2Left),
            ("D", LogicalButton::P2Right),
            ("S", LogicalButton::P2Fire),
        ] {
            bindings.bind(key, button);
        }
        bindings
    }
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    fn normalize(key: &str) -> String {
        key.to_uppercase()
    }

    /// Bind `key` to `button`, replacing any previous binding of that key.
    pub fn bind(&mut self, key: &str, button: LogicalButton) {
        self.map.insert(Self::normalize(key), button);
    }

    pub fn unbind(&mut self, key: &str) -> Option<LogicalButton> {
        self.map.remove(&Self::normalize(key))
    }

    pub fn lookup(&self, key: &str) -> Option<LogicalButton> {
        self.map.get(&Self::normalize(key)).copied()
    }

    /// Keys bound to `button`, in no particular order.
    pub fn keys_for(&self, button: LogicalButton) -> Vec<&str> {
        self.map
            .iter()
            .filter(|&(_, &b)| b == button)
            .map(|(k, _)| k.as_str())
            .collect()
    }
}
