//! Host settings: an optional TOML file, overridden by command-line flags.
//!
//! ```toml
//! rom_path = "/home/me/roms/invaders.zip"
//! scale = 3
//! overlay = "cabinet-gel"
//! strict = false
//! undocumented = false
//!
//! [dips]
//! lives = 5
//! bonus_life = 1000
//! coin_info = true
//!
//! [keys]
//! "x" = "p1-fire"
//! " " = "none"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use invaders_machines::InvadersConfig;
use invaders_machines::invaders::input::{BonusLife, KeyBindings, LogicalButton};
use invaders_machines::invaders::memory::WriteMode;
use invaders_machines::invaders::video::ColorOverlay;
use serde::Deserialize;

use crate::Args;

const DEFAULT_SCALE: u32 = 3;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Parse { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Invalid(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub rom_path: Option<PathBuf>,
    pub scale: Option<u32>,
    pub overlay: Option<String>,
    pub strict: Option<bool>,
    pub undocumented: Option<bool>,
    pub watchdog: Option<bool>,
    pub dips: DipConfig,
    /// Key name to button name; `"none"` removes a default binding.
    pub keys: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DipConfig {
    pub lives: Option<u8>,
    pub bonus_life: Option<u16>,
    pub coin_info: Option<bool>,
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("invaders").join("config.toml"))
}

/// Read the config file. A missing default file is not an error; a missing
/// explicit one is.
pub fn load(explicit: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(FileConfig::default()),
        },
    };

    let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    log::debug!("reading config from {}", path.display());
    toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
}

/// Final settings after merging file and flags.
pub struct Settings {
    pub rom_path: PathBuf,
    pub scale: u32,
    pub verify_checksums: bool,
    pub machine: InvadersConfig,
    pub bindings: KeyBindings,
}

impl Settings {
    pub fn resolve(args: &Args, file: FileConfig) -> Result<Self, ConfigError> {
        let rom_path = args
            .rom_path
            .clone()
            .or(file.rom_path)
            .ok_or_else(|| ConfigError::Invalid("no ROM path given".to_string()))?;

        let scale = args.scale.or(file.scale).unwrap_or(DEFAULT_SCALE);
        if scale == 0 {
            return Err(ConfigError::Invalid("scale must be at least 1".to_string()));
        }

        let mut machine = InvadersConfig::default();

        machine.overlay = match (args.overlay, file.overlay) {
            (Some(overlay), _) => overlay,
            (None, Some(name)) => name.parse::<ColorOverlay>().map_err(ConfigError::Invalid)?,
            (None, None) => ColorOverlay::default(),
        };

        if args.strict || file.strict.unwrap_or(false) {
            machine.write_mode = WriteMode::Strict;
        }
        machine.undocumented_opcodes = args.undocumented || file.undocumented.unwrap_or(false);
        machine.watchdog = !args.no_watchdog && file.watchdog.unwrap_or(true);

        if let Some(lives) = args.lives.or(file.dips.lives) {
            if !(3..=6).contains(&lives) {
                return Err(ConfigError::Invalid(format!(
                    "lives must be 3 to 6, got {lives}"
                )));
            }
            machine.dips.lives = lives;
        }
        if let Some(bonus) = file.dips.bonus_life {
            machine.dips.bonus_life = match bonus {
                1000 => BonusLife::At1000,
                1500 => BonusLife::At1500,
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "bonus_life must be 1000 or 1500, got {other}"
                    )));
                }
            };
        }
        if let Some(coin_info) = file.dips.coin_info {
            machine.dips.coin_info = coin_info;
        }

        let mut bindings = KeyBindings::default();
        for (key, target) in &file.keys {
            if target.eq_ignore_ascii_case("none") {
                bindings.unbind(key);
                continue;
            }
            let button = target
                .parse::<LogicalButton>()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
            bindings.bind(key, button);
        }

        Ok(Self {
            rom_path,
            scale,
            verify_checksums: !args.skip_checksums,
            machine,
            bindings,
        })
    }
}
