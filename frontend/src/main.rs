use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use invaders_machines::Emulator;
use invaders_machines::invaders::program_rom;
use invaders_machines::invaders::video::ColorOverlay;

mod config;
mod emulator;
mod input;
mod rom_path;
mod screenshot;
mod video;

/// Space Invaders arcade emulator.
#[derive(Parser, Debug)]
#[command(name = "invaders", version)]
pub struct Args {
    /// ROM zip, directory of ROM files, or a single 8KB program image
    pub rom_path: Option<PathBuf>,

    /// Window scale factor
    #[arg(long)]
    pub scale: Option<u32>,

    /// Config file (default: <config dir>/invaders/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Colour overlay: monochrome or cabinet-gel
    #[arg(long)]
    pub overlay: Option<ColorOverlay>,

    /// Treat writes to ROM as fatal
    #[arg(long)]
    pub strict: bool,

    /// Execute undocumented opcodes as their documented aliases
    #[arg(long)]
    pub undocumented: bool,

    /// Ships per game (3-6)
    #[arg(long)]
    pub lives: Option<u8>,

    /// Disable the watchdog reset
    #[arg(long)]
    pub no_watchdog: bool,

    /// Accept ROM chips whose CRC32 does not match
    #[arg(long)]
    pub skip_checksums: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let file = config::load(args.config.as_deref())?;
    let settings = config::Settings::resolve(&args, file)?;

    let rom_set = rom_path::load_rom_set(&settings.rom_path)?;
    let rom = program_rom(&rom_set, settings.verify_checksums)?;
    log::info!(
        "loaded {} bytes of program ROM from {}",
        rom.len(),
        settings.rom_path.display()
    );

    let mut emu = Emulator::new(&rom, settings.machine)?;
    *emu.bindings_mut() = settings.bindings;

    emulator::run(&mut emu, settings.scale)
}
