use std::error::Error;

use invaders_core::error::EmuError;
use invaders_machines::Emulator;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Scancode;

use crate::input::key_name;
use crate::screenshot;
use crate::video::Video;

/// Drive `emu` until the window closes. Frame pacing comes from VSync.
pub fn run(emu: &mut Emulator, scale: u32) -> Result<(), Box<dyn Error>> {
    let sdl_context = sdl2::init()?;
    let sdl_video = sdl_context.video()?;

    let mut video = Video::new(&sdl_video, "Space Invaders", scale)?;
    let mut event_pump = sdl_context.event_pump()?;
    let mut want_screenshot = false;

    'main: loop {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => break 'main,

                Event::KeyDown {
                    scancode: Some(Scancode::Escape),
                    ..
                } => break 'main,

                Event::KeyDown {
                    scancode: Some(Scancode::F12),
                    repeat: false,
                    ..
                } => want_screenshot = true,

                Event::KeyDown {
                    scancode: Some(sc),
                    repeat: false,
                    ..
                } => {
                    if let Some(name) = key_name(sc) {
                        emu.on_key_down(name);
                    }
                }

                Event::KeyUp {
                    scancode: Some(sc), ..
                } => {
                    if let Some(name) = key_name(sc) {
                        emu.on_key_up(name);
                    }
                }

                // Key-up events are lost while unfocused
                Event::Window {
                    win_event: WindowEvent::FocusLost,
                    ..
                } => emu.system_mut().board_mut().input.release_all(),

                _ => {}
            }
        }

        let frame = match emu.render_next_frame() {
            Ok(frame) => frame,
            // Strict-mode write violations are logged by the emulator; the
            // next call finishes the frame.
            Err(EmuError::InvalidWrite { .. }) => continue,
            Err(fault) => return Err(fault.into()),
        };
        video.present(frame)?;

        if want_screenshot {
            want_screenshot = false;
            let path = screenshot::next_path();
            match screenshot::save_png(&path, frame) {
                Ok(()) => log::info!("saved screenshot {}", path.display()),
                Err(e) => log::warn!("screenshot {} failed: {e}", path.display()),
            }
        }
    }

    log::info!("exiting after {} cycles", emu.total_cycles());
    Ok(())
}
