use invaders_machines::invaders::video::{FrameBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
use sdl2::pixels::{Color, PixelFormatEnum};
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};

/// Bytes per pixel of the packed RGB24 frame.
const BYTES_PER_PIXEL: usize = 3;

/// Window dimensions for a portrait cabinet screen at `scale`.
pub fn window_size(scale: u32) -> (u32, u32) {
    (SCREEN_WIDTH as u32 * scale, SCREEN_HEIGHT as u32 * scale)
}

/// Resizable window that letterboxes the cabinet screen at integer scale.
pub struct Video {
    canvas: Canvas<Window>,
    textures: TextureCreator<WindowContext>,
}

impl Video {
    pub fn new(sdl_video: &sdl2::VideoSubsystem, title: &str, scale: u32) -> Result<Self, String> {
        let (width, height) = window_size(scale);
        let window = sdl_video
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let mut canvas = window
            .into_canvas()
            .accelerated()
            .present_vsync()
            .build()
            .map_err(|e| e.to_string())?;
        canvas
            .set_logical_size(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32)
            .map_err(|e| e.to_string())?;
        canvas.set_integer_scale(true)?;
        canvas.set_draw_color(Color::BLACK);

        let textures = canvas.texture_creator();
        Ok(Self { canvas, textures })
    }

    /// Show `frame`, stretched over the logical screen.
    pub fn present(&mut self, frame: &FrameBuffer) -> Result<(), String> {
        let (width, height) = (frame.width() as u32, frame.height() as u32);
        let mut texture = self
            .textures
            .create_texture_streaming(PixelFormatEnum::RGB24, width, height)
            .map_err(|e| e.to_string())?;
        texture
            .update(None, frame.pixels(), frame.width() * BYTES_PER_PIXEL)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas.copy(&texture, None, None)?;
        self.canvas.present();
        Ok(())
    }
}
