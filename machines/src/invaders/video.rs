//! Bitmap video decode.
//!
//! Video RAM holds 224 rows of 256 pixels at one bit per pixel, 32 bytes per
//! row, least significant bit leftmost. The monitor is mounted rotated 90°
//! counter-clockwise, so native pixel (nx, ny) is displayed at
//! (ny, 255 - nx) on a 224 × 256 portrait screen.
//!
//! The cabinet has no colour hardware; colour comes from strips of
//! cellophane on the glass. [`ColorOverlay::CabinetGel`] reproduces them.

use std::fmt;
use std::str::FromStr;

use super::memory::VRAM_SIZE;

pub const SCREEN_WIDTH: usize = 224;
pub const SCREEN_HEIGHT: usize = 256;
const NATIVE_ROW_BYTES: usize = 32;

pub type Rgb = [u8; 3];

const BLACK: Rgb = [0x00, 0x00, 0x00];
const WHITE: Rgb = [0xFF, 0xFF, 0xFF];
const RED: Rgb = [0xFF, 0x20, 0x20];
const GREEN: Rgb = [0x20, 0xFF, 0x20];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorOverlay {
    Monochrome,
    #[default]
    CabinetGel,
}

impl ColorOverlay {
    /// Colour of a lit pixel at display position (x, y).
    pub fn color_at(self, x: usize, y: usize) -> Rgb {
        match self {
            Self::Monochrome => WHITE,
            Self::CabinetGel => match y {
                32..=63 => RED,
                184..=239 => GREEN,
                240..=255 if (16..=133).contains(&x) => GREEN,
                _ => WHITE,
            },
        }
    }
}

impl fmt::Display for ColorOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Monochrome => "monochrome",
            Self::CabinetGel => "cabinet-gel",
        })
    }
}

impl FromStr for ColorOverlay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monochrome" | "mono" => Ok(Self::Monochrome),
            "cabinet-gel" | "gel" | "color" => Ok(Self::CabinetGel),
            other => Err(format!(
                "unknown overlay '{other}' (expected monochrome or cabinet-gel)"
            )),
        }
    }
}

/// A displayed frame: RGB24, row-major, top-left origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Vec<u8>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT * 3],
        }
    }

    pub fn width(&self) -> usize {
        SCREEN_WIDTH
    }

    pub fn height(&self) -> usize {
        SCREEN_HEIGHT
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        let i = (y * SCREEN_WIDTH + x) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VideoRenderer {
    overlay: ColorOverlay,
}

impl VideoRenderer {
    pub fn new(overlay: ColorOverlay) -> Self {
        Self { overlay }
    }

    pub fn overlay(&self) -> ColorOverlay {
        self.overlay
    }

    pub fn set_overlay(&mut self, overlay: ColorOverlay) {
        self.overlay = overlay;
    }

    pub fn render(&self, vram: &[u8]) -> FrameBuffer {
        let mut frame = FrameBuffer::new();
        self.render_into(vram, &mut frame);
        frame
    }

    pub fn render_into(&self, vram: &[u8], frame: &mut FrameBuffer) {
        self.render_rgb24(vram, &mut frame.pixels);
    }

    /// Decode `vram` into a raw RGB24 buffer of at least 224 × 256 × 3 bytes.
    /// Missing VRAM bytes (short slices) decode as dark pixels.
    pub fn render_rgb24(&self, vram: &[u8], out: &mut [u8]) {
        debug_assert!(out.len() >= SCREEN_WIDTH * SCREEN_HEIGHT * 3);
        let vram = &vram[..vram.len().min(VRAM_SIZE)];

        for x in 0..SCREEN_WIDTH {
            let row = vram
                .get(x * NATIVE_ROW_BYTES..(x + 1) * NATIVE_ROW_BYTES)
                .unwrap_or(&[]);
            for y in 0..SCREEN_HEIGHT {
                let nx = SCREEN_HEIGHT - 1 - y;
                let lit = row
                    .get(nx / 8)
                    .is_some_and(|&byte| byte & (1 << (nx % 8)) != 0);
                let color = if lit { self.overlay.color_at(x, y) } else { BLACK };
                let i = (y * SCREEN_WIDTH + x) * 3;
                out[i..i + 3].copy_from_slice(&color);
            }
        }
    }
}
