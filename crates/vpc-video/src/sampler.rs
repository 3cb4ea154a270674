use vpc_mem::Ram;

use crate::palette::{Palette, DEFAULT_PALETTE};

/// Host-facing view of a sampled display.
pub trait DisplayOutput {
    /// Current visible pixels, row-major, `0x00RRGGBB`.
    fn framebuffer(&self) -> &[u32];

    fn resolution(&self) -> (u32, u32);
}

/// Samples the VRAM window of guest RAM into a presentable pixel grid.
///
/// Keeps a snapshot of the last sampled VRAM bytes and only recolors cells that changed. The
/// pixel grid is only ever modified by [`DisplaySampler::render_frame`].
#[derive(Debug, Clone)]
pub struct DisplaySampler {
    width: usize,
    height: usize,
    vram_start: usize,
    previous: Vec<u8>,
    pixels: Vec<u32>,
    palette: &'static Palette,
}

impl DisplaySampler {
    pub fn new(width: usize, height: usize, vram_start: usize) -> Self {
        Self::with_palette(width, height, vram_start, &DEFAULT_PALETTE)
    }

    /// The snapshot starts as all zeros and the grid as palette entry 0, so an untouched
    /// (zeroed) VRAM window samples as unchanged.
    pub fn with_palette(
        width: usize,
        height: usize,
        vram_start: usize,
        palette: &'static Palette,
    ) -> Self {
        let len = width * height;
        Self {
            width,
            height,
            vram_start,
            previous: vec![0; len],
            pixels: vec![palette.color(0).to_u32(); len],
            palette,
        }
    }

    /// Diffs the VRAM window against the previous sample, recoloring changed cells.
    ///
    /// Returns whether any cell changed. Never writes `ram`. A window that does not fit in
    /// `ram` samples as unchanged.
    pub fn render_frame(&mut self, ram: &Ram) -> bool {
        let Ok(vram) = ram.read_block(self.vram_start, self.previous.len()) else {
            return false;
        };

        let mut changed = false;
        for (i, (&index, prev)) in vram.iter().zip(self.previous.iter_mut()).enumerate() {
            if *prev != index {
                *prev = index;
                self.pixels[i] = self.palette.color(index).to_u32();
                changed = true;
            }
        }
        changed
    }

    /// Current frame as tightly packed RGBA8 (alpha 0xFF), suitable for image encoders.
    pub fn framebuffer_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            rgba.push((p >> 16) as u8); // R
            rgba.push((p >> 8) as u8); // G
            rgba.push(p as u8); // B
            rgba.push(0xFF);
        }
        rgba
    }
}

impl DisplayOutput for DisplaySampler {
    fn framebuffer(&self) -> &[u32] {
        &self.pixels
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }
}
