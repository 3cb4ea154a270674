use vpc_mem::{MemoryError, Ram};

use crate::font::{self, ADVANCE, GLYPH_WIDTH};

/// Width in pixels of `text` when drawn with [`FrameSurface::draw_text`].
pub fn text_width(text: &str) -> usize {
    text.chars().count() * ADVANCE
}

/// Off-screen indexed-color back buffer.
///
/// Drawing never fails: every primitive clips to `[0, width) x [0, height)` and drops whatever
/// falls outside. Nothing reaches guest RAM until [`FrameSurface::present`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSurface {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl FrameSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major pixels, origin top-left.
    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<u8> {
        self.index_of(x.into(), y.into()).map(|i| self.pixels[i])
    }

    pub fn clear(&mut self, index: u8) {
        self.pixels.fill(index);
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, index: u8) {
        if let Some(i) = self.index_of(x.into(), y.into()) {
            self.pixels[i] = index;
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, index: u8) {
        self.fill_clipped(x.into(), y.into(), w.into(), h.into(), index);
    }

    /// One-pixel outline of the rectangle.
    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, index: u8) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (x, y, w, h) = (i64::from(x), i64::from(y), i64::from(w), i64::from(h));
        self.fill_clipped(x, y, w, 1, index);
        self.fill_clipped(x, y + h - 1, w, 1, index);
        self.fill_clipped(x, y, 1, h, index);
        self.fill_clipped(x + w - 1, y, 1, h, index);
    }

    /// Draws `text` with the 5x7 font, advancing 6 pixels per character. No wrapping.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, index: u8) {
        let (mut pen_x, y) = (i64::from(x), i64::from(y));
        for ch in text.chars() {
            for (row, bits) in font::glyph(ch).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                        self.plot(pen_x + col as i64, y + row as i64, index);
                    }
                }
            }
            pen_x += ADVANCE as i64;
        }
    }

    /// Copies the whole back buffer into `ram` at `vram_start`.
    ///
    /// Uses the bulk-write contract, so a VRAM window that does not fit leaves RAM untouched.
    pub fn present(&self, ram: &mut Ram, vram_start: usize) -> Result<(), MemoryError> {
        ram.write_block(vram_start, &self.pixels)
    }

    fn index_of(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    fn plot(&mut self, x: i64, y: i64, index: u8) {
        if let Some(i) = self.index_of(x, y) {
            self.pixels[i] = index;
        }
    }

    fn fill_clipped(&mut self, x: i64, y: i64, w: i64, h: i64, index: u8) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i64);
        let y1 = (y + h).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for py in y0 as usize..y1 as usize {
            let row = py * self.width;
            self.pixels[row + x0 as usize..row + x1 as usize].fill(index);
        }
    }
}
