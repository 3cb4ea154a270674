/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn from_u32(rgb: u32) -> Self {
        Self {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        }
    }

    /// Packs as `0x00RRGGBB`.
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

// UI chrome indices. Everything from 7 up is a grayscale ramp.
pub const BASE: u8 = 0;
pub const BACKGROUND: u8 = 1;
pub const PANEL: u8 = 2;
pub const WINDOW: u8 = 3;
pub const WINDOW_BORDER: u8 = 4;
pub const TEXT: u8 = 5;
pub const ACCENT: u8 = 6;

const CHROME: [u32; 7] = [
    0x10151F, 0x1E2A3A, 0x21344A, 0x2B3F58, 0x6E7C91, 0xDDE6F2, 0x53E5B0,
];

/// Fixed index -> color table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; 256],
}

impl Palette {
    pub const fn new(colors: [Rgb; 256]) -> Self {
        Self { colors }
    }

    pub const fn color(&self, index: u8) -> Rgb {
        self.colors[index as usize]
    }

    const fn grayscale_with_chrome() -> Self {
        let mut colors = [Rgb { r: 0, g: 0, b: 0 }; 256];
        let mut i = 0;
        while i < colors.len() {
            colors[i] = if i < CHROME.len() {
                Rgb::from_u32(CHROME[i])
            } else {
                Rgb {
                    r: i as u8,
                    g: i as u8,
                    b: i as u8,
                }
            };
            i += 1;
        }
        Self { colors }
    }
}

pub static DEFAULT_PALETTE: Palette = Palette::grayscale_with_chrome();
