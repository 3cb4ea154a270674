//! Memory-mapped video for the virtual PC.
//!
//! Output path: host code paints palette indices into a [`FrameSurface`] back buffer,
//! [`FrameSurface::present`] copies it into the VRAM window of guest RAM, and a
//! [`DisplaySampler`] diffs that window once per tick into a displayable `0x00RRGGBB` grid.
//! Guest programs may also write the VRAM window directly; the sampler does not care who wrote
//! the bytes.

pub mod font;
pub mod palette;
mod sampler;
mod surface;

pub use palette::{Palette, Rgb, DEFAULT_PALETTE};
pub use sampler::{DisplayOutput, DisplaySampler};
pub use surface::{text_width, FrameSurface};
