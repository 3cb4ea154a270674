use thiserror::Error;

/// Where the VRAM window's contents come from each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoSource {
    /// The host back buffer is presented into VRAM every tick, replacing whatever the guest
    /// wrote there.
    #[default]
    Surface,
    /// The back buffer is never presented automatically; the guest owns VRAM.
    Guest,
}

/// Configuration for [`crate::Machine`]. Fixed for the machine's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    /// Guest RAM size in bytes.
    pub ram_size: usize,
    /// Address the program image is loaded at and execution (re)starts from.
    ///
    /// Must be below 64KiB since the program counter is 16 bits wide.
    pub load_address: usize,
    /// First byte of the memory-mapped video window.
    pub vram_start: usize,
    pub width: usize,
    pub height: usize,
    /// CPU step budget for each [`crate::Machine::tick`].
    pub cycles_per_tick: u64,
    pub video_source: VideoSource,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            ram_size: 64 * 1024,
            load_address: 0x0000,
            vram_start: 0x8000,
            width: 256,
            height: 128,
            cycles_per_tick: 3_000,
            video_source: VideoSource::Surface,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("RAM size must be positive")]
    ZeroRamSize,

    #[error("display resolution {width}x{height} must be non-zero")]
    ZeroResolution { width: usize, height: usize },

    #[error(
        "VRAM window 0x{vram_start:x}+{len} does not fit in {ram_size} bytes of RAM"
    )]
    VramOutOfRange {
        vram_start: usize,
        len: usize,
        ram_size: usize,
    },

    #[error("load address 0x{load_address:x} is outside RAM ({ram_size} bytes)")]
    LoadAddressOutOfRange { load_address: usize, ram_size: usize },

    #[error("load address 0x{0:x} is not reachable by a 16-bit program counter")]
    LoadAddressNotAddressable(usize),
}

impl MachineConfig {
    /// Number of bytes in the VRAM window (`width * height`), if it fits in `usize`.
    pub fn vram_len(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ram_size == 0 {
            return Err(ConfigError::ZeroRamSize);
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroResolution {
                width: self.width,
                height: self.height,
            });
        }

        let len = self.vram_len().unwrap_or(usize::MAX);
        let fits = self
            .vram_start
            .checked_add(len)
            .is_some_and(|end| end <= self.ram_size);
        if !fits {
            return Err(ConfigError::VramOutOfRange {
                vram_start: self.vram_start,
                len,
                ram_size: self.ram_size,
            });
        }

        if self.load_address > 0xFFFF {
            return Err(ConfigError::LoadAddressNotAddressable(self.load_address));
        }
        if self.load_address >= self.ram_size {
            return Err(ConfigError::LoadAddressOutOfRange {
                load_address: self.load_address,
                ram_size: self.ram_size,
            });
        }
        Ok(())
    }
}
