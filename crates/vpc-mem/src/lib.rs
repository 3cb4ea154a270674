//! Flat, bounds-checked guest RAM.
//!
//! Every access validates its address (or address range) against `[0, size)`. Nothing wraps at
//! this layer: program-counter wraparound is a CPU policy and is applied before addresses reach
//! [`Ram`].

mod inspect;

#[cfg(all(test, not(target_arch = "wasm32")))]
mod proptests;

pub use inspect::dump_lines;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MemoryError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// A single-byte access outside `[0, size)`.
    #[error("RAM address out of bounds: addr=0x{addr:x} size=0x{size:x}")]
    AddressOutOfRange { addr: usize, size: usize },

    /// A bulk access whose range does not fit in RAM.
    #[error("data block exceeds RAM boundaries: start=0x{start:x} len={len} size=0x{size:x}")]
    BlockOverflow { start: usize, len: usize, size: usize },

    #[error("RAM size must be positive")]
    InvalidSize,
}

/// Guest RAM: an owned, fixed-length array of bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ram {
    cells: Vec<u8>,
}

impl Ram {
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(MemoryError::InvalidSize);
        }
        Ok(Self {
            cells: vec![0u8; size],
        })
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Read-only view of the whole address space.
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }

    pub fn read_u8(&self, addr: usize) -> Result<u8> {
        self.check_addr(addr)?;
        Ok(self.cells[addr])
    }

    pub fn write_u8(&mut self, addr: usize, value: u8) -> Result<()> {
        self.check_addr(addr)?;
        self.cells[addr] = value;
        Ok(())
    }

    /// Reads a big-endian 16-bit word (`addr` holds the high byte).
    ///
    /// Fails exactly as the two underlying byte reads would.
    pub fn read_u16_be(&self, addr: usize) -> Result<u16> {
        let hi = self.read_u8(addr)?;
        let lo_addr = addr.checked_add(1).ok_or(MemoryError::AddressOutOfRange {
            addr,
            size: self.size(),
        })?;
        let lo = self.read_u8(lo_addr)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    /// Copies `data` into RAM starting at `start`.
    ///
    /// The range is validated before any byte is written, so a rejected block leaves RAM
    /// untouched.
    pub fn write_block(&mut self, start: usize, data: &[u8]) -> Result<()> {
        self.check_block(start, data.len())?;
        self.cells[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    pub fn read_block(&self, start: usize, len: usize) -> Result<&[u8]> {
        self.check_block(start, len)?;
        Ok(&self.cells[start..start + len])
    }

    fn check_addr(&self, addr: usize) -> Result<()> {
        if addr >= self.cells.len() {
            return Err(MemoryError::AddressOutOfRange {
                addr,
                size: self.cells.len(),
            });
        }
        Ok(())
    }

    fn check_block(&self, start: usize, len: usize) -> Result<()> {
        let size = self.cells.len();
        let end = start
            .checked_add(len)
            .ok_or(MemoryError::BlockOverflow { start, len, size })?;
        if end > size {
            return Err(MemoryError::BlockOverflow { start, len, size });
        }
        Ok(())
    }
}
