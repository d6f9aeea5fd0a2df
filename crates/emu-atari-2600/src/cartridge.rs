//! Cartridge ROM images.
//!
//! A 2600 cartridge is a raw ROM dump with no header. Images up to 4 KiB
//! are mapped flat at `$F000`; smaller images repeat across the window.

use std::path::Path;

use thiserror::Error;

/// Size of the cartridge window.
pub const ROM_WINDOW: usize = 0x1000;

/// Why a cartridge image was rejected.
#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("failed to read cartridge: {0}")]
    Io(#[from] std::io::Error),
    #[error("cartridge image is empty")]
    Empty,
    #[error("cartridge image is {len} bytes; bank switching is not supported (max 4096)")]
    TooLarge { len: usize },
}

/// An immutable, validated ROM image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cartridge {
    rom: Box<[u8]>,
}

impl Cartridge {
    /// Validate a ROM image.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, CartridgeError> {
        let rom = bytes.into();
        if rom.is_empty() {
            return Err(CartridgeError::Empty);
        }
        if rom.len() > ROM_WINDOW {
            return Err(CartridgeError::TooLarge { len: rom.len() });
        }
        Ok(Self {
            rom: rom.into_boxed_slice(),
        })
    }

    /// Read and validate a ROM image from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CartridgeError> {
        Self::new(std::fs::read(path)?)
    }

    /// Byte at `offset` into the ROM window.
    #[must_use]
    pub fn read(&self, offset: u16) -> u8 {
        self.rom[usize::from(offset) % self.rom.len()]
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.rom
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rom.len()
    }

    /// Always false; empty images are rejected on construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rom.is_empty()
    }
}
