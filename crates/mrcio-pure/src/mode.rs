//! Voxel element encodings supported by the reader.

use crate::error::{Error, Result};

/// On-disk element encoding, selected by the header `mode` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelMode {
    /// Mode 0: signed 8-bit integers.
    I8,
    /// Mode 1: signed 16-bit integers.
    I16,
    /// Mode 2: 32-bit IEEE-754 floats.
    F32,
}

impl PixelMode {
    /// Convert from the MRC `mode` code.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(PixelMode::I8),
            1 => Ok(PixelMode::I16),
            2 => Ok(PixelMode::F32),
            other => Err(Error::UnsupportedMode(other)),
        }
    }

    /// Convert to the MRC `mode` code.
    pub fn code(self) -> i32 {
        match self {
            PixelMode::I8 => 0,
            PixelMode::I16 => 1,
            PixelMode::F32 => 2,
        }
    }

    /// Size of one element in bytes.
    pub fn element_size(self) -> usize {
        match self {
            PixelMode::I8 => 1,
            PixelMode::I16 => 2,
            PixelMode::F32 => 4,
        }
    }

    /// Element type name as MRC documentation spells it.
    pub fn name(self) -> &'static str {
        match self {
            PixelMode::I8 => "char",
            PixelMode::I16 => "short",
            PixelMode::F32 => "float",
        }
    }
}

impl core::fmt::Display for PixelMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
