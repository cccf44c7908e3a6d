//! Codec selection by a one-byte compression type id.

use alloc::vec::Vec;

use crate::error::{DeflateError, Result};

/// Compression methods that can be named by id.
///
/// Id 1 belongs to a codec this crate does not provide and is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CompressionType {
    /// Data is stored as is.
    None = 0,
    /// Raw DEFLATE.
    Deflate = 2,
}

impl TryFrom<u8> for CompressionType {
    type Error = DeflateError;

    fn try_from(id: u8) -> Result<Self> {
        match id {
            0 => Ok(Self::None),
            2 => Ok(Self::Deflate),
            _ => Err(DeflateError::UnsupportedCompression(id)),
        }
    }
}

impl From<CompressionType> for u8 {
    fn from(kind: CompressionType) -> Self {
        kind as Self
    }
}

impl CompressionType {
    /// Compresses `input`, appending the result to `output`.
    pub fn pack(self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
        match self {
            Self::None => copy(input, output),
            Self::Deflate => crate::deflate(input, output),
        }
    }

    /// Reverses [`CompressionType::pack`], appending to `output`.
    pub fn unpack(self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
        match self {
            Self::None => copy(input, output),
            Self::Deflate => crate::inflate(input, output),
        }
    }
}

fn copy(input: &[u8], output: &mut Vec<u8>) -> Result<()> {
    output.try_reserve(input.len())?;
    output.extend_from_slice(input);
    Ok(())
}
