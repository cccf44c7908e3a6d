//! LSB-first bit access over byte buffers.
//!
//! DEFLATE packs data elements starting at the least significant bit of each
//! byte. Huffman codes are sent most-significant bit first, which the encoder
//! handles by storing codes pre-reversed; everything in this module is plain
//! LSB-first.

use alloc::vec::Vec;

use crate::error::{DeflateError, Result};

/// Reads bits from a borrowed byte slice.
///
/// Whole bytes are pulled from the slice as the pending byte is exhausted.
/// Raw byte access (`get16le`, `take_bytes`) bypasses the pending byte and is
/// only meaningful right after [`BitReader::discard`].
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    byte: u8,
    bit_count: u8,
}

impl<'a> BitReader<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            byte: 0,
            bit_count: 0,
        }
    }

    /// Byte offset of the next byte that will be pulled from the input.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Number of input bytes not yet pulled into the reader.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn next_byte(&mut self) -> Result<u8> {
        let Some(&byte) = self.data.get(self.pos) else {
            log::warn!(target: "deflate", "input truncated at byte {}", self.pos);
            return Err(DeflateError::UnexpectedEof { position: self.pos });
        };
        self.pos += 1;
        Ok(byte)
    }

    /// Reads `n` bits (at most 32), the first bit read landing in bit 0.
    pub fn get(&mut self, n: u8) -> Result<u32> {
        debug_assert!(n <= 32);
        let mut result = 0u32;
        let mut filled = 0u8;

        while filled < n {
            if self.bit_count == 0 {
                self.byte = self.next_byte()?;
                self.bit_count = 8;
            }

            let take = (n - filled).min(self.bit_count);
            let bits = u32::from(self.byte) & ((1u32 << take) - 1);
            result |= bits << filled;

            self.byte = (u16::from(self.byte) >> take) as u8;
            self.bit_count -= take;
            filled += take;
        }

        Ok(result)
    }

    /// Reads a single bit.
    #[inline]
    pub fn get_bit(&mut self) -> Result<u32> {
        self.get(1)
    }

    /// Drops the bits left in the pending byte, aligning the reader to the
    /// next byte boundary of the input.
    pub const fn discard(&mut self) {
        self.byte = 0;
        self.bit_count = 0;
    }

    /// Reads a little-endian `u16` directly from the input bytes.
    pub fn get16le(&mut self) -> Result<u16> {
        let lo = self.next_byte()?;
        let hi = self.next_byte()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Borrows the next `n` raw input bytes.
    pub fn take_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let Some(end) = self.pos.checked_add(n).filter(|&end| end <= self.data.len()) else {
            log::warn!(
                target: "deflate",
                "needed {n} bytes at byte {} but only {} remain",
                self.pos,
                self.remaining()
            );
            return Err(DeflateError::UnexpectedEof {
                position: self.data.len(),
            });
        };
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }
}

/// Appends bits to a borrowed output vector.
///
/// A byte is flushed to the vector each time eight bits have accumulated;
/// [`BitWriter::push`] flushes a trailing partial byte zero-padded.
pub struct BitWriter<'a> {
    out: &'a mut Vec<u8>,
    byte: u8,
    bit_count: u8,
}

impl<'a> BitWriter<'a> {
    pub const fn new(out: &'a mut Vec<u8>) -> Self {
        Self {
            out,
            byte: 0,
            bit_count: 0,
        }
    }

    /// Returns `true` when no partial byte is pending.
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.bit_count == 0
    }

    /// Number of bits written so far, including the pending partial byte.
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.out.len() * 8 + self.bit_count as usize
    }

    fn flush_byte(&mut self) -> Result<()> {
        self.out.try_reserve(1)?;
        self.out.push(self.byte);
        self.byte = 0;
        self.bit_count = 0;
        Ok(())
    }

    /// Writes the low `n` bits (at most 32) of `bits`, bit 0 first.
    pub fn put(&mut self, n: u8, bits: u32) -> Result<()> {
        debug_assert!(n <= 32);
        let mut bits = bits;
        let mut n = n;

        while n > 0 {
            let take = n.min(8 - self.bit_count);
            let chunk = (bits & ((1u32 << take) - 1)) as u8;
            self.byte |= chunk << self.bit_count;
            self.bit_count += take;
            bits >>= take;
            n -= take;

            if self.bit_count == 8 {
                self.flush_byte()?;
            }
        }

        Ok(())
    }

    /// Flushes a pending partial byte, padding it with zero bits.
    pub fn push(&mut self) -> Result<()> {
        if self.bit_count != 0 {
            self.flush_byte()?;
        }
        Ok(())
    }

    /// Writes a little-endian `u16` straight to the output. The writer must be
    /// byte aligned.
    pub fn put16le(&mut self, value: u16) -> Result<()> {
        self.put_bytes(&value.to_le_bytes())
    }

    /// Copies raw bytes straight to the output. The writer must be byte
    /// aligned.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        debug_assert!(self.is_aligned(), "raw write on unaligned bit writer");
        self.out.try_reserve(bytes.len())?;
        self.out.extend_from_slice(bytes);
        Ok(())
    }
}
