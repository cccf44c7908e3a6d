use alloc::vec::Vec;

use crate::bitstream::BitReader;
use crate::error::{DeflateError, Result};
use crate::huffman::{DecodeTable, FIXED_DISTANCE_DECODE, FIXED_LITERAL_DECODE, read_dynamic_tables};
use crate::tables::{
    DISTANCE_BASE, DISTANCE_EXTRA, END_OF_BLOCK, FIRST_LENGTH_CODE, LENGTH_BASE, LENGTH_EXTRA,
    NUM_DISTANCE_CODES, NUM_LITERAL_CODES,
};

/// Decompresses a raw DEFLATE stream.
///
/// Blocks are decoded until one carrying the final flag has been read; any
/// input after it is ignored. The reconstructed bytes are appended to
/// `output`. Back-references may only reach bytes produced by this call.
///
/// On error, `output` may hold a partially decoded block and should be
/// discarded.
pub fn inflate(input: &[u8], output: &mut Vec<u8>) -> Result<()> {
    // Heuristic capacity reservation to reduce allocation churn.
    output.try_reserve(input.len())?;

    let start = output.len();
    let mut reader = BitReader::new(input);

    loop {
        let is_final = reader.get_bit()? == 1;
        let block_type = reader.get(2)? as u8;
        let block_start = output.len();

        match block_type {
            0 => inflate_stored(&mut reader, output)?,
            1 => inflate_codes(
                &mut reader,
                output,
                start,
                &FIXED_LITERAL_DECODE,
                &FIXED_DISTANCE_DECODE,
            )?,
            2 => {
                let (literals, distances) = read_dynamic_tables(&mut reader)?;
                inflate_codes(&mut reader, output, start, &literals, &distances)?;
            }
            _ => {
                log::warn!(
                    target: "deflate",
                    "reserved block type {block_type} near byte {}",
                    reader.position()
                );
                return Err(DeflateError::InvalidBlockType(block_type));
            }
        }

        log::debug!(
            target: "deflate",
            "inflated type {block_type} block: {} bytes (final={is_final})",
            output.len() - block_start
        );

        if is_final {
            return Ok(());
        }
    }
}

/// Copies a stored block. The reader is positioned right after the block
/// header bits.
fn inflate_stored(reader: &mut BitReader<'_>, output: &mut Vec<u8>) -> Result<()> {
    reader.discard();
    let len = reader.get16le()?;
    let nlen = reader.get16le()?;

    if len != !nlen {
        log::warn!(
            target: "deflate",
            "stored block near byte {}: len {len:#06x} vs nlen {nlen:#06x}",
            reader.position()
        );
        return Err(DeflateError::StoredLengthMismatch { len, nlen });
    }

    let bytes = reader.take_bytes(len as usize)?;
    output.try_reserve(bytes.len())?;
    output.extend_from_slice(bytes);
    Ok(())
}

/// Decodes literal/length and distance symbols until end-of-block.
fn inflate_codes(
    reader: &mut BitReader<'_>,
    output: &mut Vec<u8>,
    start: usize,
    literals: &DecodeTable,
    distances: &DecodeTable,
) -> Result<()> {
    loop {
        let symbol = literals.decode(reader)?;

        if symbol < END_OF_BLOCK {
            output.try_reserve(1)?;
            output.push(symbol as u8);
            continue;
        }
        if symbol == END_OF_BLOCK {
            return Ok(());
        }
        if symbol as usize >= NUM_LITERAL_CODES {
            log::warn!(
                target: "deflate",
                "reserved length symbol {symbol} near byte {}",
                reader.position()
            );
            return Err(DeflateError::InvalidSymbol);
        }

        let index = (symbol - FIRST_LENGTH_CODE) as usize;
        let length =
            LENGTH_BASE[index] as usize + reader.get(LENGTH_EXTRA[index])? as usize;

        let symbol = distances.decode(reader)? as usize;
        if symbol >= NUM_DISTANCE_CODES {
            log::warn!(
                target: "deflate",
                "reserved distance symbol {symbol} near byte {}",
                reader.position()
            );
            return Err(DeflateError::InvalidSymbol);
        }
        let distance =
            DISTANCE_BASE[symbol] as usize + reader.get(DISTANCE_EXTRA[symbol])? as usize;

        let available = output.len() - start;
        if distance > available {
            log::warn!(
                target: "deflate",
                "distance {distance} near byte {} exceeds the {available} bytes produced",
                reader.position()
            );
            return Err(DeflateError::InvalidDistance {
                distance,
                available,
            });
        }

        apply_match(output, length, distance)?;
    }
}

/// Appends `length` bytes copied from `distance` bytes back.
///
/// The source may overlap the bytes being written, which repeats the last
/// `distance` bytes. The caller has checked the distance.
#[inline]
fn apply_match(output: &mut Vec<u8>, length: usize, distance: usize) -> Result<()> {
    output.try_reserve(length)?;

    if distance == 1 {
        let last_byte = output[output.len() - 1];
        output.resize(output.len() + length, last_byte);
    } else {
        let src_pos = output.len() - distance;
        for k in 0..length {
            let val = output[src_pos + k];
            output.push(val);
        }
    }

    Ok(())
}
