use alloc::vec::Vec;

use crate::bitstream::BitWriter;
use crate::error::{DeflateError, Result};
use crate::huffman::{EncodeTable, FIXED_DISTANCE_ENCODE, FIXED_LITERAL_ENCODE};
use crate::lz77::{Frequencies, MatchFinder, Token};
use crate::tables::{
    CODE_LENGTH_ORDER, END_OF_BLOCK, FIRST_LENGTH_CODE, MAX_BLOCK_SIZE, MAX_CODE_BITS,
    MAX_CODE_LENGTH_BITS, NUM_CODE_LENGTH_CODES, NUM_DISTANCE_CODES, NUM_LITERAL_CODES,
    distance_code, length_code,
};

/// Default hash-chain work budget per position.
const DEFAULT_MAX_CHAIN: usize = 4096;

/// Match length after which the chain budget is quartered.
const DEFAULT_GOOD_MATCH: usize = 32;

/// Bits a stored block spends on LEN and NLEN.
const STORED_OVERHEAD_BITS: u64 = 32;

/// Tuning knobs for [`deflate_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    block_size: usize,
    max_chain: usize,
    good_match: usize,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            block_size: MAX_BLOCK_SIZE,
            max_chain: DEFAULT_MAX_CHAIN,
            good_match: DEFAULT_GOOD_MATCH,
        }
    }

    /// Sets the number of source bytes per block, clamped to `1..=65535`.
    #[must_use]
    pub const fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = if block_size == 0 {
            1
        } else if block_size > MAX_BLOCK_SIZE {
            MAX_BLOCK_SIZE
        } else {
            block_size
        };
        self
    }

    /// Sets how many hash-chain entries are examined per position.
    #[must_use]
    pub const fn with_max_chain(mut self, max_chain: usize) -> Self {
        self.max_chain = max_chain;
        self
    }

    /// Sets the match length at which the remaining chain budget is
    /// quartered.
    #[must_use]
    pub const fn with_good_match(mut self, good_match: usize) -> Self {
        self.good_match = good_match;
        self
    }

    #[must_use]
    pub const fn block_size(&self) -> usize {
        self.block_size
    }

    #[must_use]
    pub const fn max_chain(&self) -> usize {
        self.max_chain
    }

    #[must_use]
    pub const fn good_match(&self) -> usize {
        self.good_match
    }
}

/// The three block encodings, numbered as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BlockType {
    Stored = 0,
    Fixed = 1,
    Dynamic = 2,
}

/// Estimated size in bits of one block under each encoding.
///
/// The 3-bit block header is common to all three and left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCosts {
    pub stored: u64,
    pub fixed: u64,
    pub dynamic: u64,
}

impl BlockCosts {
    /// Measures a block of `source_len` bytes whose tokens have the given
    /// frequencies.
    pub fn measure(source_len: usize, frequencies: &Frequencies) -> Result<Self> {
        let header = DynamicHeader::new(frequencies)?;
        Ok(Self::with_header(source_len, frequencies, &header))
    }

    fn with_header(source_len: usize, frequencies: &Frequencies, header: &DynamicHeader) -> Self {
        let fixed = FIXED_LITERAL_ENCODE.cost(&frequencies.literals)
            + FIXED_DISTANCE_ENCODE.cost(&frequencies.distances)
            + frequencies.extra_bits;
        let dynamic = header.literals.cost(&frequencies.literals)
            + header.distances.cost(&frequencies.distances)
            + frequencies.extra_bits
            + header.bits();

        Self {
            stored: STORED_OVERHEAD_BITS + 8 * source_len as u64,
            fixed,
            dynamic,
        }
    }

    /// The cheapest encoding; ties go to stored, then fixed.
    #[must_use]
    pub const fn best(&self) -> BlockType {
        if self.stored <= self.fixed && self.stored <= self.dynamic {
            BlockType::Stored
        } else if self.fixed <= self.dynamic {
            BlockType::Fixed
        } else {
            BlockType::Dynamic
        }
    }
}

/// One symbol of the run-length coded code-length sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CodeLengthRun {
    symbol: u8,
    extra_bits: u8,
    extra_value: u8,
}

impl CodeLengthRun {
    const fn plain(length: u8) -> Self {
        Self {
            symbol: length,
            extra_bits: 0,
            extra_value: 0,
        }
    }

    const fn repeat(symbol: u8, extra_bits: u8, extra_value: usize) -> Self {
        Self {
            symbol,
            extra_bits,
            extra_value: extra_value as u8,
        }
    }
}

/// Tables and serialized description of a dynamic block.
struct DynamicHeader {
    literals: EncodeTable,
    distances: EncodeTable,
    code_lengths: EncodeTable,
    hlit: usize,
    hdist: usize,
    hclen: usize,
    runs: Vec<CodeLengthRun>,
}

impl DynamicHeader {
    fn new(frequencies: &Frequencies) -> Result<Self> {
        let literals = EncodeTable::from_frequencies(&frequencies.literals, MAX_CODE_BITS)?;

        // A block without matches still sends one distance code.
        let mut distance_freqs = frequencies.distances;
        if distance_freqs.iter().all(|&f| f == 0) {
            distance_freqs[0] = 1;
        }
        let distances = EncodeTable::from_frequencies(&distance_freqs, MAX_CODE_BITS)?;

        let hlit = used_prefix(literals.lengths()).max(FIRST_LENGTH_CODE as usize);
        let hdist = used_prefix(distances.lengths()).max(1);

        let mut all = [0u8; NUM_LITERAL_CODES + NUM_DISTANCE_CODES];
        all[..hlit].copy_from_slice(&literals.lengths()[..hlit]);
        all[hlit..hlit + hdist].copy_from_slice(&distances.lengths()[..hdist]);
        let runs = run_length_encode(&all[..hlit + hdist])?;

        let mut cl_freqs = [0u32; NUM_CODE_LENGTH_CODES];
        for run in &runs {
            cl_freqs[run.symbol as usize] += 1;
        }
        let code_lengths = EncodeTable::from_frequencies(&cl_freqs, MAX_CODE_LENGTH_BITS)?;

        let hclen = CODE_LENGTH_ORDER
            .iter()
            .rposition(|&s| code_lengths.lengths()[s] != 0)
            .map_or(4, |i| (i + 1).max(4));

        Ok(Self {
            literals,
            distances,
            code_lengths,
            hlit,
            hdist,
            hclen,
            runs,
        })
    }

    /// Size of the serialized header in bits.
    fn bits(&self) -> u64 {
        let runs: u64 = self
            .runs
            .iter()
            .map(|run| {
                u64::from(self.code_lengths.code(run.symbol as usize).1) + u64::from(run.extra_bits)
            })
            .sum();
        5 + 5 + 4 + 3 * self.hclen as u64 + runs
    }

    fn write(&self, writer: &mut BitWriter<'_>) -> Result<()> {
        log::trace!(
            target: "deflate",
            "dynamic header: hlit={} hdist={} hclen={}",
            self.hlit,
            self.hdist,
            self.hclen
        );

        writer.put(5, (self.hlit - 257) as u32)?;
        writer.put(5, (self.hdist - 1) as u32)?;
        writer.put(4, (self.hclen - 4) as u32)?;

        for &symbol in &CODE_LENGTH_ORDER[..self.hclen] {
            writer.put(3, u32::from(self.code_lengths.lengths()[symbol]))?;
        }

        for run in &self.runs {
            self.code_lengths.put(writer, run.symbol as usize)?;
            writer.put(run.extra_bits, u32::from(run.extra_value))?;
        }

        Ok(())
    }
}

/// Number of entries up to and including the last non-zero length.
fn used_prefix(lengths: &[u8]) -> usize {
    lengths.iter().rposition(|&l| l != 0).map_or(0, |i| i + 1)
}

/// Run-length codes a code-length sequence with the escape symbols 16
/// (repeat previous 3..=6 times), 17 (3..=10 zeros) and 18 (11..=138 zeros).
fn run_length_encode(lengths: &[u8]) -> Result<Vec<CodeLengthRun>> {
    let mut runs = Vec::new();
    runs.try_reserve(lengths.len())?;

    let mut i = 0;
    while i < lengths.len() {
        let value = lengths[i];
        let run = lengths[i..].iter().take_while(|&&l| l == value).count();
        i += run;

        let mut left = run;
        if value == 0 {
            while left > 0 {
                if left >= 11 {
                    let rep = left.min(138);
                    runs.push(CodeLengthRun::repeat(18, 7, rep - 11));
                    left -= rep;
                } else if left >= 3 {
                    runs.push(CodeLengthRun::repeat(17, 3, left - 3));
                    left = 0;
                } else {
                    runs.push(CodeLengthRun::plain(0));
                    left -= 1;
                }
            }
        } else {
            runs.push(CodeLengthRun::plain(value));
            left -= 1;
            while left > 0 {
                if left >= 3 {
                    let rep = left.min(6);
                    runs.push(CodeLengthRun::repeat(16, 2, rep - 3));
                    left -= rep;
                } else {
                    runs.push(CodeLengthRun::plain(value));
                    left -= 1;
                }
            }
        }
    }

    Ok(runs)
}

/// Writes the Huffman-coded token stream followed by end-of-block.
fn write_tokens(
    writer: &mut BitWriter<'_>,
    tokens: &[Token],
    literals: &EncodeTable,
    distances: &EncodeTable,
) -> Result<()> {
    for &token in tokens {
        match token {
            Token::Literal(byte) => literals.put(writer, byte as usize)?,
            Token::Match { length, distance } => {
                let (Some(len), Some(dist)) = (length_code(length), distance_code(distance))
                else {
                    return Err(DeflateError::InvalidMatch { length, distance });
                };
                literals.put(writer, (FIRST_LENGTH_CODE + len.index) as usize)?;
                writer.put(len.extra_bits, u32::from(len.extra_value))?;
                distances.put(writer, dist.index as usize)?;
                writer.put(dist.extra_bits, u32::from(dist.extra_value))?;
            }
        }
    }
    literals.put(writer, END_OF_BLOCK as usize)
}

/// Tokenises one block, picks the cheapest encoding and writes it.
fn write_block(
    writer: &mut BitWriter<'_>,
    finder: &mut MatchFinder,
    block: &[u8],
    is_final: bool,
) -> Result<()> {
    let lz = finder.tokenize(block)?;
    let header = DynamicHeader::new(&lz.frequencies)?;
    let costs = BlockCosts::with_header(block.len(), &lz.frequencies, &header);
    let block_type = costs.best();

    log::debug!(
        target: "deflate",
        "block of {} bytes as {block_type:?} (stored={} fixed={} dynamic={} bits, final={is_final})",
        block.len(),
        costs.stored,
        costs.fixed,
        costs.dynamic
    );

    match block_type {
        BlockType::Stored => write_stored(writer, block, is_final),
        BlockType::Fixed => {
            put_block_header(writer, is_final, block_type)?;
            write_tokens(
                writer,
                &lz.tokens,
                &FIXED_LITERAL_ENCODE,
                &FIXED_DISTANCE_ENCODE,
            )
        }
        BlockType::Dynamic => {
            put_block_header(writer, is_final, block_type)?;
            header.write(writer)?;
            write_tokens(writer, &lz.tokens, &header.literals, &header.distances)
        }
    }
}

fn put_block_header(writer: &mut BitWriter<'_>, is_final: bool, block_type: BlockType) -> Result<()> {
    writer.put(1, u32::from(is_final))?;
    writer.put(2, block_type as u32)
}

/// Writes `block` (at most 65535 bytes) verbatim as a stored block.
fn write_stored(writer: &mut BitWriter<'_>, block: &[u8], is_final: bool) -> Result<()> {
    put_block_header(writer, is_final, BlockType::Stored)?;
    let len = block.len() as u16;
    writer.push()?;
    writer.put16le(len)?;
    writer.put16le(!len)?;
    writer.put_bytes(block)
}

/// Compresses `input` into raw DEFLATE blocks using the default options.
///
/// The compressed stream is appended to `output`; bytes already in `output`
/// are left untouched.
///
/// # Parameters
/// * `input`: The source data to compress.
/// * `output`: The destination vector (appended to).
pub fn deflate(input: &[u8], output: &mut Vec<u8>) -> Result<()> {
    deflate_with(input, output, &CompressOptions::default())
}

/// Compresses `input` into raw DEFLATE blocks.
///
/// The input is split into blocks of `options.block_size()` bytes. For each
/// block the stored, fixed and dynamic encodings are costed and the smallest
/// is written; the last block carries the final flag. Empty input produces a
/// single final stored block of length 0.
pub fn deflate_with(input: &[u8], output: &mut Vec<u8>, options: &CompressOptions) -> Result<()> {
    let mut writer = BitWriter::new(output);
    if input.is_empty() {
        log::debug!(target: "deflate", "empty input as one final stored block");
        return write_stored(&mut writer, input, true);
    }

    let mut finder = MatchFinder::new(options.max_chain(), options.good_match())?;
    let mut blocks = input.chunks(options.block_size()).peekable();
    while let Some(block) = blocks.next() {
        let is_final = blocks.peek().is_none();
        write_block(&mut writer, &mut finder, block, is_final)?;
    }

    writer.push()
}
