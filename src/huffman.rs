//! Canonical Huffman tables for DEFLATE.
//!
//! A canonical code is fully determined by its code lengths, so both table
//! kinds are built from a length array:
//!
//! * [`DecodeTable`] keeps the number of codes per length plus the symbols
//!   ordered by (length, symbol), and decodes one bit at a time.
//! * [`EncodeTable`] keeps a bit-reversed code and a length per symbol, ready
//!   to be written LSB-first.
//!
//! Dynamic blocks need lengths derived from symbol frequencies under a
//! maximum code length; [`EncodeTable::from_frequencies`] does this with the
//! boundary package-merge algorithm.

use alloc::vec::Vec;

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{DeflateError, Result};
use crate::tables::{
    CODE_LENGTH_ORDER, END_OF_BLOCK, MAX_CODE_BITS, MAX_CODE_LENGTH_BITS, NUM_CODE_LENGTH_CODES,
    NUM_DISTANCE_CODES, NUM_LITERAL_CODES, NUM_LITERAL_SYMBOLS,
};

/// Number of slots in the per-length count arrays (lengths 0..=15).
const LENGTH_SLOTS: usize = MAX_CODE_BITS as usize + 1;

/// Code lengths of the fixed literal/length code.
pub const FIXED_LITERAL_LENGTHS: [u8; NUM_LITERAL_SYMBOLS] = {
    let mut lengths = [0u8; NUM_LITERAL_SYMBOLS];
    let mut i = 0;
    while i < NUM_LITERAL_SYMBOLS {
        lengths[i] = match i {
            0..=143 => 8,
            144..=255 => 9,
            256..=279 => 7,
            _ => 8,
        };
        i += 1;
    }
    lengths
};

/// Code lengths of the fixed distance code.
pub const FIXED_DISTANCE_LENGTHS: [u8; NUM_DISTANCE_CODES] = [5; NUM_DISTANCE_CODES];

pub static FIXED_LITERAL_DECODE: DecodeTable = DecodeTable::build(&FIXED_LITERAL_LENGTHS);
pub static FIXED_DISTANCE_DECODE: DecodeTable = DecodeTable::build(&FIXED_DISTANCE_LENGTHS);
pub static FIXED_LITERAL_ENCODE: EncodeTable = EncodeTable::build(&FIXED_LITERAL_LENGTHS);
pub static FIXED_DISTANCE_ENCODE: EncodeTable = EncodeTable::build(&FIXED_DISTANCE_LENGTHS);

/// Canonical decoding table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeTable {
    /// Number of symbols per code length; `counts[0]` is always zero.
    counts: [u16; LENGTH_SLOTS],
    /// Symbols ordered by code length, then by symbol value.
    symbols: [u16; NUM_LITERAL_SYMBOLS],
}

impl DecodeTable {
    /// Builds the table without validation. Every length must be below 16.
    const fn build(lengths: &[u8]) -> Self {
        let mut counts = [0u16; LENGTH_SLOTS];
        let mut i = 0;
        while i < lengths.len() {
            counts[lengths[i] as usize] += 1;
            i += 1;
        }
        counts[0] = 0;

        let mut offsets = [0u16; LENGTH_SLOTS];
        let mut len = 1;
        while len < LENGTH_SLOTS - 1 {
            offsets[len + 1] = offsets[len] + counts[len];
            len += 1;
        }

        let mut symbols = [0u16; NUM_LITERAL_SYMBOLS];
        i = 0;
        while i < lengths.len() {
            let len = lengths[i] as usize;
            if len != 0 {
                symbols[offsets[len] as usize] = i as u16;
                offsets[len] += 1;
            }
            i += 1;
        }

        Self { counts, symbols }
    }

    /// Builds a decoding table from per-symbol code lengths (0 = unused).
    ///
    /// Rejects lengths above `max_bits` and length sets that over-subscribe
    /// the code space. Incomplete codes are accepted.
    pub fn from_lengths(lengths: &[u8], max_bits: u8) -> Result<Self> {
        debug_assert!(lengths.len() <= NUM_LITERAL_SYMBOLS);
        debug_assert!(max_bits <= MAX_CODE_BITS);

        if let Some(&length) = lengths.iter().find(|&&l| l > max_bits) {
            log::warn!(target: "deflate", "code length {length} exceeds maximum {max_bits}");
            return Err(DeflateError::InvalidCodeLength {
                length,
                max: max_bits,
            });
        }

        let table = Self::build(lengths);

        let mut left: i32 = 1;
        for &count in &table.counts[1..] {
            left = (left << 1) - i32::from(count);
            if left < 0 {
                log::warn!(target: "deflate", "code lengths over-subscribe the code space");
                return Err(DeflateError::OversubscribedCode);
            }
        }

        Ok(table)
    }

    /// Number of symbols per code length.
    #[must_use]
    pub const fn counts(&self) -> &[u16; LENGTH_SLOTS] {
        &self.counts
    }

    /// Decodes one symbol, reading the code bit by bit.
    ///
    /// `first` tracks the first canonical code of the current length and
    /// `index` the position of that length's bucket in `symbols`.
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<u16> {
        let mut code: i32 = 0;
        let mut first: i32 = 0;
        let mut index: i32 = 0;

        for &count in &self.counts[1..] {
            code |= reader.get_bit()? as i32;
            let count = i32::from(count);
            if code - first < count {
                return Ok(self.symbols[(index + code - first) as usize]);
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }

        log::warn!(
            target: "deflate",
            "no symbol for huffman code near byte {}",
            reader.position()
        );
        Err(DeflateError::InvalidSymbol)
    }
}

/// Canonical encoding table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeTable {
    /// Codes, bit-reversed so they can be written LSB-first.
    codes: [u16; NUM_LITERAL_SYMBOLS],
    lengths: [u8; NUM_LITERAL_SYMBOLS],
    size: usize,
}

impl EncodeTable {
    /// Assigns canonical codes to valid, non-over-subscribed lengths.
    const fn build(lengths: &[u8]) -> Self {
        let mut bl_count = [0u32; LENGTH_SLOTS];
        let mut i = 0;
        while i < lengths.len() {
            bl_count[lengths[i] as usize] += 1;
            i += 1;
        }
        bl_count[0] = 0;

        let mut next_code = [0u32; LENGTH_SLOTS];
        let mut code = 0u32;
        let mut bits = 1;
        while bits < LENGTH_SLOTS {
            code = (code + bl_count[bits - 1]) << 1;
            next_code[bits] = code;
            bits += 1;
        }

        let mut codes = [0u16; NUM_LITERAL_SYMBOLS];
        let mut table_lengths = [0u8; NUM_LITERAL_SYMBOLS];
        i = 0;
        while i < lengths.len() {
            let len = lengths[i];
            if len != 0 {
                codes[i] = reverse_bits(next_code[len as usize], len);
                table_lengths[i] = len;
                next_code[len as usize] += 1;
            }
            i += 1;
        }

        Self {
            codes,
            lengths: table_lengths,
            size: lengths.len(),
        }
    }

    /// Builds an encoding table from per-symbol code lengths.
    pub fn from_lengths(lengths: &[u8], max_bits: u8) -> Result<Self> {
        // Same validation as the decoder: lengths an encoder can't represent
        // are exactly those a decoder would reject.
        DecodeTable::from_lengths(lengths, max_bits)?;
        Ok(Self::build(lengths))
    }

    /// Builds an optimal length-limited code for the given frequencies.
    ///
    /// Symbols with zero frequency get no code. One or two used symbols get
    /// one-bit codes.
    pub fn from_frequencies(frequencies: &[u32], max_bits: u8) -> Result<Self> {
        let lengths = limited_code_lengths(frequencies, max_bits)?;
        Ok(Self::build(&lengths))
    }

    /// Number of symbols covered by the table.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Per-symbol code lengths.
    #[must_use]
    pub fn lengths(&self) -> &[u8] {
        &self.lengths[..self.size]
    }

    /// Bit-reversed code and its length for `symbol`.
    #[inline]
    #[must_use]
    pub fn code(&self, symbol: usize) -> (u16, u8) {
        (self.codes[symbol], self.lengths[symbol])
    }

    /// Writes the code for `symbol`.
    #[inline]
    pub fn put(&self, writer: &mut BitWriter<'_>, symbol: usize) -> Result<()> {
        let (code, len) = self.code(symbol);
        debug_assert!(len > 0, "symbol {symbol} has no code");
        writer.put(len, u32::from(code))
    }

    /// Total code bits needed to send every symbol `frequencies[s]` times.
    #[must_use]
    pub fn cost(&self, frequencies: &[u32]) -> u64 {
        frequencies
            .iter()
            .zip(self.lengths())
            .map(|(&f, &l)| u64::from(f) * u64::from(l))
            .sum()
    }
}

/// Reverses the low `len` bits of `code`.
const fn reverse_bits(code: u32, len: u8) -> u16 {
    let mut code = code;
    let mut reversed = 0u32;
    let mut i = 0;
    while i < len {
        reversed = (reversed << 1) | (code & 1);
        code >>= 1;
        i += 1;
    }
    reversed as u16
}

/// A used symbol with its weight.
#[derive(Debug, Clone, Copy)]
struct Leaf {
    weight: u32,
    symbol: u16,
}

/// A package-merge chain node. `count` is the number of leaves the chain's
/// list has consumed; `tail` links to the node of the list below.
#[derive(Debug, Clone, Copy)]
struct Node {
    weight: u64,
    count: usize,
    tail: Option<usize>,
}

/// Boundary package-merge state: one pair of lookahead chains per code
/// length, backed by a node arena.
struct PackageMerge<'a> {
    leaves: &'a [Leaf],
    nodes: Vec<Node>,
    lists: Vec<[usize; 2]>,
}

impl<'a> PackageMerge<'a> {
    fn new(leaves: &'a [Leaf], max_bits: usize) -> Result<Self> {
        let mut nodes = Vec::new();
        nodes.try_reserve(2 * max_bits * leaves.len())?;
        let mut lists = Vec::new();
        lists.try_reserve(max_bits)?;

        nodes.push(Node {
            weight: u64::from(leaves[0].weight),
            count: 1,
            tail: None,
        });
        nodes.push(Node {
            weight: u64::from(leaves[1].weight),
            count: 2,
            tail: None,
        });
        lists.resize(max_bits, [0, 1]);

        Ok(Self {
            leaves,
            nodes,
            lists,
        })
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn pair_weight(&self, index: usize) -> u64 {
        let [a, b] = self.lists[index];
        self.nodes[a].weight + self.nodes[b].weight
    }

    /// Adds one chain to list `index`: either the next leaf, or a package of
    /// the two lookahead chains of the list below (which is then refilled).
    fn run(&mut self, index: usize) {
        let leaves = self.leaves;
        let old = self.lists[index][1];
        let last_count = self.nodes[old].count;

        if index == 0 {
            let Some(leaf) = leaves.get(last_count) else {
                return;
            };
            let new = self.push(Node {
                weight: u64::from(leaf.weight),
                count: last_count + 1,
                tail: None,
            });
            self.lists[0] = [old, new];
            return;
        }

        let sum = self.pair_weight(index - 1);
        if let Some(leaf) = leaves.get(last_count).filter(|l| sum > u64::from(l.weight)) {
            let new = self.push(Node {
                weight: u64::from(leaf.weight),
                count: last_count + 1,
                tail: self.nodes[old].tail,
            });
            self.lists[index] = [old, new];
        } else {
            let new = self.push(Node {
                weight: sum,
                count: last_count,
                tail: Some(self.lists[index - 1][1]),
            });
            self.lists[index] = [old, new];
            self.run(index - 1);
            self.run(index - 1);
        }
    }

    /// Last step on the top list; only the chain shape matters, not weight.
    fn finish(&mut self, index: usize) -> usize {
        let top = self.lists[index][1];
        let last_count = self.nodes[top].count;
        let sum = self.pair_weight(index - 1);

        if self
            .leaves
            .get(last_count)
            .is_some_and(|l| sum > u64::from(l.weight))
        {
            let tail = self.nodes[top].tail;
            self.push(Node {
                weight: 0,
                count: last_count + 1,
                tail,
            })
        } else {
            self.nodes[top].tail = Some(self.lists[index - 1][1]);
            top
        }
    }

    /// Walks the final chain and assigns code lengths. A leaf's length is
    /// the number of lists whose chain consumed it.
    fn write_lengths(&self, chain: usize, lengths: &mut [u8]) {
        let mut counts = [0usize; LENGTH_SLOTS];
        let mut end = LENGTH_SLOTS;
        let mut node = Some(chain);
        while let Some(i) = node {
            end -= 1;
            counts[end] = self.nodes[i].count;
            node = self.nodes[i].tail;
        }

        let mut val = counts[LENGTH_SLOTS - 1];
        let mut ptr = LENGTH_SLOTS - 1;
        let mut value = 1u8;
        while ptr >= end {
            while val > counts[ptr - 1] {
                lengths[self.leaves[val - 1].symbol as usize] = value;
                val -= 1;
            }
            ptr -= 1;
            value += 1;
        }
    }
}

/// Computes optimal code lengths no longer than `max_bits`.
fn limited_code_lengths(frequencies: &[u32], max_bits: u8) -> Result<Vec<u8>> {
    let mut lengths = Vec::new();
    lengths.try_reserve_exact(frequencies.len())?;
    lengths.resize(frequencies.len(), 0u8);

    let mut leaves: Vec<Leaf> = Vec::new();
    leaves.try_reserve_exact(frequencies.len())?;
    leaves.extend(
        frequencies
            .iter()
            .enumerate()
            .filter(|&(_, &f)| f != 0)
            .map(|(symbol, &weight)| Leaf {
                weight,
                symbol: symbol as u16,
            }),
    );

    let n = leaves.len();
    if n > (1usize << max_bits) {
        return Err(DeflateError::CodeSpaceExhausted {
            symbols: n,
            max_bits,
        });
    }
    if n <= 2 {
        for leaf in &leaves {
            lengths[leaf.symbol as usize] = 1;
        }
        return Ok(lengths);
    }

    leaves.sort_unstable_by_key(|l| (l.weight, l.symbol));

    // With n leaves no code needs more than n - 1 bits.
    let max_bits = usize::from(max_bits).min(n - 1);
    let mut pm = PackageMerge::new(&leaves, max_bits)?;

    // The top list needs 2n - 2 chains: two exist from initialisation, the
    // final step adds the last one.
    let top = max_bits - 1;
    for _ in 0..2 * n - 5 {
        pm.run(top);
    }
    let chain = pm.finish(top);
    pm.write_lengths(chain, &mut lengths);

    Ok(lengths)
}

/// Reads the code-length header of a dynamic block and returns the
/// literal/length and distance tables it describes.
pub fn read_dynamic_tables(reader: &mut BitReader<'_>) -> Result<(DecodeTable, DecodeTable)> {
    let literals = reader.get(5)? as usize + 257;
    let distances = reader.get(5)? as usize + 1;
    let code_lengths = reader.get(4)? as usize + 4;

    log::trace!(
        target: "deflate",
        "dynamic header: hlit={literals} hdist={distances} hclen={code_lengths}"
    );

    if literals > NUM_LITERAL_CODES || distances > NUM_DISTANCE_CODES {
        log::warn!(
            target: "deflate",
            "dynamic header near byte {} declares {literals} literal and {distances} distance codes",
            reader.position()
        );
        return Err(DeflateError::TooManyCodes {
            literals,
            distances,
        });
    }

    let mut cl_lengths = [0u8; NUM_CODE_LENGTH_CODES];
    for &symbol in CODE_LENGTH_ORDER.iter().take(code_lengths) {
        cl_lengths[symbol] = reader.get(3)? as u8;
    }
    let cl_table = DecodeTable::from_lengths(&cl_lengths, MAX_CODE_LENGTH_BITS)?;

    let total = literals + distances;
    let mut lengths = [0u8; NUM_LITERAL_CODES + NUM_DISTANCE_CODES];
    let mut count = 0;

    while count < total {
        let symbol = cl_table.decode(reader)?;
        let (value, repeat) = match symbol {
            0..=15 => (symbol as u8, 1),
            16 => {
                let Some(&previous) = count.checked_sub(1).and_then(|i| lengths.get(i)) else {
                    log::warn!(target: "deflate", "repeat code 16 with no previous length");
                    return Err(DeflateError::InvalidRepeat);
                };
                (previous, 3 + reader.get(2)? as usize)
            }
            17 => (0, 3 + reader.get(3)? as usize),
            18 => (0, 11 + reader.get(7)? as usize),
            _ => {
                log::warn!(
                    target: "deflate",
                    "code-length symbol {symbol} near byte {}",
                    reader.position()
                );
                return Err(DeflateError::InvalidSymbol);
            }
        };

        if count + repeat > total {
            log::warn!(
                target: "deflate",
                "code length repeat of {repeat} overruns {total} codes at {count}"
            );
            return Err(DeflateError::InvalidRepeat);
        }
        lengths[count..count + repeat].fill(value);
        count += repeat;
    }

    if lengths[END_OF_BLOCK as usize] == 0 {
        log::warn!(
            target: "deflate",
            "dynamic header near byte {} gives end-of-block no code",
            reader.position()
        );
        return Err(DeflateError::MissingEndOfBlock);
    }

    let literal_table = DecodeTable::from_lengths(&lengths[..literals], MAX_CODE_BITS)?;
    let distance_table = DecodeTable::from_lengths(&lengths[literals..total], MAX_CODE_BITS)?;
    Ok((literal_table, distance_table))
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    /// Writes every coded symbol with `encode` and checks `decode` reads it
    /// back.
    fn assert_inverse(encode: &EncodeTable, decode: &DecodeTable) {
        let symbols: Vec<usize> = (0..encode.len())
            .filter(|&s| encode.lengths()[s] > 0)
            .collect();

        let mut out = Vec::new();
        let mut writer = BitWriter::new(&mut out);
        for &s in &symbols {
            encode.put(&mut writer, s).unwrap();
        }
        writer.push().unwrap();

        let mut reader = BitReader::new(&out);
        for &s in &symbols {
            assert_eq!(decode.decode(&mut reader).unwrap() as usize, s);
        }
    }

    fn kraft_sum(lengths: &[u8]) -> u64 {
        lengths
            .iter()
            .filter(|&&l| l > 0)
            .map(|&l| 1u64 << (15 - l))
            .sum()
    }

    #[test]
    fn test_fixed_literal_codes() {
        // Known RFC 1951 codes, transmitted bit-reversed.
        assert_eq!(FIXED_LITERAL_ENCODE.code(0), (0x0C, 8));
        assert_eq!(FIXED_LITERAL_ENCODE.code(143), (0xFD, 8));
        assert_eq!(FIXED_LITERAL_ENCODE.code(144), (0x13, 9));
        assert_eq!(FIXED_LITERAL_ENCODE.code(255), (0x1FF, 9));
        assert_eq!(FIXED_LITERAL_ENCODE.code(256), (0x00, 7));
        assert_eq!(FIXED_LITERAL_ENCODE.code(280), (0x03, 8));
    }

    #[test]
    fn test_fixed_decode_counts() {
        let counts = FIXED_LITERAL_DECODE.counts();
        assert_eq!(counts[7], 24);
        assert_eq!(counts[8], 152);
        assert_eq!(counts[9], 112);
        assert_eq!(FIXED_DISTANCE_DECODE.counts()[5], 30);
    }

    #[test]
    fn test_fixed_tables_are_inverse() {
        assert_inverse(&FIXED_LITERAL_ENCODE, &FIXED_LITERAL_DECODE);
        assert_inverse(&FIXED_DISTANCE_ENCODE, &FIXED_DISTANCE_DECODE);
    }

    #[test]
    fn test_decode_rejects_long_lengths() {
        assert_eq!(
            DecodeTable::from_lengths(&[8, 8, 3], 7),
            Err(DeflateError::InvalidCodeLength { length: 8, max: 7 })
        );
    }

    #[test]
    fn test_decode_rejects_oversubscribed() {
        assert_eq!(
            DecodeTable::from_lengths(&[1, 1, 1], 15),
            Err(DeflateError::OversubscribedCode)
        );
    }

    #[test]
    fn test_decode_incomplete_code_rejects_unused_pattern() {
        // One 1-bit code: "0" decodes, "1" matches nothing.
        let table = DecodeTable::from_lengths(&[0, 1], 15).unwrap();
        let data = [0b0000_0010];
        let mut reader = BitReader::new(&data);
        assert_eq!(table.decode(&mut reader).unwrap(), 1);
        let ones = [0xFF, 0xFF];
        let mut reader = BitReader::new(&ones);
        assert_eq!(table.decode(&mut reader), Err(DeflateError::InvalidSymbol));
    }

    #[test]
    fn test_frequencies_simple() {
        let table = EncodeTable::from_frequencies(&[5, 2, 1, 1], 15).unwrap();
        assert_eq!(table.lengths(), &[1, 2, 3, 3]);
        assert_eq!(table.cost(&[5, 2, 1, 1]), 5 + 4 + 3 + 3);
    }

    #[test]
    fn test_frequencies_one_and_two_symbols() {
        let table = EncodeTable::from_frequencies(&[0, 0, 7, 0], 15).unwrap();
        assert_eq!(table.lengths(), &[0, 0, 1, 0]);

        let table = EncodeTable::from_frequencies(&[3, 0, 0, 9], 7).unwrap();
        assert_eq!(table.lengths(), &[1, 0, 0, 1]);

        let table = EncodeTable::from_frequencies(&[0, 0, 0], 7).unwrap();
        assert_eq!(table.lengths(), &[0, 0, 0]);
    }

    #[test]
    fn test_frequencies_three_symbols() {
        let table = EncodeTable::from_frequencies(&[1, 1, 2], 15).unwrap();
        assert_eq!(table.lengths(), &[2, 2, 1]);
    }

    #[test]
    fn test_frequencies_length_limited() {
        // Fibonacci weights give a maximally skewed tree (depth n - 1).
        let mut freqs = vec![1u32, 1];
        while freqs.len() < 20 {
            let next = freqs[freqs.len() - 1] + freqs[freqs.len() - 2];
            freqs.push(next);
        }

        let unlimited = EncodeTable::from_frequencies(&freqs, 15).unwrap();
        assert_eq!(unlimited.lengths().iter().max(), Some(&15));

        let limited = EncodeTable::from_frequencies(&freqs, 7).unwrap();
        assert!(limited.lengths().iter().all(|&l| (1..=7).contains(&l)));
        assert_eq!(kraft_sum(limited.lengths()), 1 << 15);

        let decode = DecodeTable::from_lengths(limited.lengths(), 7).unwrap();
        assert_inverse(&limited, &decode);
    }

    #[test]
    fn test_frequencies_dominant_symbol() {
        let mut freqs = vec![1u32; 286];
        freqs[65] = 1_000_000;
        let table = EncodeTable::from_frequencies(&freqs, 15).unwrap();
        assert_eq!(table.lengths()[65], 1);
        assert!(table.lengths().iter().all(|&l| (1..=15).contains(&l)));
        assert_eq!(kraft_sum(table.lengths()), 1 << 15);
    }

    #[test]
    fn test_frequencies_code_space_exhausted() {
        let freqs = [1u32; 19];
        assert_eq!(
            EncodeTable::from_frequencies(&freqs, 4),
            Err(DeflateError::CodeSpaceExhausted {
                symbols: 19,
                max_bits: 4
            })
        );
    }

    #[test]
    fn test_built_tables_are_inverse() {
        let freqs: Vec<u32> = (0..286u32).map(|i| (i * 7919) % 97 + (i % 3)).collect();
        let lengths = limited_code_lengths(&freqs, 15).unwrap();
        let encode = EncodeTable::from_lengths(&lengths, 15).unwrap();
        assert_eq!(
            encode.lengths(),
            EncodeTable::from_frequencies(&freqs, 15).unwrap().lengths()
        );
        let decode = DecodeTable::from_lengths(&lengths, 15).unwrap();
        assert_inverse(&encode, &decode);
    }

    #[test]
    fn test_encode_from_lengths_rejects_oversubscribed() {
        assert_eq!(
            EncodeTable::from_lengths(&[1, 1, 2], 15),
            Err(DeflateError::OversubscribedCode)
        );
    }

    #[test]
    fn test_read_dynamic_tables_rejects_repeat_without_previous() {
        // HLIT=0, HDIST=0, HCLEN=0 (4 lengths: 16, 17, 18, 0), then lengths
        // 16 -> 1 bit, 0 -> 1 bit; first symbol decoded is 16.
        let mut out = Vec::new();
        let mut writer = BitWriter::new(&mut out);
        writer.put(5, 0).unwrap();
        writer.put(5, 0).unwrap();
        writer.put(4, 0).unwrap();
        for len in [1, 0, 0, 1] {
            writer.put(3, len).unwrap();
        }
        // Canonical: symbol 0 -> "0", symbol 16 -> "1".
        writer.put(1, 1).unwrap();
        writer.put(2, 0).unwrap();
        writer.push().unwrap();

        let mut reader = BitReader::new(&out);
        assert_eq!(
            read_dynamic_tables(&mut reader),
            Err(DeflateError::InvalidRepeat)
        );
    }

    #[test]
    fn test_read_dynamic_tables_rejects_repeat_overrun() {
        // HLIT=0, HDIST=0 declare 258 lengths; two 138-zero runs overrun them.
        let mut out = Vec::new();
        let mut writer = BitWriter::new(&mut out);
        writer.put(5, 0).unwrap();
        writer.put(5, 0).unwrap();
        writer.put(4, 0).unwrap();
        // Code-length code: 18 -> "1", 0 -> "0".
        for len in [0, 0, 1, 1] {
            writer.put(3, len).unwrap();
        }
        for _ in 0..2 {
            writer.put(1, 1).unwrap();
            writer.put(7, 127).unwrap();
        }
        writer.push().unwrap();

        let mut reader = BitReader::new(&out);
        assert_eq!(
            read_dynamic_tables(&mut reader),
            Err(DeflateError::InvalidRepeat)
        );
    }

    #[test]
    fn test_read_dynamic_tables_rejects_too_many_codes() {
        let mut out = Vec::new();
        let mut writer = BitWriter::new(&mut out);
        writer.put(5, 30).unwrap(); // 287 literal codes
        writer.put(5, 0).unwrap();
        writer.put(4, 0).unwrap();
        writer.push().unwrap();

        let mut reader = BitReader::new(&out);
        assert_eq!(
            read_dynamic_tables(&mut reader),
            Err(DeflateError::TooManyCodes {
                literals: 287,
                distances: 1
            })
        );
    }
}
