//! LZ77 tokenisation with a hash-chain match finder.
//!
//! Each block is turned into a sequence of [`Token`]s plus the symbol
//! frequencies the Huffman stage needs. Matches never reach outside the block
//! being tokenised.

use alloc::vec::Vec;

use crate::error::{DeflateError, Result};
use crate::tables::{
    END_OF_BLOCK, FIRST_LENGTH_CODE, MAX_MATCH, MIN_MATCH, NUM_DISTANCE_CODES, NUM_LITERAL_CODES,
    WINDOW_SIZE, distance_code, length_code,
};

/// log2 of the number of hash buckets.
const HASH_BITS: u32 = 15;

const HASH_SIZE: usize = 1 << HASH_BITS;

/// Knuth's multiplicative hashing constant.
const HASH_MUL: u32 = 2_654_435_761;

/// Marker for an empty head or chain slot.
const NO_POS: u32 = u32::MAX;

/// One LZ77 output element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A byte copied to the output as is.
    Literal(u8),
    /// Copy `length` bytes (3..=258) starting `distance` bytes (1..=32768)
    /// back in the output.
    Match { length: u16, distance: u16 },
}

/// Symbol counts for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frequencies {
    /// Literal/length symbol counts; end-of-block is counted once up front.
    pub literals: [u32; NUM_LITERAL_CODES],
    /// Distance symbol counts.
    pub distances: [u32; NUM_DISTANCE_CODES],
    /// Extra bits carried by every length and distance recorded so far.
    pub extra_bits: u64,
}

impl Default for Frequencies {
    fn default() -> Self {
        Self::new()
    }
}

impl Frequencies {
    #[must_use]
    pub const fn new() -> Self {
        let mut literals = [0; NUM_LITERAL_CODES];
        literals[END_OF_BLOCK as usize] = 1;
        Self {
            literals,
            distances: [0; NUM_DISTANCE_CODES],
            extra_bits: 0,
        }
    }

    /// Counts the symbols `token` will be coded with.
    pub fn record(&mut self, token: Token) -> Result<()> {
        match token {
            Token::Literal(byte) => self.literals[byte as usize] += 1,
            Token::Match { length, distance } => {
                let (Some(len), Some(dist)) = (length_code(length), distance_code(distance))
                else {
                    return Err(DeflateError::InvalidMatch { length, distance });
                };
                self.literals[(FIRST_LENGTH_CODE + len.index) as usize] += 1;
                self.distances[dist.index as usize] += 1;
                self.extra_bits += u64::from(len.extra_bits) + u64::from(dist.extra_bits);
            }
        }
        Ok(())
    }
}

/// The tokenised form of one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lz77Block {
    pub tokens: Vec<Token>,
    pub frequencies: Frequencies,
}

/// Hash-chain index over the 3-byte prefixes of a block.
///
/// The tables are reused across blocks; [`MatchFinder::tokenize`] clears the
/// bucket heads before every block.
pub struct MatchFinder {
    /// Most recent position per hash bucket.
    head: Vec<u32>,
    /// `prev[pos % WINDOW_SIZE]` is the previous position with the same hash.
    prev: Vec<u32>,
    max_chain: usize,
    good_match: usize,
}

impl MatchFinder {
    /// Allocates the hash tables.
    ///
    /// `max_chain` bounds the chain entries examined per position; once a
    /// match of `good_match` bytes is found, the remaining budget is
    /// quartered.
    pub fn new(max_chain: usize, good_match: usize) -> Result<Self> {
        let mut head = Vec::new();
        head.try_reserve_exact(HASH_SIZE)?;
        head.resize(HASH_SIZE, NO_POS);

        let mut prev = Vec::new();
        prev.try_reserve_exact(WINDOW_SIZE)?;
        prev.resize(WINDOW_SIZE, NO_POS);

        Ok(Self {
            head,
            prev,
            max_chain,
            good_match,
        })
    }

    fn reset(&mut self) {
        self.head.fill(NO_POS);
    }

    /// Hashes the 3 bytes at `pos`. The caller ensures they exist.
    #[inline]
    fn hash(data: &[u8], pos: usize) -> usize {
        let v = u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], 0]);
        (v.wrapping_mul(HASH_MUL) >> (32 - HASH_BITS)) as usize
    }

    /// Makes `pos` visible to later searches.
    fn insert(&mut self, data: &[u8], pos: usize) {
        if pos + MIN_MATCH <= data.len() {
            let h = Self::hash(data, pos);
            self.prev[pos % WINDOW_SIZE] = self.head[h];
            self.head[h] = pos as u32;
        }
    }

    /// Finds the longest earlier occurrence of the bytes at `pos`.
    ///
    /// Returns `(length, distance)` for matches of at least 3 bytes. Among
    /// equally long candidates the most recent one wins.
    #[must_use]
    pub fn find(&self, data: &[u8], pos: usize) -> Option<(usize, usize)> {
        let max_len = (data.len() - pos).min(MAX_MATCH);
        if max_len < MIN_MATCH {
            return None;
        }

        let mut candidate = self.head[Self::hash(data, pos)];
        let mut budget = self.max_chain;
        let mut quartered = false;
        let mut best_len = 0;
        let mut best_pos = 0;

        while candidate != NO_POS && budget > 0 {
            let cand = candidate as usize;
            // Chains only ever point backwards, and never further than the
            // window.
            if cand >= pos || pos - cand > WINDOW_SIZE {
                break;
            }

            if !quartered && best_len >= self.good_match {
                budget /= 4;
                quartered = true;
                if budget == 0 {
                    break;
                }
            }
            budget -= 1;

            // Fail fast on the byte that would extend the current best.
            if data[cand + best_len] == data[pos + best_len] {
                let len = common_prefix_len(&data[pos..pos + max_len], &data[cand..], max_len);
                if len > best_len {
                    best_len = len;
                    best_pos = cand;
                    if len == max_len {
                        break;
                    }
                }
            }

            let next = self.prev[cand % WINDOW_SIZE];
            if next == NO_POS || next as usize >= cand {
                break;
            }
            candidate = next;
        }

        (best_len >= MIN_MATCH).then(|| (best_len, pos - best_pos))
    }

    /// Tokenises one block (at most 65535 bytes) and counts its symbols.
    pub fn tokenize(&mut self, block: &[u8]) -> Result<Lz77Block> {
        debug_assert!(block.len() < NO_POS as usize);
        self.reset();

        let mut tokens = Vec::new();
        tokens.try_reserve(block.len())?;
        let mut frequencies = Frequencies::new();

        let mut pos = 0;
        while pos < block.len() {
            let token = match self.find(block, pos) {
                Some((length, distance)) => {
                    // Index every covered position so later matches can
                    // start inside this one.
                    for p in pos..pos + length {
                        self.insert(block, p);
                    }
                    pos += length;
                    Token::Match {
                        length: length as u16,
                        distance: distance as u16,
                    }
                }
                None => {
                    self.insert(block, pos);
                    let byte = block[pos];
                    pos += 1;
                    Token::Literal(byte)
                }
            };

            frequencies.record(token)?;
            tokens.push(token);
        }

        Ok(Lz77Block {
            tokens,
            frequencies,
        })
    }
}

/// Tokenises `block` with freshly allocated hash tables.
pub fn tokenize(block: &[u8], max_chain: usize, good_match: usize) -> Result<Lz77Block> {
    MatchFinder::new(max_chain, good_match)?.tokenize(block)
}

/// Finds the length of the common prefix between two slices, up to `max`.
#[inline]
fn common_prefix_len(a: &[u8], b: &[u8], max: usize) -> usize {
    let limit = a.len().min(b.len()).min(max);
    a[..limit]
        .iter()
        .zip(&b[..limit])
        .take_while(|(x, y)| x == y)
        .count()
}

/// Expands tokens back into bytes. Used to check tokenisations.
#[cfg(test)]
pub(crate) fn expand(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::new();
    for token in tokens {
        match *token {
            Token::Literal(b) => out.push(b),
            Token::Match { length, distance } => {
                let start = out.len() - distance as usize;
                for i in 0..length as usize {
                    out.push(out[start + i]);
                }
            }
        }
    }
    out
}
