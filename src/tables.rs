//! Format constants and the length/distance symbol tables of RFC 1951.

/// Minimum match length encodable as a back-reference.
pub const MIN_MATCH: usize = 3;

/// Maximum match length encodable as a back-reference.
pub const MAX_MATCH: usize = 258;

/// Size of the sliding window, and the largest encodable distance.
pub const WINDOW_SIZE: usize = 32768;

/// Largest number of source bytes a stored block can carry.
pub const MAX_BLOCK_SIZE: usize = 65535;

/// Maximum code length for the literal/length and distance alphabets.
pub const MAX_CODE_BITS: u8 = 15;

/// Maximum code length for the code-length alphabet.
pub const MAX_CODE_LENGTH_BITS: u8 = 7;

/// Literal/length alphabet size including the two reserved symbols.
pub const NUM_LITERAL_SYMBOLS: usize = 288;

/// Literal/length symbols that may appear in a valid stream (0..=285).
pub const NUM_LITERAL_CODES: usize = 286;

/// Distance symbols that may appear in a valid stream (0..=29).
pub const NUM_DISTANCE_CODES: usize = 30;

/// Code-length alphabet size.
pub const NUM_CODE_LENGTH_CODES: usize = 19;

/// End-of-block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// First length symbol.
pub const FIRST_LENGTH_CODE: u16 = 257;

pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

pub const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

pub const DISTANCE_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Transmission order of the code-length alphabet's own code lengths.
pub const CODE_LENGTH_ORDER: [usize; NUM_CODE_LENGTH_CODES] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// `length - 3` -> index into `LENGTH_BASE`.
const LENGTH_INDEX: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut idx = 0usize;
    let mut len = MIN_MATCH;
    while len <= MAX_MATCH {
        while idx + 1 < LENGTH_BASE.len() && LENGTH_BASE[idx + 1] as usize <= len {
            idx += 1;
        }
        table[len - MIN_MATCH] = idx as u8;
        len += 1;
    }
    table
};

/// A length or distance split into its symbol index and extra bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolCode {
    /// Index into the base/extra tables (add 257 for a length symbol).
    pub index: u16,
    /// Number of extra bits following the symbol.
    pub extra_bits: u8,
    /// Value carried by the extra bits.
    pub extra_value: u16,
}

/// Maps a match length (3..=258) to its length symbol index.
#[must_use]
pub fn length_code(length: u16) -> Option<SymbolCode> {
    let length = length as usize;
    if !(MIN_MATCH..=MAX_MATCH).contains(&length) {
        return None;
    }

    let index = LENGTH_INDEX[length - MIN_MATCH] as usize;
    Some(SymbolCode {
        index: index as u16,
        extra_bits: LENGTH_EXTRA[index],
        extra_value: (length - LENGTH_BASE[index] as usize) as u16,
    })
}

/// Maps a match distance (1..=32768) to its distance symbol.
#[must_use]
pub fn distance_code(distance: u16) -> Option<SymbolCode> {
    let distance = distance as usize;
    if !(1..=WINDOW_SIZE).contains(&distance) {
        return None;
    }

    // Distances 1..=4 map directly; above that, each pair of symbols covers
    // one power of two.
    let index = if distance <= 4 {
        distance - 1
    } else {
        let d = distance - 1;
        let msb = (usize::BITS - 1 - d.leading_zeros()) as usize;
        2 * msb + ((d >> (msb - 1)) & 1)
    };

    Some(SymbolCode {
        index: index as u16,
        extra_bits: DISTANCE_EXTRA[index],
        extra_value: (distance - DISTANCE_BASE[index] as usize) as u16,
    })
}
