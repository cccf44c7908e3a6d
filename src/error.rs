use thiserror::Error;

/// Errors raised while compressing or decompressing a DEFLATE stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeflateError {
    #[error("Unexpected end of stream at byte {position}")]
    UnexpectedEof { position: usize },

    #[error("Invalid block type {0}")]
    InvalidBlockType(u8),

    #[error("Stored block length {len:#06x} does not match its complement {nlen:#06x}")]
    StoredLengthMismatch { len: u16, nlen: u16 },

    #[error("Huffman code does not map to a valid symbol")]
    InvalidSymbol,

    #[error("Code length {length} exceeds the maximum of {max}")]
    InvalidCodeLength { length: u8, max: u8 },

    #[error("Code lengths over-subscribe the code space")]
    OversubscribedCode,

    #[error("Code length repeat has no source or overruns the table")]
    InvalidRepeat,

    #[error("Too many codes: {literals} literal/length, {distances} distance")]
    TooManyCodes { literals: usize, distances: usize },

    #[error("Literal/length table has no end-of-block code")]
    MissingEndOfBlock,

    #[error("Distance {distance} reaches before the start of the output ({available} bytes)")]
    InvalidDistance { distance: usize, available: usize },

    #[error("Match (length {length}, distance {distance}) cannot be encoded")]
    InvalidMatch { length: u16, distance: u16 },

    #[error("{symbols} symbols do not fit in codes of at most {max_bits} bits")]
    CodeSpaceExhausted { symbols: usize, max_bits: u8 },

    #[error("Memory allocation failed")]
    OutOfMemory,

    #[error("Unsupported compression type {0}")]
    UnsupportedCompression(u8),
}

impl From<alloc::collections::TryReserveError> for DeflateError {
    fn from(_: alloc::collections::TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

pub type Result<T> = core::result::Result<T, DeflateError>;
