//! # Raw DEFLATE
//!
//! `rawdeflate` is a safe, pure-Rust implementation of the DEFLATE format
//! (RFC 1951) without any zlib or gzip framing.
//!
//! The compressor splits its input into blocks, finds back-references with a
//! hash-chain match finder, and writes each block as stored, fixed-Huffman or
//! dynamic-Huffman, whichever is smallest. Dynamic blocks use length-limited
//! canonical codes built with the package-merge algorithm. The decompressor
//! accepts any conforming raw DEFLATE stream.
//!
//! ## Example
//!
//! ```rust
//! extern crate alloc;
//! use alloc::vec::Vec;
//! use rawdeflate::{deflate, inflate};
//!
//! let original = b"Hello world, hello world, hello world!";
//!
//! let mut compressed = Vec::new();
//! deflate(original, &mut compressed).expect("Compression failed");
//!
//! let mut buffer = Vec::new();
//! inflate(&compressed, &mut buffer).expect("Decompression failed");
//! assert_eq!(buffer, original);
//! ```
//!
//! Empty input still produces one final block, stored with length 0:
//!
//! ```rust
//! let mut compressed = Vec::new();
//! rawdeflate::deflate(&[], &mut compressed).unwrap();
//! assert_eq!(compressed, [0x01, 0x00, 0x00, 0xff, 0xff]);
//! ```

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod bitstream;
pub mod codec;
pub mod compress;
pub mod decompress;
pub mod error;
pub mod huffman;
pub mod lz77;
pub mod tables;

pub use codec::CompressionType;
pub use compress::{CompressOptions, deflate, deflate_with};
pub use decompress::inflate;
pub use error::{DeflateError, Result};
