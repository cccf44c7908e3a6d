//! Property tests for the codec.
//!
//! Covers round trips under arbitrary block sizes, validity and length limits
//! of the generated Huffman codes, and the bounds of the match finder.

use proptest::prelude::*;
use rawdeflate::bitstream::{BitReader, BitWriter};
use rawdeflate::huffman::{DecodeTable, EncodeTable};
use rawdeflate::lz77::{Token, tokenize};
use rawdeflate::{CompressOptions, deflate, deflate_with, inflate};

/// Sum of `2^(max_bits - len)` over coded symbols; a complete code sums to
/// `2^max_bits`.
fn kraft_sum(lengths: &[u8], max_bits: u8) -> u64 {
    lengths
        .iter()
        .filter(|&&l| l > 0)
        .map(|&l| 1u64 << (max_bits - l))
        .sum()
}

/// Bytes over a small alphabet, so the match finder has work to do.
fn compressible_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0u8..4, 0..max_len)
}

/// A mix of arbitrary and repetitive input.
fn any_input() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        proptest::collection::vec(any::<u8>(), 0..4096),
        compressible_bytes(8192),
        (any::<u8>(), 0usize..1000).prop_map(|(b, n)| vec![b; n]),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip(data in any_input()) {
        let mut compressed = Vec::new();
        deflate(&data, &mut compressed).unwrap();
        let mut decoded = Vec::new();
        inflate(&compressed, &mut decoded).unwrap();
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn prop_round_trip_any_block_size(data in any_input(), block_size in 1usize..70_000) {
        let options = CompressOptions::new().with_block_size(block_size);
        let mut compressed = Vec::new();
        deflate_with(&data, &mut compressed, &options).unwrap();
        let mut decoded = Vec::new();
        inflate(&compressed, &mut decoded).unwrap();
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn prop_inflate_never_panics(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut out = Vec::new();
        let _ = inflate(&data, &mut out);
    }

    #[test]
    fn prop_code_is_canonical_and_complete(
        freqs in proptest::collection::vec(0u32..10_000, 2..286)
    ) {
        let table = EncodeTable::from_frequencies(&freqs, 15).unwrap();
        let lengths = table.lengths();
        let used = freqs.iter().filter(|&&f| f > 0).count();

        for (&f, &l) in freqs.iter().zip(lengths) {
            prop_assert_eq!(f == 0, l == 0);
            prop_assert!(l <= 15);
        }
        if used >= 2 {
            prop_assert_eq!(kraft_sum(lengths, 15), 1 << 15);
        }

        // The lengths pass decoder validation and every code decodes back
        // to its own symbol.
        let decode = DecodeTable::from_lengths(lengths, 15).unwrap();
        let symbols: Vec<usize> = (0..lengths.len()).filter(|&s| lengths[s] > 0).collect();
        let mut bits = Vec::new();
        let mut writer = BitWriter::new(&mut bits);
        for &s in &symbols {
            table.put(&mut writer, s).unwrap();
        }
        writer.push().unwrap();

        let mut reader = BitReader::new(&bits);
        for &s in &symbols {
            prop_assert_eq!(decode.decode(&mut reader).unwrap() as usize, s);
        }
    }

    #[test]
    fn prop_length_limit_holds_for_skewed_frequencies(
        dominant in 1_000_000u32..2_000_000_000,
        singles in 2usize..19,
        max_bits in 5u8..=7,
    ) {
        let mut freqs = vec![1u32; singles];
        freqs[0] = dominant;
        let table = EncodeTable::from_frequencies(&freqs, max_bits).unwrap();
        prop_assert!(table.lengths().iter().all(|&l| (1..=max_bits).contains(&l)));
        prop_assert_eq!(kraft_sum(table.lengths(), max_bits), 1 << max_bits);
    }

    #[test]
    fn prop_length_limit_holds_for_fibonacci_weights(n in 16usize..40) {
        // Fibonacci weights force the deepest possible unlimited tree.
        let mut freqs = vec![1u32, 1];
        while freqs.len() < n {
            let next = freqs[freqs.len() - 1].saturating_add(freqs[freqs.len() - 2]);
            freqs.push(next);
        }
        let table = EncodeTable::from_frequencies(&freqs, 15).unwrap();
        prop_assert!(table.lengths().iter().all(|&l| (1..=15).contains(&l)));
        prop_assert_eq!(kraft_sum(table.lengths(), 15), 1 << 15);
    }

    #[test]
    fn prop_match_finder_bounds(data in compressible_bytes(40_000)) {
        let block = tokenize(&data, 4096, 32).unwrap();
        let mut out: Vec<u8> = Vec::new();

        for token in block.tokens {
            match token {
                Token::Literal(b) => out.push(b),
                Token::Match { length, distance } => {
                    let (length, distance) = (length as usize, distance as usize);
                    prop_assert!((3..=258).contains(&length));
                    prop_assert!(distance >= 1 && distance <= 32_768);
                    prop_assert!(distance <= out.len());
                    let start = out.len() - distance;
                    for i in 0..length {
                        out.push(out[start + i]);
                    }
                }
            }
        }
        prop_assert_eq!(out, data);
    }
}
