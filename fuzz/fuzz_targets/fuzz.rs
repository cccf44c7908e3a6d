#![no_main]

use libfuzzer_sys::fuzz_target;
use rawdeflate::{CompressOptions, deflate_with, inflate};

/// Arbitrary bytes fed to the decoder must produce `Ok` or `Err`, never a
/// panic.
fn check_inflate_robustness(data: &[u8]) {
    let mut output = Vec::new();
    let _ = inflate(data, &mut output);
}

/// `inflate(deflate(data)) == data`, with the block size taken from the
/// first two input bytes so block splitting is exercised too.
fn check_round_trip(data: &[u8]) {
    let (block_size, payload) = match data {
        [a, b, rest @ ..] => (usize::from(u16::from_le_bytes([*a, *b])), rest),
        _ => (usize::MAX, data),
    };
    let options = CompressOptions::new().with_block_size(block_size);

    let mut compressed = Vec::new();
    if let Err(e) = deflate_with(payload, &mut compressed, &options) {
        panic!("deflate failed on {} bytes: {e:?}", payload.len());
    }

    let mut decompressed = Vec::new();
    match inflate(&compressed, &mut decompressed) {
        Ok(()) => assert!(
            decompressed == payload,
            "round-trip mismatch: input {} bytes, compressed {}, decompressed {}",
            payload.len(),
            compressed.len(),
            decompressed.len()
        ),
        Err(e) => panic!(
            "inflate rejected our own stream: {e:?} (input {} bytes, block size {})",
            payload.len(),
            options.block_size()
        ),
    }
}

fuzz_target!(|data: &[u8]| {
    check_inflate_robustness(data);
    check_round_trip(data);
});
