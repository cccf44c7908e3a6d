use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rawdeflate::{CompressOptions, deflate, deflate_with, inflate};
use std::hint::black_box;

/// Source size per scenario: one full block.
const SIZE: usize = 64 * 1024;

/// Deterministic high-entropy bytes; these end up in stored blocks.
fn generate_random(size: usize) -> Vec<u8> {
    let mut seed: u64 = 0xDEAD_BEEF;
    (0..size)
        .map(|_| {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (seed >> 56) as u8
        })
        .collect()
}

/// Prose-like bytes: a few sentences interleaved so matches vary in length
/// and distance.
fn generate_text(size: usize) -> Vec<u8> {
    let sentences: [&[u8]; 4] = [
        b"The quick brown fox jumps over the lazy dog. ",
        b"Pack my box with five dozen liquor jugs! ",
        b"How vexingly quick daft zebras jump; ",
        b"Sphinx of black quartz, judge my vow. ",
    ];
    let mut vec = Vec::with_capacity(size + 64);
    let mut i = 0usize;
    while vec.len() < size {
        vec.extend_from_slice(sentences[(i * 7 + i / 3) % sentences.len()]);
        i += 1;
    }
    vec.truncate(size);
    vec
}

/// Bytes drawn from a skewed alphabet without long repeats, which favours
/// dynamic Huffman blocks.
fn generate_skewed(size: usize) -> Vec<u8> {
    let alphabet = b"eeeeeeeetttttaaaooiinnsshrdlcumwfgypbvkjxqz";
    generate_random(size)
        .into_iter()
        .map(|b| alphabet[b as usize % alphabet.len()])
        .collect()
}

fn scenarios() -> [(&'static str, Vec<u8>); 4] {
    [
        ("Zeroes", vec![0u8; SIZE]),
        ("Random", generate_random(SIZE)),
        ("Text", generate_text(SIZE)),
        ("Skewed", generate_skewed(SIZE)),
    ]
}

/// Compression throughput per data pattern with default options.
fn bench_deflate(c: &mut Criterion) {
    let mut group = c.benchmark_group("Deflate");
    group.throughput(Throughput::Bytes(SIZE as u64));

    for (name, input_data) in &scenarios() {
        group.bench_function(format!("{name} 64KB"), |b| {
            let mut output = Vec::with_capacity(SIZE);
            b.iter(|| {
                output.clear();
                deflate(black_box(input_data), black_box(&mut output)).unwrap();
            });
        });
    }

    group.finish();
}

/// Cost of the match finder's chain budget on text.
fn bench_chain_budget(c: &mut Criterion) {
    let mut group = c.benchmark_group("Deflate chain budget");
    group.throughput(Throughput::Bytes(SIZE as u64));
    let input_data = generate_text(SIZE);

    for max_chain in [16usize, 256, 4096] {
        let options = CompressOptions::new().with_max_chain(max_chain);
        group.bench_with_input(BenchmarkId::from_parameter(max_chain), &options, |b, options| {
            let mut output = Vec::with_capacity(SIZE);
            b.iter(|| {
                output.clear();
                deflate_with(black_box(&input_data), black_box(&mut output), options).unwrap();
            });
        });
    }

    group.finish();
}

/// Decompression throughput, measured against the uncompressed size.
fn bench_inflate(c: &mut Criterion) {
    let mut group = c.benchmark_group("Inflate");
    group.throughput(Throughput::Bytes(SIZE as u64));

    for (name, source_data) in &scenarios() {
        let mut compressed_data = Vec::new();
        deflate(source_data, &mut compressed_data).unwrap();

        group.bench_function(format!("{name} 64KB"), |b| {
            let mut output = Vec::with_capacity(SIZE);
            b.iter(|| {
                output.clear();
                inflate(black_box(&compressed_data), black_box(&mut output)).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_deflate, bench_chain_budget, bench_inflate);
criterion_main!(benches);
