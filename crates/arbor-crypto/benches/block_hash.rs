use arbor_crypto::BlockHasher;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_block_hash(c: &mut Criterion) {
    let data: Vec<u8> = (0..1024 * 1024).map(|i| (i % 251) as u8).collect();

    c.bench_function("sha1_block_1mb", |b| {
        b.iter(|| BlockHasher::SHA1.hash(black_box(&data)))
    });
    c.bench_function("blake3_block_1mb", |b| {
        b.iter(|| BlockHasher::BLAKE3.hash(black_box(&data)))
    });
}

criterion_group!(benches, bench_block_hash);
criterion_main!(benches);
