use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tsrng_core::vdf::{derive_prime, int_from_seed, vdf_encode};

fn benchmark_prime_derivation(c: &mut Criterion) {
    c.bench_function("derive_prime_512_bits", |b| {
        b.iter(|| {
            let p = derive_prime(black_box(b"bench-seed"), black_box(512)).unwrap();
            black_box(p);
        });
    });
}

fn benchmark_vdf_encode(c: &mut Criterion) {
    let p = derive_prime(b"bench-modulus", 512).unwrap();
    let x = int_from_seed(b"bench-start", &p);
    c.bench_function("vdf_encode_10000_squarings", |b| {
        b.iter(|| {
            let y = vdf_encode(black_box(&x), black_box(10_000), black_box(&p));
            black_box(y);
        });
    });
}

criterion_group!(benches, benchmark_prime_derivation, benchmark_vdf_encode);
criterion_main!(benches);
