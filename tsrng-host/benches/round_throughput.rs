//! Benchmarks the round transitions end to end against a scratch data
//! root, mirroring `lib/benches` and `host/benches` in the teacher
//! crate: one Criterion function per hot path. Each iteration commits a
//! fresh round (ids are random) so repeated runs never collide.

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tsrng_host::{round, ManifestStore};

fn scratch_store(label: &str) -> ManifestStore {
    let dir = std::env::temp_dir().join(format!(
        "tsrng-bench-{label}-{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    ManifestStore::new(dir)
}

fn demo_streams(leaves_per_stream: usize, leaf_size: usize) -> BTreeMap<String, Vec<Vec<u8>>> {
    let mut streams = BTreeMap::new();
    for name in ["alpha", "beta", "gamma"] {
        let leaves = (0..leaves_per_stream)
            .map(|i| vec![i as u8; leaf_size])
            .collect();
        streams.insert(name.to_string(), leaves);
    }
    streams
}

fn benchmark_commit(c: &mut Criterion) {
    let store = scratch_store("commit");
    c.bench_function("commit_3_streams_64_leaves", |b| {
        b.iter(|| {
            let streams = demo_streams(black_box(64), black_box(64));
            let manifest = round::commit(&store, "bench".to_string(), streams, 64).unwrap();
            black_box(manifest);
        });
    });
}

fn benchmark_beacon(c: &mut Criterion) {
    let store = scratch_store("beacon");
    c.bench_function("beacon_vdf_t_50", |b| {
        b.iter(|| {
            let streams = demo_streams(4, 64);
            let manifest = round::commit(&store, "bench".to_string(), streams, 64).unwrap();
            let record = round::beacon(
                &store,
                &manifest.round_id,
                black_box("00".repeat(32)),
                black_box(50),
                black_box(256),
            )
            .unwrap();
            black_box(record);
        });
    });
}

fn benchmark_finalize(c: &mut Criterion) {
    let store = scratch_store("finalize");
    c.bench_function("finalize_output_bits_512", |b| {
        b.iter(|| {
            let streams = demo_streams(64, 64);
            let manifest = round::commit(&store, "bench".to_string(), streams, 64).unwrap();
            round::beacon(&store, &manifest.round_id, "00".repeat(32), 10, 256).unwrap();
            let outcome = round::finalize(&store, &manifest.round_id, black_box(512), None).unwrap();
            black_box(outcome);
        });
    });
}

criterion_group!(benches, benchmark_commit, benchmark_beacon, benchmark_finalize);
criterion_main!(benches);
