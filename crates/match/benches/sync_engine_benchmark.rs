//! Block matching throughput.
//!
//! ```bash
//! cargo bench -p matching --bench sync_engine_benchmark
//! cargo bench -p matching --bench sync_engine_benchmark -- "block_matcher"
//! ```
//!
//! Three groups:
//!
//! 1. **index_build** - freezing records into a [`BlockIndex`]
//! 2. **block_matcher** - per-block classification on hits and misses
//! 3. **sync_engine** - the full task and channel pipeline over an in-memory source

use std::hint::black_box;
use std::io::Cursor;
use std::num::NonZeroUsize;

use checksums::StrongAlgorithm;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use matching::{BlockIndex, BlockMatcher, StrongMissPolicy, SyncConfig, SyncEngine};
use signature::{BlockChecksum, BlockSize, block_checksums};
use test_support::patterned_bytes;
use tokio_util::sync::CancellationToken;

const BLOCK: u32 = 6 * 1024;

fn records_for(data: &[u8]) -> Vec<BlockChecksum> {
    let size = BlockSize::new(BLOCK).unwrap();
    block_checksums(data, size, StrongAlgorithm::Sha256).unwrap()
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for mib in [1usize, 16] {
        let records = records_for(&patterned_bytes(mib << 20, 1));
        group.throughput(Throughput::Elements(records.len() as u64));
        group.bench_with_input(BenchmarkId::new("freeze", mib), &records, |b, records| {
            b.iter(|| black_box(records.iter().cloned().collect::<BlockIndex>()));
        });
    }

    group.finish();
}

fn bench_block_matcher(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_matcher");
    let block = BLOCK as usize;

    let remote = patterned_bytes(4 << 20, 2);
    let index: BlockIndex = records_for(&remote).into_iter().collect();
    let unrelated = patterned_bytes(4 << 20, 3);

    group.throughput(Throughput::Bytes(remote.len() as u64));
    group.bench_function("all_hits", |b| {
        let mut matcher = BlockMatcher::new(
            index.clone(),
            StrongAlgorithm::Sha256.hasher(),
            StrongMissPolicy::Unresolved,
        );
        b.iter(|| {
            for (ordinal, chunk) in remote.chunks(block).enumerate() {
                black_box(matcher.classify(ordinal as u64, black_box(chunk)));
            }
        });
    });

    group.throughput(Throughput::Bytes(unrelated.len() as u64));
    group.bench_function("all_misses", |b| {
        let mut matcher = BlockMatcher::new(
            index.clone(),
            StrongAlgorithm::Sha256.hasher(),
            StrongMissPolicy::Unresolved,
        );
        b.iter(|| {
            for (ordinal, chunk) in unrelated.chunks(block).enumerate() {
                black_box(matcher.classify(ordinal as u64, black_box(chunk)));
            }
        });
    });

    group.finish();
}

fn bench_sync_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_engine");
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .build()
        .unwrap();

    let data = patterned_bytes(8 << 20, 4);
    let index: BlockIndex = records_for(&data).into_iter().collect();
    group.throughput(Throughput::Bytes(data.len() as u64));

    for capacity in [1usize, 16] {
        let config = SyncConfig::new(BlockSize::new(BLOCK).unwrap())
            .with_channel_capacity(NonZeroUsize::new(capacity).unwrap());
        group.bench_with_input(
            BenchmarkId::new("identical_8MiB", capacity),
            &config,
            |b, config| {
                b.iter(|| {
                    runtime.block_on(async {
                        let stream = SyncEngine::new(*config)
                            .with_source(Cursor::new(data.clone()))
                            .start(index.clone(), CancellationToken::new())
                            .unwrap();
                        black_box(stream.collect_all().await.len())
                    })
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_index_build,
    bench_block_matcher,
    bench_sync_engine
);
criterion_main!(benches);
