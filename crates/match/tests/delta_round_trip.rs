//! Integration tests driving the whole pipeline: checksum producer, index
//! build, sync engine and reconstruction.

use std::io::Cursor;

use checksums::StrongAlgorithm;
use logging::{MemorySink, NullSink, Severity};
use matching::{
    ApplyError, BlockIndex, BlockOperation, IterSource, StrongMissPolicy, SyncConfig, SyncEngine,
    SyncError, apply_operations, build_index,
};
use proptest::prelude::*;
use signature::{
    BlockChecksum, BlockSize, ProducerConfig, RecordFault, block_checksums, spawn_checksum_producer,
};
use test_support::{FailingReader, concat_blocks, patterned_bytes, temp_file_with};
use tokio_util::sync::CancellationToken;

fn size(bytes: u32) -> BlockSize {
    BlockSize::new(bytes).expect("valid block size")
}

async fn index_from_producer(remote: Vec<u8>, block_size: BlockSize) -> BlockIndex {
    let cancel = CancellationToken::new();
    let rx = spawn_checksum_producer(
        Cursor::new(remote),
        ProducerConfig::default().with_block_size(block_size),
        cancel.clone(),
    )
    .expect("runtime available");
    build_index(rx, &cancel, &NullSink).await.expect("index builds")
}

async fn reconstruct(remote: &[u8], local: Vec<u8>, block_size: BlockSize) -> Vec<u8> {
    let index = index_from_producer(remote.to_vec(), block_size).await;
    let stream = SyncEngine::new(SyncConfig::new(block_size))
        .with_source(Cursor::new(local))
        .start(index, CancellationToken::new())
        .expect("engine starts");

    let mut output = Vec::new();
    apply_operations(stream, Cursor::new(remote.to_vec()), &mut output, block_size)
        .await
        .expect("reconstruction succeeds");
    output
}

#[tokio::test]
async fn edited_file_is_rebuilt_from_basis_and_literals() {
    let block = size(64);
    let remote = patterned_bytes(64 * 32, 1);
    let mut local = remote.clone();
    local[64 * 5..64 * 6].copy_from_slice(&patterned_bytes(64, 99));
    local.extend_from_slice(b"appended tail");

    let index = index_from_producer(remote.clone(), block).await;
    let ops = SyncEngine::new(SyncConfig::new(block))
        .with_source(Cursor::new(local.clone()))
        .start(index.clone(), CancellationToken::new())
        .expect("engine starts")
        .collect_all()
        .await;

    assert_eq!(ops.len(), 33);
    assert!(ops[5].is_literal());
    assert_eq!(ops[32].data(), Some(&b"appended tail"[..]));
    assert_eq!(ops.iter().filter(|op| op.is_copy()).count(), 31);

    let stream = SyncEngine::new(SyncConfig::new(block))
        .with_source(Cursor::new(local.clone()))
        .start(index, CancellationToken::new())
        .expect("engine starts");
    let mut output = Vec::new();
    let stats = apply_operations(stream, Cursor::new(remote), &mut output, block)
        .await
        .expect("reconstruction succeeds");

    assert_eq!(output, local);
    assert_eq!(stats.operations, 33);
    assert_eq!(stats.copied_bytes, 31 * 64);
    assert_eq!(stats.literal_bytes, 64 + 13);
}

#[tokio::test]
async fn reordered_blocks_are_copied_by_remote_ordinal() {
    let a = [b'a'; 16];
    let b = [b'b'; 16];
    let c = [b'c'; 16];
    let remote = concat_blocks(&[&a, &b, &c]);
    let local = concat_blocks(&[&c, &a, &b]);

    let index = index_from_producer(remote.clone(), size(16)).await;
    let ops = SyncEngine::new(SyncConfig::new(size(16)))
        .with_source(Cursor::new(local.clone()))
        .start(index, CancellationToken::new())
        .expect("engine starts")
        .collect_all()
        .await;

    assert_eq!(
        ops,
        vec![
            BlockOperation::Copy { ordinal: 2 },
            BlockOperation::Copy { ordinal: 0 },
            BlockOperation::Copy { ordinal: 1 },
        ]
    );
    assert_eq!(reconstruct(&remote, local.clone(), size(16)).await, local);
}

#[tokio::test]
async fn file_backed_basis_and_source() {
    let block = size(128);
    let remote = patterned_bytes(128 * 20 + 50, 7);
    let mut local = remote.clone();
    local.truncate(128 * 12);
    local.extend(patterned_bytes(300, 8));

    let remote_file = temp_file_with(&remote).expect("remote temp file");
    let local_file = temp_file_with(&local).expect("local temp file");

    let cancel = CancellationToken::new();
    let reader = tokio::fs::File::open(remote_file.path()).await.expect("open remote");
    let rx = spawn_checksum_producer(
        reader,
        ProducerConfig::default().with_block_size(block),
        cancel.clone(),
    )
    .expect("runtime available");
    let index = build_index(rx, &cancel, &NullSink).await.expect("index builds");
    assert_eq!(index.len(), 21);

    let source = tokio::fs::File::open(local_file.path()).await.expect("open local");
    let stream = SyncEngine::new(SyncConfig::new(block))
        .with_source(source)
        .start(index, CancellationToken::new())
        .expect("engine starts");

    let basis = tokio::fs::File::open(remote_file.path()).await.expect("open basis");
    let mut output = Vec::new();
    apply_operations(stream, basis, &mut output, block)
        .await
        .expect("reconstruction succeeds");
    assert_eq!(output, local);
}

#[tokio::test]
async fn faulty_records_are_reported_and_skipped() {
    let block = size(8);
    let remote = patterned_bytes(8 * 3, 5);
    let mut records: Vec<Result<BlockChecksum, RecordFault>> =
        block_checksums(&remote[..], block, StrongAlgorithm::Sha256)
            .expect("in-memory read")
            .into_iter()
            .map(Ok)
            .collect();
    records.insert(1, Err(RecordFault::malformed(Some(1), "truncated digest")));

    let sink = MemorySink::new();
    let index = build_index(IterSource::new(records), &CancellationToken::new(), &sink)
        .await
        .expect("index builds");

    assert_eq!(index.len(), 3);
    let diagnostics = sink.take();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity(), Severity::Warning);
    assert_eq!(diagnostics[0].target(), "blocksync::index");
    assert!(diagnostics[0].message().contains("truncated digest"));
}

#[tokio::test]
async fn local_read_failure_aborts_reconstruction() {
    let block = size(8);
    let remote = patterned_bytes(32, 6);
    let index = index_from_producer(remote.clone(), block).await;

    let stream = SyncEngine::new(SyncConfig::new(block))
        .with_source(FailingReader::after(remote[..16].to_vec()))
        .start(index, CancellationToken::new())
        .expect("engine starts");

    let mut output = Vec::new();
    let err = apply_operations(stream, Cursor::new(remote.clone()), &mut output, block)
        .await
        .expect_err("read failure propagates");

    match err {
        ApplyError::Aborted { ordinal, source } => {
            assert_eq!(ordinal, 2);
            assert!(matches!(source, SyncError::Read(_)));
        }
        other => panic!("expected abort, got {other:?}"),
    }
    assert_eq!(output, &remote[..16]);
}

#[tokio::test]
async fn literal_policy_makes_collisions_reconstructible() {
    let block = size(4);
    let remote = b"AAAA".to_vec();
    let fast = checksums::fast_checksum(b"AAAA");
    let index: BlockIndex = [BlockChecksum::new(0, fast, vec![0u8; 32])]
        .into_iter()
        .collect();

    let config = SyncConfig::new(block).with_strong_miss(StrongMissPolicy::Unresolved);
    let unresolved = SyncEngine::new(config)
        .with_source(Cursor::new(remote.clone()))
        .start(index.clone(), CancellationToken::new())
        .expect("engine starts");
    let err = apply_operations(unresolved, Cursor::new(Vec::new()), Vec::new(), block)
        .await
        .expect_err("unresolved block");
    assert!(matches!(err, ApplyError::Unresolved { ordinal: 0 }));

    let literal_config = SyncConfig::new(block).with_strong_miss(StrongMissPolicy::Literal);
    let literal = SyncEngine::new(literal_config)
        .with_source(Cursor::new(remote.clone()))
        .start(index, CancellationToken::new())
        .expect("engine starts");
    let mut output = Vec::new();
    apply_operations(literal, Cursor::new(Vec::new()), &mut output, block)
        .await
        .expect("literal fallback applies");
    assert_eq!(output, remote);
}

#[tokio::test]
async fn one_index_serves_concurrent_engines() {
    let block = size(32);
    let remote = patterned_bytes(32 * 16, 12);
    let index = index_from_producer(remote.clone(), block).await;

    let mut handles = Vec::new();
    for seed in 0..4u64 {
        let mut local = remote.clone();
        local[..32].copy_from_slice(&patterned_bytes(32, 100 + seed));
        let index = index.clone();
        let remote = remote.clone();
        handles.push(tokio::spawn(async move {
            let stream = SyncEngine::new(SyncConfig::new(block))
                .with_source(Cursor::new(local.clone()))
                .start(index, CancellationToken::new())
                .expect("engine starts");
            let mut output = Vec::new();
            apply_operations(stream, Cursor::new(remote), &mut output, block)
                .await
                .expect("reconstruction succeeds");
            output == local
        }));
    }

    for handle in handles {
        assert!(handle.await.expect("task completes"));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn any_source_is_reconstructed_against_any_basis(
        remote in prop::collection::vec(any::<u8>(), 0..600),
        local in prop::collection::vec(any::<u8>(), 0..600),
        block in 1u32..64,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let output = runtime.block_on(async {
            let block = size(block);
            let index: BlockIndex = block_checksums(&remote[..], block, StrongAlgorithm::Sha256)
                .expect("in-memory read")
                .into_iter()
                .collect();
            let stream = SyncEngine::new(SyncConfig::new(block))
                .with_source(Cursor::new(local.clone()))
                .start(index, CancellationToken::new())
                .expect("engine starts");
            let mut output = Vec::new();
            apply_operations(stream, Cursor::new(remote.clone()), &mut output, block)
                .await
                .map(|_| output)
        });

        match output {
            Ok(output) => prop_assert_eq!(output, local),
            // A fast collision without a strong match; vanishingly rare on random input.
            Err(ApplyError::Unresolved { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }
}
