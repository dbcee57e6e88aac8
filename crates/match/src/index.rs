//! Lookup table from fast checksum to candidate remote blocks.
//!
//! Construction happens in two phases. A [`BlockIndexBuilder`] accumulates
//! records; [`BlockIndexBuilder::freeze`] turns it into a [`BlockIndex`], a
//! cheaply cloneable read-only handle that any number of sync engines can
//! share without locks. `BlockIndex` has no mutating methods, so a bucket can
//! never change once an engine holds it.
//!
//! Buckets keep arrival order. When several records share a fast checksum the
//! engine compares strong digests in that order and the first match wins.

use std::future::Future;
use std::sync::Arc;

use logging::{Diagnostic, DiagnosticSink};
use rustc_hash::FxHashMap;
use signature::{BlockChecksum, ChecksumRecord};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::{Cancelled, IndexBuildError};

/// Diagnostic target used for skipped records.
pub const INDEX_TARGET: &str = "blocksync::index";

/// Lazy sequence of checksum records consumed by [`build_index`].
pub trait ChecksumSource {
    /// Waits for the next record; `None` once the sequence is exhausted.
    fn next_record(&mut self) -> impl Future<Output = Option<ChecksumRecord>> + Send;
}

impl ChecksumSource for mpsc::Receiver<ChecksumRecord> {
    fn next_record(&mut self) -> impl Future<Output = Option<ChecksumRecord>> + Send {
        self.recv()
    }
}

impl ChecksumSource for mpsc::UnboundedReceiver<ChecksumRecord> {
    fn next_record(&mut self) -> impl Future<Output = Option<ChecksumRecord>> + Send {
        self.recv()
    }
}

/// Adapts an iterator of records into a [`ChecksumSource`].
#[derive(Clone, Debug)]
pub struct IterSource<I>(I);

impl<I> IterSource<I> {
    /// Wraps `iter`.
    pub fn new<T>(iter: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self(iter.into_iter())
    }
}

impl<I> ChecksumSource for IterSource<I>
where
    I: Iterator<Item = ChecksumRecord> + Send,
{
    fn next_record(&mut self) -> impl Future<Output = Option<ChecksumRecord>> + Send {
        std::future::ready(self.0.next())
    }
}

/// Builds a [`BlockIndex`] from a lazy sequence of checksum records.
///
/// Records are consumed until the source is exhausted. The cancellation token
/// is checked once per record, after it arrives and before it is processed;
/// waiting for the next record is not interrupted. Faulty records are reported
/// to `sink` and skipped.
///
/// # Errors
///
/// Returns [`IndexBuildError::Cancelled`], carrying the partial index, when
/// `cancel` fires before the source is exhausted.
#[cfg_attr(feature = "tracing", instrument(skip_all, name = "build_index"))]
pub async fn build_index<S>(
    mut source: S,
    cancel: &CancellationToken,
    sink: &dyn DiagnosticSink,
) -> Result<BlockIndex, IndexBuildError>
where
    S: ChecksumSource,
{
    let mut builder = BlockIndexBuilder::new();
    let mut processed = 0u64;
    let mut skipped = 0u64;

    while let Some(record) = source.next_record().await {
        if cancel.is_cancelled() {
            logging::trace_index!(processed, "lookup table build cancelled");
            return Err(IndexBuildError::Cancelled {
                partial: builder.freeze(),
                processed,
                source: Cancelled,
            });
        }

        match record {
            Ok(checksum) => builder.push(checksum),
            Err(fault) => {
                skipped += 1;
                sink.record(Diagnostic::warning(
                    INDEX_TARGET,
                    format!("skipping checksum record: {fault}"),
                ));
            }
        }
        processed += 1;
    }

    logging::trace_index!(
        records = builder.len(),
        buckets = builder.buckets.len(),
        skipped,
        "lookup table built"
    );
    Ok(builder.freeze())
}

/// Mutable accumulator for a [`BlockIndex`].
#[derive(Debug, Default)]
pub struct BlockIndexBuilder {
    buckets: FxHashMap<u32, Vec<BlockChecksum>>,
    records: usize,
}

impl BlockIndexBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder sized for roughly `records` distinct fast checksums.
    #[must_use]
    pub fn with_capacity(records: usize) -> Self {
        Self {
            buckets: FxHashMap::with_capacity_and_hasher(records, Default::default()),
            records: 0,
        }
    }

    /// Appends `checksum` to the bucket for its fast checksum.
    pub fn push(&mut self, checksum: BlockChecksum) {
        self.buckets
            .entry(checksum.fast())
            .or_default()
            .push(checksum);
        self.records += 1;
    }

    /// Number of records pushed so far.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records
    }

    /// Reports whether nothing has been pushed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Finishes construction, returning the read-only index.
    #[must_use]
    pub fn freeze(self) -> BlockIndex {
        let buckets = self
            .buckets
            .into_iter()
            .map(|(fast, bucket)| (fast, bucket.into_boxed_slice()))
            .collect();
        BlockIndex {
            inner: Arc::new(IndexInner {
                buckets,
                records: self.records,
            }),
        }
    }
}

impl Extend<BlockChecksum> for BlockIndexBuilder {
    fn extend<T: IntoIterator<Item = BlockChecksum>>(&mut self, iter: T) {
        for checksum in iter {
            self.push(checksum);
        }
    }
}

#[derive(Debug, Default)]
struct IndexInner {
    buckets: FxHashMap<u32, Box<[BlockChecksum]>>,
    records: usize,
}

/// Read-only lookup table from fast checksum to candidate remote blocks.
///
/// Cloning is cheap and shares the underlying table.
#[derive(Clone, Debug, Default)]
pub struct BlockIndex {
    inner: Arc<IndexInner>,
}

impl BlockIndex {
    /// Returns the bucket of records whose fast checksum is `fast`, in arrival order.
    #[inline]
    #[must_use]
    pub fn get(&self, fast: u32) -> Option<&[BlockChecksum]> {
        self.inner.buckets.get(&fast).map(AsRef::as_ref)
    }

    /// Reports whether any record has fast checksum `fast`.
    #[inline]
    #[must_use]
    pub fn contains(&self, fast: u32) -> bool {
        self.inner.buckets.contains_key(&fast)
    }

    /// Returns the first record in the `fast` bucket whose strong digest equals `strong`.
    #[must_use]
    pub fn find(&self, fast: u32, strong: &[u8]) -> Option<&BlockChecksum> {
        self.get(fast)?
            .iter()
            .find(|candidate| candidate.strong() == strong)
    }

    /// Number of distinct fast checksums.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.inner.buckets.len()
    }

    /// Total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.records
    }

    /// Reports whether the index holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.records == 0
    }

    /// Iterates over `(fast, bucket)` pairs in unspecified order.
    pub fn buckets(&self) -> impl Iterator<Item = (u32, &[BlockChecksum])> {
        self.inner
            .buckets
            .iter()
            .map(|(fast, bucket)| (*fast, bucket.as_ref()))
    }
}

impl FromIterator<BlockChecksum> for BlockIndex {
    fn from_iter<T: IntoIterator<Item = BlockChecksum>>(iter: T) -> Self {
        let mut builder = BlockIndexBuilder::new();
        builder.extend(iter);
        builder.freeze()
    }
}
