//! Shared test utilities for the blocksync workspace.
//!
//! Readers here implement both [`std::io::Read`] and [`tokio::io::AsyncRead`]
//! so the same fixture drives sync and async code paths.

use std::io::{self, Read, Write};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, ReadBuf};

/// Message carried by errors injected by [`FailingReader`].
pub const INJECTED_FAILURE: &str = "injected read failure";

/// Yields its data at most `max_chunk` bytes per read call.
#[derive(Debug, Clone)]
pub struct TrickleReader {
    data: Vec<u8>,
    pos: usize,
    max_chunk: usize,
}

impl TrickleReader {
    /// Creates a reader handing out `data` in chunks of at most `max_chunk` bytes.
    pub fn new(data: Vec<u8>, max_chunk: usize) -> Self {
        Self {
            data,
            pos: 0,
            max_chunk: max_chunk.max(1),
        }
    }

    fn next_chunk(&mut self, room: usize) -> &[u8] {
        let n = (self.data.len() - self.pos).min(self.max_chunk).min(room);
        let start = self.pos;
        self.pos += n;
        &self.data[start..start + n]
    }
}

impl Read for TrickleReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let chunk = self.next_chunk(buf.len());
        let n = chunk.len();
        buf[..n].copy_from_slice(chunk);
        Ok(n)
    }
}

impl AsyncRead for TrickleReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let chunk = this.next_chunk(buf.remaining());
        buf.put_slice(chunk);
        Poll::Ready(Ok(()))
    }
}

/// Yields `data`, then fails every subsequent read.
///
/// Every read call, failed or not, bumps a counter that stays observable
/// through [`FailingReader::read_counter`] after the reader is moved away.
#[derive(Debug, Clone)]
pub struct FailingReader {
    data: Vec<u8>,
    pos: usize,
    kind: io::ErrorKind,
    reads: Arc<AtomicUsize>,
}

impl FailingReader {
    /// Creates a reader that fails with [`io::ErrorKind::Other`] once `data` is consumed.
    pub fn after(data: Vec<u8>) -> Self {
        Self::with_kind(data, io::ErrorKind::Other)
    }

    /// Creates a reader that fails with `kind` once `data` is consumed.
    pub fn with_kind(data: Vec<u8>, kind: io::ErrorKind) -> Self {
        Self {
            data,
            pos: 0,
            kind,
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared count of read calls made on this reader.
    pub fn read_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.reads)
    }

    fn next(&mut self, room: usize) -> io::Result<&[u8]> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.pos >= self.data.len() {
            return Err(io::Error::new(self.kind, INJECTED_FAILURE));
        }
        let n = (self.data.len() - self.pos).min(room);
        let start = self.pos;
        self.pos += n;
        Ok(&self.data[start..start + n])
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let chunk = self.next(buf.len())?;
        let n = chunk.len();
        buf[..n].copy_from_slice(chunk);
        Ok(n)
    }
}

impl AsyncRead for FailingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let chunk = this.next(buf.remaining())?;
        buf.put_slice(chunk);
        Poll::Ready(Ok(()))
    }
}

/// Deterministic pseudo-random bytes (xorshift64*), stable across runs.
pub fn patterned_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state ^= state >> 12;
            state ^= state << 25;
            state ^= state >> 27;
            (state.wrapping_mul(0x2545_f491_4f6c_dd1d) >> 56) as u8
        })
        .collect()
}

/// Concatenates `blocks` into one buffer.
pub fn concat_blocks(blocks: &[&[u8]]) -> Vec<u8> {
    blocks.iter().flat_map(|block| block.iter().copied()).collect()
}

/// Writes `contents` to a fresh temporary file and returns its handle.
pub fn temp_file_with(contents: &[u8]) -> io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents)?;
    file.flush()?;
    Ok(file)
}
