//! Block-at-a-time reads.
//!
//! A single `read` call may legitimately return fewer bytes than requested
//! long before end-of-stream (pipes and sockets do this all the time). Fast
//! checksums are only meaningful over whole blocks, so these helpers keep
//! reading until the buffer is full or the stream ends.

use std::io::{self, Read};

use tokio::io::{AsyncRead, AsyncReadExt};

/// Fills `buffer` from `reader`, stopping early only at end-of-stream.
///
/// Returns the number of bytes read; `0` means the stream was already
/// exhausted. `Interrupted` errors are retried.
///
/// # Errors
///
/// Propagates any other I/O error. Bytes read before the error are discarded
/// by the caller's contract: a failed block is never partially reported.
pub fn fill_block<R: Read + ?Sized>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

/// Async counterpart of [`fill_block`].
///
/// # Errors
///
/// Propagates any I/O error other than `Interrupted`.
pub async fn fill_block_async<R>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use test_support::{FailingReader, TrickleReader};

    #[test]
    fn fills_across_short_reads() {
        let mut reader = TrickleReader::new(b"abcdefgh".to_vec(), 3);
        let mut buffer = [0u8; 5];
        assert_eq!(fill_block(&mut reader, &mut buffer).unwrap(), 5);
        assert_eq!(&buffer, b"abcde");
        assert_eq!(fill_block(&mut reader, &mut buffer).unwrap(), 3);
        assert_eq!(&buffer[..3], b"fgh");
        assert_eq!(fill_block(&mut reader, &mut buffer).unwrap(), 0);
    }

    #[test]
    fn propagates_errors() {
        let mut reader = FailingReader::after(b"ab".to_vec());
        let mut buffer = [0u8; 4];
        let err = fill_block(&mut reader, &mut buffer).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }

    #[tokio::test]
    async fn async_fill_matches_sync() {
        let mut reader = Cursor::new(b"0123456789".to_vec());
        let mut buffer = [0u8; 4];
        assert_eq!(fill_block_async(&mut reader, &mut buffer).await.unwrap(), 4);
        assert_eq!(fill_block_async(&mut reader, &mut buffer).await.unwrap(), 4);
        assert_eq!(fill_block_async(&mut reader, &mut buffer).await.unwrap(), 2);
        assert_eq!(fill_block_async(&mut reader, &mut buffer).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn async_fill_across_trickle() {
        let mut reader = TrickleReader::new(b"abcdefgh".to_vec(), 2);
        let mut buffer = [0u8; 8];
        assert_eq!(fill_block_async(&mut reader, &mut buffer).await.unwrap(), 8);
        assert_eq!(&buffer, b"abcdefgh");
    }
}
