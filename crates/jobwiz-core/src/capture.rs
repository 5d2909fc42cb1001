//! Capture channel: read the worker's redirected output back into memory.
//!
//! The worker writes its combined stdout/stderr into the capture target
//! (see [`crate::invoke`]); after the process has terminated this module
//! reads the target in full. The byte length is measured dynamically, the
//! buffer is reserved fallibly, and exactly that many bytes must be read
//! -- a short read is an error, never a silently partial result.

use std::collections::TryReserveError;
use std::path::Path;

use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Errors from reading the capture target.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The buffer for the measured length could not be allocated.
    #[error("cannot allocate {requested} bytes for capture buffer: {source}")]
    OutOfMemory {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    /// Fewer bytes were available than the measured length. Signals a
    /// race or I/O fault on the capture target.
    #[error("short read from capture target: expected {expected} bytes, got {actual}")]
    TruncatedRead { expected: usize, actual: usize },

    /// The capture target could not be opened or read.
    #[error("failed to read capture target: {0}")]
    Io(#[from] std::io::Error),
}

/// The worker's combined output, owned as a single text buffer.
///
/// The text is an independent copy of the file content; decoded record
/// fields are in turn owned copies of pieces of it, so nothing outlives
/// anything it borrows from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    text: String,
}

impl CapturedOutput {
    /// Borrow the captured text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length of the captured text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// `true` if the worker wrote nothing.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Take ownership of the captured text.
    pub fn into_string(self) -> String {
        self.text
    }
}

/// Read the capture target in full.
///
/// The length is taken from file metadata at open time; if the file holds
/// fewer bytes than measured the read fails with
/// [`CaptureError::TruncatedRead`]. Non-UTF-8 bytes are replaced rather
/// than rejected -- the worker's output is text by contract but is not
/// trusted to be well-formed.
pub async fn read_capture(path: &Path) -> Result<CapturedOutput, CaptureError> {
    let file = File::open(path).await?;
    // A length that does not fit in usize cannot be allocated either;
    // saturate and let the reservation report it.
    let len = usize::try_from(file.metadata().await?.len()).unwrap_or(usize::MAX);
    let bytes = read_exact_len(file, len).await?;
    Ok(CapturedOutput {
        text: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Read exactly `len` bytes from `reader` into a freshly reserved buffer.
async fn read_exact_len<R>(reader: R, len: usize) -> Result<Vec<u8>, CaptureError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|source| CaptureError::OutOfMemory {
            requested: len,
            source,
        })?;

    let mut taken = reader.take(len as u64);
    taken.read_to_end(&mut buf).await?;

    if buf.len() != len {
        return Err(CaptureError::TruncatedRead {
            expected: len,
            actual: buf.len(),
        });
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_full_file_content() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.txt");
        let content = r#"[{"job_id":"J1","title":"Engineer"}]"#;
        std::fs::write(&path, content).unwrap();

        let captured = read_capture(&path).await.expect("read should succeed");
        assert_eq!(captured.as_str(), content);
        assert_eq!(captured.len(), content.len());
        assert!(!captured.is_empty());
    }

    #[tokio::test]
    async fn empty_file_reads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.txt");
        std::fs::write(&path, "").unwrap();

        let captured = read_capture(&path).await.expect("read should succeed");
        assert!(captured.is_empty());
        assert_eq!(captured.len(), 0);
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("never_written.txt");

        let err = read_capture(&path).await.expect_err("open should fail");
        assert!(matches!(err, CaptureError::Io(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn short_read_is_truncated_read() {
        // Reader holds 3 bytes but the measured length claims 4.
        let reader: &[u8] = b"abc";
        let err = read_exact_len(reader, 4).await.expect_err("should be short");

        match err {
            CaptureError::TruncatedRead { expected, actual } => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 3);
            }
            other => panic!("expected TruncatedRead, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn exact_read_returns_all_bytes() {
        let reader: &[u8] = b"abcd";
        let bytes = read_exact_len(reader, 4).await.expect("exact length");
        assert_eq!(bytes, b"abcd");
    }

    #[tokio::test]
    async fn non_utf8_bytes_are_replaced_not_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.txt");
        std::fs::write(&path, [0x7b, 0xff, 0xfe, 0x7d]).unwrap();

        let captured = read_capture(&path).await.expect("read should succeed");
        assert!(captured.as_str().starts_with('{'));
        assert!(captured.as_str().ends_with('}'));
    }
}
