//! Resumable upload driver.
//!
//! Splits the content into `Content-Range` chunks and pushes them through an
//! [`UploadTransport`], reporting byte-count milestones to an observer as
//! each chunk is acknowledged. The provider's authoritative file resource is
//! the return value of [`run_upload`]; nothing is communicated out-of-band.
//!
//! The transport trait exists so tests can substitute a fake remote
//! collaborator for the Drive backend.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::cloud::gdrive::DriveFile;
use crate::errors::{DriveError, Result};

/// Smallest chunk unit the resumable protocol accepts; every non-final chunk
/// must be a multiple of this.
pub const UPLOAD_CHUNK_UNIT: u64 = 256 * 1024;

/// Default chunk size: twice the protocol's minimum unit.
pub const DEFAULT_CHUNK_SIZE: u64 = 2 * UPLOAD_CHUNK_UNIT;

/// A byte-count milestone emitted after each acknowledged chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub bytes_sent: u64,
    pub total_bytes: u64,
}

/// Server response to a single chunk of a resumable session.
#[derive(Debug, Clone)]
pub enum ChunkOutcome {
    /// 308 Resume Incomplete: more chunks expected.
    Incomplete,
    /// 200/201: the session is finished and the file resource was returned.
    Complete(DriveFile),
}

/// Transport for one resumable-upload session.
///
/// The real implementation PUTs against the session URI returned by the
/// initiation request; tests provide a fake.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Send one chunk. `start` is the absolute offset of the chunk's first
    /// byte within the content, `total` the full content length.
    async fn send_chunk(&self, start: u64, total: u64, data: Vec<u8>) -> Result<ChunkOutcome>;
}

/// Compute the `(start, len)` spans covering `total` bytes in `chunk_size`
/// pieces. A zero-length content still produces one empty span, because the
/// protocol finalizes an empty upload with a single zero-byte request.
pub fn chunk_spans(total: u64, chunk_size: u64) -> Vec<(u64, u64)> {
    assert!(chunk_size > 0, "chunk size must be non-zero");

    if total == 0 {
        return vec![(0, 0)];
    }

    let mut spans = Vec::with_capacity(total.div_ceil(chunk_size) as usize);
    let mut start = 0;
    while start < total {
        let len = chunk_size.min(total - start);
        spans.push((start, len));
        start += len;
    }
    spans
}

/// Format the `Content-Range` header value for a chunk.
pub fn format_content_range(start: u64, len: u64, total: u64) -> String {
    if len == 0 {
        format!("bytes */{total}")
    } else {
        format!("bytes {}-{}/{}", start, start + len - 1, total)
    }
}

/// Drive a resumable upload to completion.
///
/// Reads `total` bytes from `reader` in `chunk_size` pieces and sends each
/// through `transport`. `on_progress` receives a monotonically non-decreasing
/// `bytes_sent` milestone after every acknowledged chunk. The reader is owned
/// by this call, so its handle is released exactly once on every exit path.
///
/// Returns the file resource from the finalizing chunk, or an error if the
/// transport fails or the server never finalizes the session.
pub async fn run_upload<T, R, F>(
    transport: &T,
    mut reader: R,
    total: u64,
    chunk_size: u64,
    mut on_progress: F,
) -> Result<DriveFile>
where
    T: UploadTransport + ?Sized,
    R: AsyncRead + Unpin + Send,
    F: FnMut(UploadProgress),
{
    let spans = chunk_spans(total, chunk_size);
    let last = spans.len() - 1;

    for (idx, (start, len)) in spans.into_iter().enumerate() {
        let mut buf = vec![0u8; len as usize];
        reader.read_exact(&mut buf).await?;

        let outcome = transport.send_chunk(start, total, buf).await?;
        on_progress(UploadProgress {
            bytes_sent: start + len,
            total_bytes: total,
        });

        match outcome {
            ChunkOutcome::Complete(file) => {
                tracing::debug!(file_id = %file.id, total, "resumable session finalized");
                return Ok(file);
            }
            ChunkOutcome::Incomplete if idx == last => {
                return Err(DriveError::Upload(
                    "server did not finalize the session after the final chunk".into(),
                ));
            }
            ChunkOutcome::Incomplete => {}
        }
    }

    unreachable!("chunk_spans yields at least one span")
}
