//! Byte-chunk stream readers (non-UTF8-safe).
//!
//! llama.cpp tooling emits box-drawing glyphs and partial escape sequences,
//! so the pipes are read as raw bytes, never as lines of text. Both pipes
//! feed one channel; the channel closes once both have reached EOF.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tracing::debug;

/// Buffered chunks between the pipe readers and the drain task.
pub const CHANNEL_CAPACITY: usize = 64;

/// Merge two output pipes into a single stream of raw chunks.
///
/// Each chunk is at most `chunk_size` bytes and comes from exactly one
/// pipe. Ordering is preserved per pipe, not across pipes.
pub fn merge_streams<A, B>(stdout: A, stderr: B, chunk_size: usize) -> mpsc::Receiver<Vec<u8>>
where
    A: AsyncRead + Unpin + Send + 'static,
    B: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    spawn_chunk_reader(stdout, "stdout", chunk_size, tx.clone());
    spawn_chunk_reader(stderr, "stderr", chunk_size, tx);
    rx
}

fn spawn_chunk_reader(
    mut stream: impl AsyncRead + Unpin + Send + 'static,
    stream_type: &'static str,
    chunk_size: usize,
    tx: mpsc::Sender<Vec<u8>>,
) {
    tokio::spawn(async move {
        let mut buf = vec![0u8; chunk_size.max(1)];

        loop {
            match stream.read(&mut buf).await {
                Ok(0) => break, // EOF
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).await.is_err() {
                        debug!(%stream_type, "drain task gone, stopping reader");
                        break;
                    }
                }
                Err(e) => {
                    debug!(%stream_type, error = %e, "output reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(%stream_type, "output reader task exiting");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(mut rx: mpsc::Receiver<Vec<u8>>) -> Vec<Vec<u8>> {
        let mut chunks = Vec::new();
        while let Some(chunk) = rx.recv().await {
            chunks.push(chunk);
        }
        chunks
    }

    #[tokio::test]
    async fn test_chunks_respect_read_boundaries() {
        let stdout = tokio_test::io::Builder::new()
            .read(b"loading 10%")
            .read(b"\rloading 55%")
            .build();

        let chunks = collect(merge_streams(stdout, tokio::io::empty(), 2048)).await;
        assert_eq!(chunks, vec![b"loading 10%".to_vec(), b"\rloading 55%".to_vec()]);
    }

    #[tokio::test]
    async fn test_chunk_size_bounds_each_read() {
        let stdout = tokio_test::io::Builder::new().read(b"abcdefgh").build();

        let chunks = collect(merge_streams(stdout, tokio::io::empty(), 3)).await;
        assert!(chunks.iter().all(|c| c.len() <= 3));
        assert_eq!(chunks.concat(), b"abcdefgh".to_vec());
    }

    #[tokio::test]
    async fn test_both_pipes_are_merged() {
        let stdout = tokio_test::io::Builder::new().read(b"out").build();
        let stderr = tokio_test::io::Builder::new().read(b"err").build();

        let mut chunks = collect(merge_streams(stdout, stderr, 2048)).await;
        chunks.sort();
        assert_eq!(chunks, vec![b"err".to_vec(), b"out".to_vec()]);
    }

    #[tokio::test]
    async fn test_read_error_ends_stream() {
        let stdout = tokio_test::io::Builder::new()
            .read(b"before")
            .read_error(std::io::Error::other("pipe broke"))
            .build();

        let chunks = collect(merge_streams(stdout, tokio::io::empty(), 2048)).await;
        assert_eq!(chunks, vec![b"before".to_vec()]);
    }
}
