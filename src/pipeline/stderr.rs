//! Bounded stderr capture.

use tokio::io::{AsyncRead, AsyncReadExt};

/// Reads `reader` to EOF, keeping at most `limit` bytes.
///
/// Bytes past the limit are read and dropped so the writer never blocks on a
/// full pipe. A read error ends the capture with whatever was kept.
pub(crate) async fn capture<R>(mut reader: R, limit: usize) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut kept = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let room = limit.saturating_sub(kept.len());
                kept.extend_from_slice(&chunk[..n.min(room)]);
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_under_limit() {
        let input: &[u8] = b"pg_dump: error: connection refused\n";
        assert_eq!(capture(input, 1024).await, input);
    }

    #[tokio::test]
    async fn test_capture_truncates_but_drains() {
        let input = vec![b'e'; 100_000];
        let kept = capture(&input[..], 10).await;
        assert_eq!(kept, vec![b'e'; 10]);
    }

    #[tokio::test]
    async fn test_capture_zero_limit() {
        let input: &[u8] = b"noise";
        assert!(capture(input, 0).await.is_empty());
    }
}
