//! Byte-counting reader.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

/// Wraps a byte source and counts the bytes it returns.
///
/// The counter only grows on successful reads. Errors pass through untouched,
/// but the reader remembers that its source failed so that a failure seen
/// further down the chain can be attributed to the transport.
#[derive(Debug)]
pub struct CountingReader<R> {
    inner: R,
    bytes_read: u64,
    source_failed: bool,
}

impl<R> CountingReader<R> {
    /// Wrap a byte source.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            bytes_read: 0,
            source_failed: false,
        }
    }

    /// Total bytes returned by the source so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Whether the source has returned an error.
    pub fn source_failed(&self) -> bool {
        self.source_failed
    }

    /// Unwrap the source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for CountingReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();

        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                this.bytes_read += (buf.filled().len() - before) as u64;
                Poll::Ready(Ok(()))
            }
            Poll::Ready(Err(e)) => {
                this.source_failed = true;
                Poll::Ready(Err(e))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    /// Source that yields some bytes and then fails.
    struct FailingSource {
        remaining: &'static [u8],
    }

    impl AsyncRead for FailingSource {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.remaining.is_empty() {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset",
                )));
            }
            let n = self.remaining.len().min(buf.remaining());
            buf.put_slice(&self.remaining[..n]);
            self.remaining = &self.remaining[n..];
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_counts_all_bytes() {
        let data = vec![7u8; 10_000];
        let mut reader = CountingReader::new(&data[..]);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();

        assert_eq!(out.len(), 10_000);
        assert_eq!(reader.bytes_read(), 10_000);
        assert!(!reader.source_failed());
    }

    #[tokio::test]
    async fn test_counter_is_monotonic_across_small_reads() {
        let data = b"hello world";
        let mut reader = CountingReader::new(&data[..]);
        let mut chunk = [0u8; 3];
        let mut last = 0;

        loop {
            let n = reader.read(&mut chunk).await.unwrap();
            assert!(reader.bytes_read() >= last);
            last = reader.bytes_read();
            if n == 0 {
                break;
            }
        }
        assert_eq!(last, data.len() as u64);
    }

    #[tokio::test]
    async fn test_source_error_passes_through() {
        let mut reader = CountingReader::new(FailingSource { remaining: b"abc" });
        let mut out = Vec::new();
        let err = reader.read_to_end(&mut out).await.unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert!(reader.source_failed());
        assert_eq!(reader.bytes_read(), 3);
    }
}
