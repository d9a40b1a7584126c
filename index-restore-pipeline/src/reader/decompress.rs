//! Gzip decompression of the archive stream.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_compression::tokio::bufread::GzipDecoder;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader, ReadBuf};
use tracing::debug;

use crate::errors::RestoreError;
use crate::reader::CountingReader;

/// First two bytes of every gzip member.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Buffer size for decompressed output.
const DECODE_BUFFER_SIZE: usize = 64 * 1024;

type Decoder<R> = GzipDecoder<BufReader<CountingReader<R>>>;

/// Inflates a gzip archive read through a [`CountingReader`].
///
/// Concatenated gzip members are decoded as one logical stream.
pub struct Decompressor<R> {
    inner: BufReader<Decoder<R>>,
}

impl<R: AsyncRead + Unpin> Decompressor<R> {
    /// Open a gzip stream.
    ///
    /// Fails with `CorruptArchive` if the stream is empty, does not start with
    /// the gzip magic bytes, or carries an invalid header. A failure of the
    /// underlying source is reported as `TransportFailure`.
    pub async fn open(source: CountingReader<R>) -> Result<Self, RestoreError> {
        let mut compressed = BufReader::new(source);

        {
            let head = compressed
                .fill_buf()
                .await
                .map_err(|e| RestoreError::transport(format!("Failed to read archive: {}", e)))?;

            if head.is_empty() {
                return Err(RestoreError::corrupt("archive is empty"));
            }
            // The first read may be short; check whatever prefix is available
            let available = head.len().min(GZIP_MAGIC.len());
            if head[..available] != GZIP_MAGIC[..available] {
                return Err(RestoreError::corrupt("stream does not start with a gzip header"));
            }
        }

        let mut decoder = GzipDecoder::new(compressed);
        decoder.multiple_members(true);

        let mut decompressor = Self {
            inner: BufReader::with_capacity(DECODE_BUFFER_SIZE, decoder),
        };

        // Prime the decoder so a bad header surfaces here, not on the first line
        if let Err(e) = decompressor.inner.fill_buf().await {
            return Err(decompressor.classify(e));
        }

        debug!(
            compressed_bytes = decompressor.bytes_consumed(),
            "Opened gzip stream"
        );

        Ok(decompressor)
    }

    fn counting(&self) -> &CountingReader<R> {
        self.inner.get_ref().get_ref().get_ref()
    }

    /// Compressed bytes consumed from the source so far.
    pub fn bytes_consumed(&self) -> u64 {
        self.counting().bytes_read()
    }

    /// Attribute a read error to the transport or to the archive itself.
    ///
    /// Errors that did not originate in the source (bad header, invalid
    /// deflate data, checksum mismatch, truncation) mean the archive is
    /// corrupt.
    pub fn classify(&self, err: io::Error) -> RestoreError {
        if self.counting().source_failed() {
            RestoreError::transport(format!("Failed to read archive: {}", err))
        } else {
            RestoreError::corrupt(err.to_string())
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for Decompressor<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl<R: AsyncRead + Unpin> AsyncBufRead for Decompressor<R> {
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<&[u8]>> {
        Pin::new(&mut self.get_mut().inner).poll_fill_buf(cx)
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        Pin::new(&mut self.get_mut().inner).consume(amt)
    }
}
