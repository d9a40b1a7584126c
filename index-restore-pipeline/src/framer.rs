//! Newline framing of the decompressed stream.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Splits a buffered byte stream into trimmed lines.
///
/// The line buffer is reused across reads, so each yielded slice is only
/// valid until the next call to [`LineFramer::next_line`].
pub struct LineFramer<B> {
    source: B,
    buf: Vec<u8>,
}

impl<B: AsyncBufRead + Unpin> LineFramer<B> {
    pub fn new(source: B) -> Self {
        Self {
            source,
            buf: Vec::with_capacity(4096),
        }
    }

    /// Read the next line, trimmed of surrounding ASCII whitespace.
    ///
    /// Returns `Ok(None)` at end of stream. A final line without a trailing
    /// newline is still returned. Blank lines come back as empty slices so
    /// the caller can account for them.
    pub async fn next_line(&mut self) -> io::Result<Option<&[u8]>> {
        self.buf.clear();
        let n = self.source.read_until(b'\n', &mut self.buf).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(self.buf.trim_ascii()))
    }
}

impl<B> LineFramer<B> {
    /// The underlying reader.
    pub fn get_ref(&self) -> &B {
        &self.source
    }
}
