//! Reader stages of the pipeline: byte counting and gzip decompression.

mod counting;
mod decompress;

pub use counting::CountingReader;
pub use decompress::Decompressor;
