//! Error types for grin

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GrinError {
    #[error("not a grin file: expected magic number {expected}, found {found}")]
    BadMagicNumber { expected: u32, found: u32 },

    #[error("not a grin file: input ends before the 32-bit magic number")]
    MissingMagicNumber,

    #[error("malformed huffman tree: {0}")]
    MalformedTree(String),

    #[error("truncated stream: input ended before the end-of-stream code")]
    TruncatedStream,

    #[error("symbol {0} has no entry in the code table")]
    LookupError(u16),

    #[error("input of {size} bytes exceeds the configured limit of {limit} bytes")]
    InputTooLarge { size: u64, limit: u64 },

    #[error("input and output are the same file: {}", .0.display())]
    SamePath(std::path::PathBuf),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// True when an I/O error signals that the bit source ran dry.
pub(crate) fn is_eof(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::UnexpectedEof
}
