//! Error types for the EDM codec.

use thiserror::Error;

/// Main error type for EDM operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No decoder registered for a stream type name
    #[error("No reader defined for stream type '{0}'")]
    DecoderNotFound(String),

    /// Writer sinks were already released (finalized or closed)
    #[error("Writer is already closed")]
    WriterClosed,

    /// Input is truncated
    #[error("Unexpected end of data at position {0}")]
    UnexpectedEof(u64),

    /// Invalid magic bytes at start of file
    #[error("Invalid EDM file: expected 'EDM' magic bytes")]
    InvalidMagic,

    /// Unsupported file format version
    #[error("Unsupported EDM version: {0}")]
    UnsupportedVersion(u16),

    /// Invalid data structure in stream
    #[error("Invalid stream structure: {0}")]
    InvalidStructure(String),

    /// Interned string reference past the end of the string table
    #[error("String index {index} out of range (table size: {count})")]
    StringIndexOutOfRange { index: u32, count: usize },

    /// String contains characters the legacy codepage cannot represent
    #[error("String cannot be encoded as windows-1251: {0:?}")]
    Unencodable(String),

    /// Decoded value had a different shape than requested
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }
}

/// Result type alias for EDM operations.
pub type Result<T> = std::result::Result<T, Error>;
