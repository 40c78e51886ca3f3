//! Error types for the docstitch library.

use std::io;
use thiserror::Error;

/// Result type alias for docstitch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading or stitching shards.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading shard data.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No shards were found at the given locator.
    #[error("No shards found: {0}")]
    NotFound(String),

    /// Access to the shard store was refused.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A shard could not be decoded.
    #[error("Shard decode error: {0}")]
    Decode(String),

    /// Shards belong to different logical documents.
    #[error("Shard schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A storage locator could not be parsed.
    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    /// A search pattern could not be compiled.
    #[error("Invalid search pattern: {0}")]
    InvalidPattern(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// A text span does not fit the document text.
    #[error("Invalid span [{start}, {end}) for text of length {len}")]
    InvalidSpan {
        /// Span start offset
        start: usize,
        /// Span end offset
        end: usize,
        /// Document text length
        len: usize,
    },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}
