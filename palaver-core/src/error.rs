//! Error types for the palaver core library.
//!
//! The gameplay paths never error: a missing phrase is a `None` return, an
//! unrecognized faction falls back to the wildcard bucket, and interruption
//! is a normal control path. Errors exist only for loading configuration
//! and the phrase corpus.

use thiserror::Error;

/// Top-level error type for palaver operations.
#[derive(Error, Debug)]
pub enum PalaverError {
    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Phrase corpus could not be parsed.
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, PalaverError>;
