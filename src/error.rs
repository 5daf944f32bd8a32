//! Error types for the bindb library.
//!
//! All errors are represented by the [`BinError`] enum. Only load and
//! configuration errors ever reach callers of the lookup API: a word that
//! cannot be found, or a corrupt entry met during a query, is absorbed into
//! an empty result.
//!
//! # Examples
//!
//! ```
//! use bindb::error::{BinError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(BinError::config("cache capacity must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for bindb operations.
#[derive(Error, Debug)]
pub enum BinError {
    /// I/O errors (opening or mapping a file)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file could be opened but is not a usable image
    #[error("Load error: {0}")]
    Load(String),

    /// Leading signature or magic number mismatch
    #[error("Signature mismatch: {0}")]
    Signature(String),

    /// A read outside the mapped region
    #[error("Out of bounds: {0}")]
    Bounds(String),

    /// Inconsistent packed data
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with BinError.
pub type Result<T> = std::result::Result<T, BinError>;

impl BinError {
    /// Create a new load error.
    pub fn load<S: Into<String>>(msg: S) -> Self {
        BinError::Load(msg.into())
    }

    /// Create a new signature error.
    pub fn signature<S: Into<String>>(msg: S) -> Self {
        BinError::Signature(msg.into())
    }

    /// Create a new bounds error.
    pub fn bounds(offset: usize, len: usize, size: usize) -> Self {
        BinError::Bounds(format!(
            "read of {len} bytes at offset {offset} exceeds buffer of {size} bytes"
        ))
    }

    /// Create a new decode error.
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        BinError::Decode(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        BinError::Config(msg.into())
    }

    /// Whether this error was produced while opening an image.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            BinError::Io(_) | BinError::Load(_) | BinError::Signature(_)
        )
    }
}
