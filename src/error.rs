//! Error types for the lookup library.
//!
//! All fallible operations return [`LookupError`] through the crate-wide
//! [`Result`] alias.
//!
//! # Examples
//!
//! ```
//! use seforim_lookup::error::{LookupError, Result};
//!
//! fn open_something() -> Result<()> {
//!     Err(LookupError::config("index_dir is empty"))
//! }
//!
//! match open_something() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for lookup operations.
#[derive(Error, Debug)]
pub enum LookupError {
    /// I/O errors (file operations, directory access)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors raised by the full-text index
    #[error("Tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    /// Errors raised by the dictionary store
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Index-related errors (missing fields, unreadable generation)
    #[error("Index error: {0}")]
    Index(String),

    /// Query construction errors
    #[error("Query error: {0}")]
    Query(String),

    /// Dictionary-related errors
    #[error("Dictionary error: {0}")]
    Dictionary(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The gateway was closed before the query ran
    #[error("Search gateway is closed")]
    Closed,

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with LookupError.
pub type Result<T> = std::result::Result<T, LookupError>;

impl LookupError {
    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        LookupError::Index(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        LookupError::Query(msg.into())
    }

    /// Create a new dictionary error.
    pub fn dictionary<S: Into<String>>(msg: S) -> Self {
        LookupError::Dictionary(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        LookupError::Config(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LookupError::Other(msg.into())
    }
}
