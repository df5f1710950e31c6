//! # Seforim Lookup
//!
//! Prefix lookup over a catalog of Hebrew books and their tables of contents.
//!
//! ## Features
//!
//! - Hebrew normalization (cantillation, vowel points, final letters)
//! - Morphological query expansion from a SQLite dictionary
//! - Boolean prefix search over a tantivy index with a fixed catalog order
//! - Refreshable, reference-counted searchers
//! - Bounded query-result cache

pub mod analysis;
pub mod cli;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod morphology;
#[doc(hidden)]
pub mod testing;

pub mod prelude {
    pub use crate::analysis::{normalize, tokenize};
    pub use crate::engine::{LookupConfig, LookupEngine};
    pub use crate::error::{LookupError, Result};
    pub use crate::lookup::{BookHit, TocHit, TokenClause};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
