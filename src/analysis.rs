//! Text analysis for lookup queries and index terms.
//!
//! Raw input goes through a fixed chain of [`char_filter::CharFilter`]s
//! assembled by [`normalizer::HebrewNormalizer`]. The same chain must be
//! applied by whatever pipeline builds the index, otherwise indexed terms
//! and query terms silently diverge.

pub mod char_filter;
pub mod normalizer;

pub use normalizer::{HebrewNormalizer, TextNormalizer, normalize, tokenize};
