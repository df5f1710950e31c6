//! Char filter implementations for text normalization.
//!
//! This module provides filters that pre-process a text string before it is
//! split into tokens.
//!
//! # Available Filters
//!
//! - [`pattern_replace::PatternReplaceCharFilter`] - Regex-based replacement
//! - [`mapping::MappingCharFilter`] - Literal string mapping replacement
//!
//! # Examples
//!
//! ```
//! use seforim_lookup::analysis::char_filter::CharFilter;
//! use seforim_lookup::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
//!
//! let filter = PatternReplaceCharFilter::new(r"\s+", " ").unwrap();
//! assert_eq!(filter.filter("a  \t b"), "a b");
//! ```

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text and return the filtered text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod mapping;
pub mod pattern_replace;
