//! Morphological dictionary.
//!
//! Expands a normalized token into every surface form, variant and base form
//! that shares its root, so that a query for one inflection matches the
//! others.

pub mod dictionary;
pub mod service;
pub mod store;

pub use dictionary::{DictionaryEntry, Expansion, MorphologyDictionary};
pub use service::DictionaryService;
