//! Stored-field layout of the lookup index.
//!
//! The index is written by an external pipeline; this module names the
//! fields it must contain and resolves them when the index is opened.

use tantivy::schema::{FAST, Field, INDEXED, STORED, STRING, Schema, TEXT};

use crate::error::{LookupError, Result};

/// Document kind, `book` or `toc`.
pub const TYPE: &str = "type";
/// Tokenized, normalized searchable text.
pub const Q: &str = "q";
pub const BOOK_ID: &str = "book_id";
pub const CATEGORY_ID: &str = "category_id";
pub const BOOK_TITLE: &str = "book_title";
/// 1 for base books, 0 for derivative editions.
pub const IS_BASE_BOOK: &str = "is_base_book";
/// Curated catalog position.
pub const ORDER_INDEX: &str = "order_index";
pub const TOC_ID: &str = "toc_id";
pub const TOC_TEXT: &str = "toc_text";
pub const TOC_LEVEL: &str = "toc_level";

/// Build the schema an indexing pipeline must write.
///
/// `q` goes through the `default` tokenizer, which also lowercases, and must
/// already be normalized with [`crate::analysis::normalize`]. Query prefixes
/// are lowercased to match. The sort keys (`is_base_book`,
/// `order_index`, `book_id`, `toc_id`) are fast fields.
pub fn lookup_schema() -> Schema {
    let mut builder = Schema::builder();
    builder.add_text_field(TYPE, STRING | STORED);
    builder.add_text_field(Q, TEXT);
    builder.add_u64_field(BOOK_ID, INDEXED | STORED | FAST);
    builder.add_u64_field(CATEGORY_ID, STORED);
    builder.add_text_field(BOOK_TITLE, STORED);
    builder.add_u64_field(IS_BASE_BOOK, STORED | FAST);
    builder.add_i64_field(ORDER_INDEX, STORED | FAST);
    builder.add_u64_field(TOC_ID, STORED | FAST);
    builder.add_text_field(TOC_TEXT, STORED);
    builder.add_u64_field(TOC_LEVEL, STORED);
    builder.build()
}

/// Field handles resolved against an opened index.
#[derive(Debug, Clone, Copy)]
pub struct LookupFields {
    pub kind: Field,
    pub q: Field,
    pub book_id: Field,
    pub category_id: Field,
    pub book_title: Field,
    pub is_base_book: Field,
    pub order_index: Field,
    pub toc_id: Field,
    pub toc_text: Field,
    pub toc_level: Field,
}

impl LookupFields {
    /// Resolve every field, failing on the first one the schema lacks.
    pub fn resolve(schema: &Schema) -> Result<Self> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|_| LookupError::index(format!("index schema has no '{name}' field")))
        };

        Ok(Self {
            kind: field(TYPE)?,
            q: field(Q)?,
            book_id: field(BOOK_ID)?,
            category_id: field(CATEGORY_ID)?,
            book_title: field(BOOK_TITLE)?,
            is_base_book: field(IS_BASE_BOOK)?,
            order_index: field(ORDER_INDEX)?,
            toc_id: field(TOC_ID)?,
            toc_text: field(TOC_TEXT)?,
            toc_level: field(TOC_LEVEL)?,
        })
    }
}
