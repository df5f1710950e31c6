//! Type definitions for lookup queries and their results.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

/// Kind of document stored in the lookup index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocKind {
    Book,
    Toc,
}

impl DocKind {
    /// Value of the `type` field for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocKind::Book => "book",
            DocKind::Toc => "toc",
        }
    }
}

impl std::fmt::Display for DocKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A book matched by prefix search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookHit {
    pub id: u64,
    pub category_id: u64,
    pub title: String,
    pub is_base_book: bool,
    pub order_index: i32,
}

/// A table-of-contents entry matched by prefix search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocHit {
    pub toc_id: u64,
    pub book_id: u64,
    pub book_title: String,
    pub text: String,
    pub level: u32,
    /// Relevance score of the matching document.
    pub score: f32,
}

/// One mandatory query clause: a token and the alternatives any of which
/// may match as a prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenClause {
    /// The normalized token as typed.
    pub token: String,
    /// Deduplicated prefixes, the token itself included.
    pub alternatives: Vec<String>,
}

impl TokenClause {
    /// A clause matching the token only.
    pub fn literal(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            alternatives: vec![token.clone()],
            token,
        }
    }

    /// A clause matching the token or any of `alternatives`.
    pub fn expanded<I, S>(token: impl Into<String>, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let token = token.into();
        let mut all = vec![token.clone()];
        for alt in alternatives {
            let alt = alt.into();
            if !alt.is_empty() && !all.contains(&alt) {
                all.push(alt);
            }
        }
        Self {
            token,
            alternatives: all,
        }
    }

    /// Whether the clause carries alternatives beyond the literal token.
    pub fn is_expanded(&self) -> bool {
        self.alternatives.len() > 1
    }
}

/// Fixed catalog ordering. Greater sorts first: base books, then lower
/// `order_index`, then lower `book_id`, then lower `toc_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CatalogRank {
    is_base_book: bool,
    order_index: Reverse<i64>,
    book_id: Reverse<u64>,
    toc_id: Reverse<u64>,
}

impl CatalogRank {
    pub fn new(is_base_book: bool, order_index: i64, book_id: u64, toc_id: u64) -> Self {
        Self {
            is_base_book,
            order_index: Reverse(order_index),
            book_id: Reverse(book_id),
            toc_id: Reverse(toc_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_kind_values() {
        assert_eq!(DocKind::Book.as_str(), "book");
        assert_eq!(DocKind::Toc.to_string(), "toc");
    }

    #[test]
    fn test_expanded_clause_dedups() {
        let clause = TokenClause::expanded("ספרימ", ["ספר", "ספרימ", "", "ספרי"]);
        assert_eq!(clause.alternatives, vec!["ספרימ", "ספר", "ספרי"]);
        assert!(clause.is_expanded());
        assert!(!TokenClause::literal("ספר").is_expanded());
    }

    #[test]
    fn test_catalog_rank_order() {
        let mut ranks = vec![
            CatalogRank::new(false, 1, 1, 0),
            CatalogRank::new(true, 5, 9, 0),
            CatalogRank::new(true, 5, 3, 0),
            CatalogRank::new(true, 2, 7, 0),
        ];
        ranks.sort_by(|a, b| b.cmp(a));
        assert_eq!(
            ranks,
            vec![
                CatalogRank::new(true, 2, 7, 0),
                CatalogRank::new(true, 5, 3, 0),
                CatalogRank::new(true, 5, 9, 0),
                CatalogRank::new(false, 1, 1, 0),
            ]
        );
    }
}
