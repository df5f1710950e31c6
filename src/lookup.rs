//! Access layer over the pre-built lookup index.
//!
//! The index holds one document per book (`type = "book"`) and one per
//! table-of-contents entry (`type = "toc"`). Queries are boolean: a filter on
//! `type`, then one mandatory prefix clause per token against `q`, each
//! clause being the OR of the token's alternatives.

pub mod cache;
pub mod gateway;
pub mod query;
pub mod schema;
pub mod searcher;
pub mod types;

pub use cache::{QueryCache, QueryCacheConfig};
pub use gateway::{GatewayStats, IndexSearchGateway};
pub use searcher::{SearcherLease, SearcherManager};
pub use types::{BookHit, DocKind, TocHit, TokenClause};

