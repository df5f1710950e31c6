//! Typed search over the lookup index.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tantivy::collector::TopDocs;
use tantivy::schema::{Field, Value};
use tantivy::{DocAddress, DocId, Score, SegmentReader, TantivyDocument};

use crate::error::{LookupError, Result};
use crate::lookup::cache::{CacheKey, CachedHits, QueryCache, QueryCacheConfig};
use crate::lookup::query::build_lookup_query;
use crate::lookup::schema;
use crate::lookup::searcher::{SearcherLease, SearcherManager};
use crate::lookup::types::{BookHit, CatalogRank, DocKind, TocHit, TokenClause};

/// Result cap used when the caller does not pass one.
pub const DEFAULT_LIMIT: usize = 20;

/// Order index assumed for documents that do not store one.
const MISSING_ORDER_INDEX: i32 = i32::MAX;

/// Counters describing gateway activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayStats {
    /// Queries that reached the index (cache hits included).
    pub queries_executed: u64,
    pub cache_hits: u64,
    pub refreshes: u64,
    pub searchers_in_use: usize,
    pub generation: Option<u64>,
}

/// Executes book and table-of-contents prefix lookups.
///
/// Every lookup refreshes the reader if the index changed, acquires a
/// searcher lease, runs the boolean prefix query with the fixed catalog sort
/// and releases the lease, whether or not the query succeeded.
#[derive(Debug)]
pub struct IndexSearchGateway {
    manager: SearcherManager,
    cache: QueryCache,
    queries: AtomicU64,
    cache_hits: AtomicU64,
}

impl IndexSearchGateway {
    /// Create a gateway over `index_dir`. The index is opened on first use.
    pub fn new<P: AsRef<Path>>(index_dir: P, cache: QueryCacheConfig) -> Self {
        IndexSearchGateway {
            manager: SearcherManager::new(index_dir),
            cache: QueryCache::new(cache),
            queries: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
        }
    }

    pub fn manager(&self) -> &SearcherManager {
        &self.manager
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Books whose searchable text matches every clause.
    pub fn search_books(&self, clauses: &[TokenClause], limit: usize) -> Result<Vec<BookHit>> {
        self.cached_lookup(
            DocKind::Book,
            clauses,
            limit,
            |cached| match cached {
                CachedHits::Books(hits) => Some(hits),
                CachedHits::Toc(_) => None,
            },
            CachedHits::Books,
            |lease, _score, address| read_book(lease, address),
        )
    }

    /// Table-of-contents entries whose searchable text matches every clause.
    pub fn search_toc(&self, clauses: &[TokenClause], limit: usize) -> Result<Vec<TocHit>> {
        self.cached_lookup(
            DocKind::Toc,
            clauses,
            limit,
            |cached| match cached {
                CachedHits::Toc(hits) => Some(hits),
                CachedHits::Books(_) => None,
            },
            CachedHits::Toc,
            read_toc,
        )
    }

    fn cached_lookup<T, FromCache, IntoCache, Read>(
        &self,
        kind: DocKind,
        clauses: &[TokenClause],
        limit: usize,
        from_cache: FromCache,
        into_cache: IntoCache,
        read: Read,
    ) -> Result<Vec<T>>
    where
        T: Clone,
        FromCache: Fn(CachedHits) -> Option<Arc<Vec<T>>>,
        IntoCache: Fn(Arc<Vec<T>>) -> CachedHits,
        Read: Fn(&SearcherLease, Score, DocAddress) -> Result<T>,
    {
        if clauses.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        self.manager.with_searcher(|lease| {
            self.queries.fetch_add(1, Ordering::Relaxed);
            let key = CacheKey {
                generation: lease.generation(),
                kind,
                clauses: clauses.to_vec(),
                limit,
            };

            if let Some(hits) = self.cache.get(&key).and_then(&from_cache) {
                self.cache_hits.fetch_add(1, Ordering::Relaxed);
                return Ok(hits.as_ref().clone());
            }

            let top = top_docs(lease, kind, clauses, limit)?;
            let mut hits = Vec::with_capacity(top.len());
            for (score, address) in top {
                hits.push(read(lease, score, address)?);
            }

            log::debug!(
                "{} lookup at generation {}: {} clause(s), {} hit(s)",
                kind,
                lease.generation(),
                clauses.len(),
                hits.len()
            );

            self.cache.put(key, into_cache(Arc::new(hits.clone())));
            Ok(hits)
        })
    }

    /// Activity counters.
    pub fn stats(&self) -> GatewayStats {
        GatewayStats {
            queries_executed: self.queries.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            refreshes: self.manager.refresh_count(),
            searchers_in_use: self.manager.in_use(),
            generation: self.manager.generation(),
        }
    }

    /// Release the index. Safe to call more than once.
    pub fn close(&self) {
        self.manager.close();
        self.cache.clear();
    }
}

/// Run the lookup query and return the top `limit` documents in catalog
/// order, each with its relevance score.
fn top_docs(
    lease: &SearcherLease,
    kind: DocKind,
    clauses: &[TokenClause],
    limit: usize,
) -> Result<Vec<(Score, DocAddress)>> {
    let query = build_lookup_query(lease.fields(), kind, clauses)?;

    let collector = TopDocs::with_limit(limit).tweak_score(|segment_reader: &SegmentReader| {
        let fast = segment_reader.fast_fields();
        let is_base_book = fast.u64(schema::IS_BASE_BOOK).ok();
        let order_index = fast.i64(schema::ORDER_INDEX).ok();
        let book_id = fast.u64(schema::BOOK_ID).ok();
        let toc_id = fast.u64(schema::TOC_ID).ok();

        move |doc: DocId, score: Score| {
            let rank = CatalogRank::new(
                is_base_book.as_ref().and_then(|c| c.first(doc)) == Some(1),
                order_index
                    .as_ref()
                    .and_then(|c| c.first(doc))
                    .unwrap_or(i64::from(MISSING_ORDER_INDEX)),
                book_id.as_ref().and_then(|c| c.first(doc)).unwrap_or(u64::MAX),
                toc_id.as_ref().and_then(|c| c.first(doc)).unwrap_or(0),
            );
            (rank, score)
        }
    });

    let top = lease.searcher().search(query.as_ref(), &collector)?;
    Ok(top
        .into_iter()
        .map(|((_, score), address)| (score, address))
        .collect())
}

fn read_book(lease: &SearcherLease, address: DocAddress) -> Result<BookHit> {
    let doc: TantivyDocument = lease.searcher().doc(address)?;
    let f = lease.fields();

    Ok(BookHit {
        id: required_u64(&doc, f.book_id, schema::BOOK_ID)?,
        category_id: required_u64(&doc, f.category_id, schema::CATEGORY_ID)?,
        title: required_str(&doc, f.book_title, schema::BOOK_TITLE)?,
        is_base_book: doc.get_first(f.is_base_book).and_then(|v| v.as_u64()) == Some(1),
        order_index: match doc.get_first(f.order_index).and_then(|v| v.as_i64()) {
            Some(order_index) => i32::try_from(order_index).map_err(|_| {
                LookupError::index(format!("order_index {order_index} out of range"))
            })?,
            None => MISSING_ORDER_INDEX,
        },
    })
}

fn read_toc(lease: &SearcherLease, score: Score, address: DocAddress) -> Result<TocHit> {
    let doc: TantivyDocument = lease.searcher().doc(address)?;
    let f = lease.fields();
    let level = required_u64(&doc, f.toc_level, schema::TOC_LEVEL)?;

    Ok(TocHit {
        toc_id: required_u64(&doc, f.toc_id, schema::TOC_ID)?,
        book_id: required_u64(&doc, f.book_id, schema::BOOK_ID)?,
        book_title: required_str(&doc, f.book_title, schema::BOOK_TITLE)?,
        text: required_str(&doc, f.toc_text, schema::TOC_TEXT)?,
        level: u32::try_from(level)
            .map_err(|_| LookupError::index(format!("toc_level {level} out of range")))?,
        score,
    })
}

fn required_u64(doc: &TantivyDocument, field: Field, name: &str) -> Result<u64> {
    doc.get_first(field)
        .and_then(|v| v.as_u64())
        .ok_or_else(|| missing_field(name))
}

fn required_str(doc: &TantivyDocument, field: Field, name: &str) -> Result<String> {
    doc.get_first(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| missing_field(name))
}

fn missing_field(name: &str) -> LookupError {
    LookupError::index(format!("stored document lacks '{name}'"))
}
