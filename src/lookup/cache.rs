//! Bounded query-result cache.
//!
//! Entries are evicted least-recently-used first once either the entry count
//! or the estimated byte size exceeds its ceiling. A result is only admitted
//! after its query has been seen `min_frequency` times within the last
//! `history_size` lookups, so one-off keystrokes do not churn the cache.
//! Keys carry the index generation; a refresh makes older entries
//! unreachable and they age out.

use std::collections::{BTreeMap, VecDeque};
use std::hash::BuildHasher;
use std::mem::size_of;
use std::sync::Arc;

use ahash::{AHashMap, RandomState};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::lookup::types::{BookHit, DocKind, TocHit, TokenClause};

/// Cache ceilings and admission policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryCacheConfig {
    pub enabled: bool,
    /// Maximum number of cached results.
    pub max_entries: usize,
    /// Maximum estimated size of all cached results.
    pub max_bytes: usize,
    /// Lookups of the same query needed before it is cached.
    pub min_frequency: usize,
    /// Number of recent lookups remembered for admission.
    pub history_size: usize,
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        QueryCacheConfig {
            enabled: true,
            max_entries: 1024,
            max_bytes: 64 * 1024 * 1024,
            min_frequency: 2,
            history_size: 256,
        }
    }
}

impl QueryCacheConfig {
    pub fn disabled() -> Self {
        QueryCacheConfig {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Identity of one executed lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub generation: u64,
    pub kind: DocKind,
    pub clauses: Vec<TokenClause>,
    pub limit: usize,
}

impl CacheKey {
    fn estimated_bytes(&self) -> usize {
        size_of::<Self>()
            + self
                .clauses
                .iter()
                .map(|c| {
                    size_of::<TokenClause>()
                        + c.token.len()
                        + c.alternatives.iter().map(|a| a.len() + size_of::<String>()).sum::<usize>()
                })
                .sum::<usize>()
    }
}

/// Materialized hits for one key.
#[derive(Debug, Clone)]
pub enum CachedHits {
    Books(Arc<Vec<BookHit>>),
    Toc(Arc<Vec<TocHit>>),
}

impl CachedHits {
    fn estimated_bytes(&self) -> usize {
        match self {
            CachedHits::Books(hits) => hits
                .iter()
                .map(|h| size_of::<BookHit>() + h.title.len())
                .sum(),
            CachedHits::Toc(hits) => hits
                .iter()
                .map(|h| size_of::<TocHit>() + h.book_title.len() + h.text.len())
                .sum(),
        }
    }
}

struct Entry {
    hits: CachedHits,
    bytes: usize,
    tick: u64,
}

#[derive(Default)]
struct Inner {
    entries: AHashMap<CacheKey, Entry>,
    /// tick -> key, oldest first
    recency: BTreeMap<u64, CacheKey>,
    history: VecDeque<u64>,
    tick: u64,
    bytes: usize,
}

/// Thread-safe LRU cache of lookup results.
pub struct QueryCache {
    config: QueryCacheConfig,
    hasher: RandomState,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("config", &self.config)
            .field("len", &self.len())
            .field("bytes", &self.bytes())
            .finish()
    }
}

impl QueryCache {
    pub fn new(config: QueryCacheConfig) -> Self {
        QueryCache {
            config,
            hasher: RandomState::new(),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn config(&self) -> &QueryCacheConfig {
        &self.config
    }

    /// Record a use of `key` and return its cached hits, if any.
    pub fn get(&self, key: &CacheKey) -> Option<CachedHits> {
        if !self.config.enabled {
            return None;
        }

        let fingerprint = self.hasher.hash_one(key);
        let mut inner = self.inner.lock();
        inner.history.push_back(fingerprint);
        while inner.history.len() > self.config.history_size {
            inner.history.pop_front();
        }

        inner.tick += 1;
        let tick = inner.tick;
        let Inner {
            entries, recency, ..
        } = &mut *inner;
        let entry = entries.get_mut(key)?;
        recency.remove(&entry.tick);
        recency.insert(tick, key.clone());
        entry.tick = tick;
        Some(entry.hits.clone())
    }

    /// Offer freshly computed hits for `key`. Stored only if the key has been
    /// used often enough and fits under the byte ceiling.
    pub fn put(&self, key: CacheKey, hits: CachedHits) -> bool {
        if !self.config.enabled || self.config.max_entries == 0 {
            return false;
        }

        let bytes = key.estimated_bytes() + hits.estimated_bytes();
        if bytes > self.config.max_bytes {
            return false;
        }

        let fingerprint = self.hasher.hash_one(&key);
        let mut inner = self.inner.lock();
        let uses = inner.history.iter().filter(|&&h| h == fingerprint).count();
        if uses < self.config.min_frequency {
            return false;
        }

        inner.tick += 1;
        let tick = inner.tick;
        if let Some(old) = inner.entries.remove(&key) {
            inner.recency.remove(&old.tick);
            inner.bytes -= old.bytes;
        }
        inner.recency.insert(tick, key.clone());
        inner.entries.insert(key, Entry { hits, bytes, tick });
        inner.bytes += bytes;

        while inner.entries.len() > self.config.max_entries || inner.bytes > self.config.max_bytes {
            let Some((_, oldest)) = inner.recency.pop_first() else {
                break;
            };
            if let Some(evicted) = inner.entries.remove(&oldest) {
                inner.bytes -= evicted.bytes;
            }
        }
        true
    }

    /// Drop every cached result and the usage history.
    pub fn clear(&self) {
        *self.inner.lock() = Inner::default();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Estimated size of all cached results.
    pub fn bytes(&self) -> usize {
        self.inner.lock().bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(token: &str) -> CacheKey {
        CacheKey {
            generation: 1,
            kind: DocKind::Book,
            clauses: vec![TokenClause::literal(token)],
            limit: 20,
        }
    }

    fn hits(title: &str) -> CachedHits {
        CachedHits::Books(Arc::new(vec![BookHit {
            id: 1,
            category_id: 1,
            title: title.to_string(),
            is_base_book: true,
            order_index: 1,
        }]))
    }

    fn use_twice(cache: &QueryCache, k: &CacheKey) {
        cache.get(k);
        cache.get(k);
    }

    #[test]
    fn test_admission_requires_repeated_use() {
        let cache = QueryCache::new(QueryCacheConfig::default());
        let k = key("ספר");

        assert!(cache.get(&k).is_none());
        assert!(!cache.put(k.clone(), hits("ספר")));
        assert!(cache.get(&k).is_none());
        assert!(cache.put(k.clone(), hits("ספר")));
        assert!(matches!(cache.get(&k), Some(CachedHits::Books(h)) if h[0].title == "ספר"));
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = QueryCache::new(QueryCacheConfig {
            max_entries: 2,
            ..Default::default()
        });
        let (a, b, c) = (key("א"), key("ב"), key("ג"));

        for k in [&a, &b] {
            use_twice(&cache, k);
            assert!(cache.put(k.clone(), hits("x")));
        }
        // touch a so b becomes the eviction candidate
        assert!(cache.get(&a).is_some());
        use_twice(&cache, &c);
        assert!(cache.put(c.clone(), hits("x")));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&a).is_some());
        assert!(cache.get(&b).is_none());
        assert!(cache.get(&c).is_some());
    }

    #[test]
    fn test_byte_ceiling() {
        let small = hits("x");
        let k = key("א");
        let limit = k.estimated_bytes() + small.estimated_bytes();
        let cache = QueryCache::new(QueryCacheConfig {
            max_bytes: limit,
            ..Default::default()
        });

        use_twice(&cache, &k);
        assert!(!cache.put(k.clone(), hits(&"x".repeat(1000))));
        assert!(cache.put(k.clone(), small));
        assert_eq!(cache.bytes(), limit);

        let other = key("ב");
        use_twice(&cache, &other);
        assert!(cache.put(other.clone(), hits("x")));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&other).is_some());
    }

    #[test]
    fn test_generation_is_part_of_key() {
        let cache = QueryCache::new(QueryCacheConfig::default());
        let k = key("ספר");
        use_twice(&cache, &k);
        cache.put(k.clone(), hits("ספר"));

        let next = CacheKey {
            generation: 2,
            ..k.clone()
        };
        assert!(cache.get(&next).is_none());
    }

    #[test]
    fn test_disabled_cache() {
        let cache = QueryCache::new(QueryCacheConfig::disabled());
        let k = key("ספר");
        use_twice(&cache, &k);
        assert!(!cache.put(k.clone(), hits("ספר")));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = QueryCache::new(QueryCacheConfig::default());
        let k = key("ספר");
        use_twice(&cache, &k);
        cache.put(k.clone(), hits("ספר"));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.bytes(), 0);
    }
}
