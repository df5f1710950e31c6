//! Query orchestration: normalize, tokenize, expand, search.
//!
//! # Examples
//!
//! ```no_run
//! use seforim_lookup::engine::{LookupConfig, LookupEngine};
//!
//! # fn main() -> seforim_lookup::error::Result<()> {
//! let config = LookupConfig::new("/data/lookup_index").with_dictionary("/data/lexical.db");
//! let engine = LookupEngine::open(config)?;
//!
//! for hit in engine.search_books_prefix("שולחן ער", 10)? {
//!     println!("{} {}", hit.id, hit.title);
//! }
//! engine.close();
//! # Ok(())
//! # }
//! ```

pub mod config;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::{HebrewNormalizer, TextNormalizer, tokenize};
use crate::error::Result;
use crate::lookup::gateway::{GatewayStats, IndexSearchGateway};
use crate::lookup::types::{BookHit, TocHit, TokenClause};
use crate::morphology::dictionary::MorphologyDictionary;
use crate::morphology::service::DictionaryService;

pub use config::LookupConfig;

/// Combined engine counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineStats {
    #[serde(flatten)]
    pub gateway: GatewayStats,
    pub dictionary_available: bool,
    pub dictionary_terms: usize,
    pub dictionary_groups: usize,
}

/// Prefix lookup over books and table-of-contents entries.
///
/// Raw input is normalized and split into tokens; each token becomes a
/// mandatory clause that matches the token or any morphological variant
/// the dictionary knows for it.
pub struct LookupEngine {
    config: LookupConfig,
    normalizer: Arc<dyn TextNormalizer>,
    dictionary: DictionaryService,
    gateway: IndexSearchGateway,
}

impl std::fmt::Debug for LookupEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupEngine")
            .field("config", &self.config)
            .field("dictionary", &self.dictionary)
            .field("gateway", &self.gateway)
            .finish()
    }
}

impl LookupEngine {
    /// Build an engine and load the dictionary, if one is configured.
    ///
    /// The index itself is opened on the first query. A missing or broken
    /// dictionary is logged and leaves the engine searching literal tokens.
    pub fn open(config: LookupConfig) -> Result<Self> {
        config.validate()?;
        let normalizer: Arc<dyn TextNormalizer> = Arc::new(HebrewNormalizer::new()?);
        let path = if config.expand_queries {
            config.dictionary_path.clone()
        } else {
            None
        };
        let dictionary = DictionaryService::with_normalizer(path, Arc::clone(&normalizer));
        if dictionary.path().is_some() && !dictionary.init() {
            log::warn!("Morphological dictionary unavailable; searching literal tokens");
        }
        Ok(Self::assemble(config, normalizer, dictionary))
    }

    /// Build an engine around an already-constructed dictionary service.
    pub fn with_dictionary(config: LookupConfig, dictionary: DictionaryService) -> Result<Self> {
        config.validate()?;
        let normalizer: Arc<dyn TextNormalizer> = Arc::new(HebrewNormalizer::new()?);
        Ok(Self::assemble(config, normalizer, dictionary))
    }

    fn assemble(
        config: LookupConfig,
        normalizer: Arc<dyn TextNormalizer>,
        dictionary: DictionaryService,
    ) -> Self {
        let gateway = IndexSearchGateway::new(&config.index_dir, config.cache.clone());
        Self {
            config,
            normalizer,
            dictionary,
            gateway,
        }
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    pub fn gateway(&self) -> &IndexSearchGateway {
        &self.gateway
    }

    /// The dictionary currently used for expansion, if any.
    pub fn dictionary(&self) -> Option<Arc<MorphologyDictionary>> {
        if self.config.expand_queries {
            self.dictionary.current()
        } else {
            None
        }
    }

    /// Re-read the dictionary store. Returns whether a dictionary is available.
    pub fn reload_dictionary(&self) -> bool {
        self.dictionary.reload()
    }

    /// Normalize `raw` with the engine's normalizer.
    pub fn normalize(&self, raw: &str) -> String {
        self.normalizer.normalize(raw)
    }

    /// The clauses `raw` turns into: one per token, each carrying the
    /// token's alternatives. Empty for blank input.
    pub fn plan(&self, raw: &str) -> Vec<TokenClause> {
        let tokens = tokenize(&self.normalize(raw));
        let dictionary = self.dictionary();

        let clauses: Vec<TokenClause> = tokens
            .into_iter()
            .map(|token| {
                match dictionary.as_ref().and_then(|d| d.expansion_for(&token)) {
                    Some(expansion) => TokenClause::expanded(token, expansion.terms.iter().cloned()),
                    None => TokenClause::literal(token),
                }
            })
            .collect();

        log::debug!(
            "Planned {} clause(s) for {:?}: {:?}",
            clauses.len(),
            raw,
            clauses.iter().map(|c| &c.alternatives).collect::<Vec<_>>()
        );
        clauses
    }

    /// Books matching every token of `raw` as a prefix, in catalog order.
    pub fn search_books_prefix(&self, raw: &str, limit: usize) -> Result<Vec<BookHit>> {
        let clauses = self.plan(raw);
        self.gateway.search_books(&clauses, limit)
    }

    /// Table-of-contents entries matching every token of `raw` as a prefix.
    pub fn search_toc_prefix(&self, raw: &str, limit: usize) -> Result<Vec<TocHit>> {
        let clauses = self.plan(raw);
        self.gateway.search_toc(&clauses, limit)
    }

    /// [`search_books_prefix`](Self::search_books_prefix) with the configured limit.
    pub fn search_books(&self, raw: &str) -> Result<Vec<BookHit>> {
        self.search_books_prefix(raw, self.config.default_limit)
    }

    /// [`search_toc_prefix`](Self::search_toc_prefix) with the configured limit.
    pub fn search_toc(&self, raw: &str) -> Result<Vec<TocHit>> {
        self.search_toc_prefix(raw, self.config.default_limit)
    }

    pub fn stats(&self) -> EngineStats {
        let dictionary = self.dictionary();
        EngineStats {
            gateway: self.gateway.stats(),
            dictionary_available: dictionary.is_some(),
            dictionary_terms: dictionary.as_ref().map_or(0, |d| d.len()),
            dictionary_groups: dictionary.as_ref().map_or(0, |d| d.group_count()),
        }
    }

    /// Release the index. Idempotent.
    pub fn close(&self) {
        self.gateway.close();
    }
}
