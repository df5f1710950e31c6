//! Configuration for the lookup engine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LookupError, Result};
use crate::lookup::cache::QueryCacheConfig;
use crate::lookup::gateway::DEFAULT_LIMIT;

/// Settings for [`LookupEngine`](crate::engine::LookupEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Directory holding the pre-built lookup index.
    pub index_dir: PathBuf,
    /// SQLite dictionary store. Without one, queries are not expanded.
    pub dictionary_path: Option<PathBuf>,
    /// Result cap applied when the caller does not pass one.
    pub default_limit: usize,
    /// Expand tokens through the morphological dictionary.
    pub expand_queries: bool,
    /// Query-result cache.
    pub cache: QueryCacheConfig,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from("lookup_index"),
            dictionary_path: None,
            default_limit: DEFAULT_LIMIT,
            expand_queries: true,
            cache: QueryCacheConfig::default(),
        }
    }
}

impl LookupConfig {
    pub fn new<P: Into<PathBuf>>(index_dir: P) -> Self {
        Self {
            index_dir: index_dir.into(),
            ..Default::default()
        }
    }

    /// Read a JSON configuration file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LookupError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_index_dir<P: Into<PathBuf>>(mut self, index_dir: P) -> Self {
        self.index_dir = index_dir.into();
        self
    }

    pub fn with_dictionary<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.dictionary_path = Some(path.into());
        self
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn with_expansion(mut self, enabled: bool) -> Self {
        self.expand_queries = enabled;
        self
    }

    pub fn with_cache(mut self, cache: QueryCacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Reject settings no engine can run with.
    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 {
            return Err(LookupError::config("default_limit must be greater than zero"));
        }
        if self.index_dir.as_os_str().is_empty() {
            return Err(LookupError::config("index_dir must not be empty"));
        }
        if self.cache.enabled {
            if self.cache.max_entries == 0 {
                return Err(LookupError::config("cache.max_entries must be greater than zero"));
            }
            if self.cache.max_bytes == 0 {
                return Err(LookupError::config("cache.max_bytes must be greater than zero"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = LookupConfig::default();
        assert_eq!(config.default_limit, 20);
        assert!(config.expand_queries);
        assert!(config.dictionary_path.is_none());
        assert_eq!(config.cache.max_entries, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = LookupConfig::new("/data/index")
            .with_dictionary("/data/lexical.db")
            .with_default_limit(5)
            .with_expansion(false)
            .with_cache(QueryCacheConfig::disabled());
        assert_eq!(config.index_dir, PathBuf::from("/data/index"));
        assert_eq!(config.dictionary_path, Some(PathBuf::from("/data/lexical.db")));
        assert_eq!(config.default_limit, 5);
        assert!(!config.expand_queries);
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let config = LookupConfig::default().with_default_limit(0);
        assert!(matches!(config.validate(), Err(LookupError::Config(_))));
    }

    #[test]
    fn test_validate_cache_ceilings() {
        let mut cache = QueryCacheConfig::default();
        cache.max_bytes = 0;
        assert!(LookupConfig::default().with_cache(cache.clone()).validate().is_err());

        cache.enabled = false;
        assert!(LookupConfig::default().with_cache(cache).validate().is_ok());
    }

    #[test]
    fn test_from_file_partial() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lookup.json");
        fs::write(
            &path,
            r#"{"index_dir": "/srv/index", "default_limit": 7, "cache": {"max_entries": 10}}"#,
        )
        .unwrap();

        let config = LookupConfig::from_file(&path).unwrap();
        assert_eq!(config.index_dir, PathBuf::from("/srv/index"));
        assert_eq!(config.default_limit, 7);
        assert_eq!(config.cache.max_entries, 10);
        assert_eq!(config.cache.min_frequency, 2);
        assert!(config.expand_queries);
    }

    #[test]
    fn test_from_file_errors() {
        let dir = TempDir::new().unwrap();
        assert!(LookupConfig::from_file(dir.path().join("missing.json")).is_err());

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(LookupConfig::from_file(&bad), Err(LookupError::Json(_))));
    }
}
