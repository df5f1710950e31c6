//! Lifecycle wrapper around the morphological dictionary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::analysis::normalizer::{HebrewNormalizer, TextNormalizer};
use crate::error::Result;
use crate::morphology::dictionary::MorphologyDictionary;

/// Owns the current dictionary generation for a configured store location.
///
/// `init` and `reload` build a fresh immutable [`MorphologyDictionary`] and
/// swap it in; readers that already hold an `Arc` keep the previous one.
pub struct DictionaryService {
    path: Option<PathBuf>,
    normalizer: Arc<dyn TextNormalizer>,
    current: RwLock<Option<Arc<MorphologyDictionary>>>,
}

impl std::fmt::Debug for DictionaryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictionaryService")
            .field("path", &self.path)
            .field("available", &self.is_available())
            .finish()
    }
}

impl DictionaryService {
    /// Create a service using the Hebrew normalizer. Nothing is read until
    /// [`init`](Self::init).
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        Ok(Self::with_normalizer(path, Arc::new(HebrewNormalizer::new()?)))
    }

    pub fn with_normalizer(path: Option<PathBuf>, normalizer: Arc<dyn TextNormalizer>) -> Self {
        Self {
            path,
            normalizer,
            current: RwLock::new(None),
        }
    }

    /// A service that never expands.
    pub fn disabled() -> Result<Self> {
        Self::new(None)
    }

    /// Wrap an already-built dictionary.
    pub fn from_dictionary(dictionary: MorphologyDictionary) -> Result<Self> {
        let service = Self::new(None)?;
        *service.current.write() = Some(Arc::new(dictionary));
        Ok(service)
    }

    /// Load the dictionary if it is not loaded yet. Returns availability.
    pub fn init(&self) -> bool {
        if self.is_available() {
            return true;
        }
        self.reload()
    }

    /// Rebuild the dictionary from the store. On failure the service becomes
    /// unavailable and search falls back to literal tokens.
    pub fn reload(&self) -> bool {
        let Some(path) = self.path.as_deref() else {
            return self.is_available();
        };

        let loaded = MorphologyDictionary::load(self.normalizer.as_ref(), Some(path)).map(Arc::new);
        let available = loaded.is_some();
        *self.current.write() = loaded;
        available
    }

    pub fn is_available(&self) -> bool {
        self.current.read().is_some()
    }

    /// The dictionary currently served, if any.
    pub fn current(&self) -> Option<Arc<MorphologyDictionary>> {
        self.current.read().clone()
    }

    /// Store location, if configured.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
