//! Refreshable searcher management over the lookup index.
//!
//! [`SearcherManager`] opens the index lazily, checks for a newer commit
//! before each query batch and hands out reference-counted
//! [`SearcherLease`]s. A lease pins one index generation and is released
//! when dropped, on every exit path.
//!
//! The searcher and the opstamp labelling it are swapped together, so a
//! lease never pairs one generation's searcher with another's label.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};
use tantivy::{Index, IndexReader, ReloadPolicy, Searcher};

use crate::error::{LookupError, Result};
use crate::lookup::schema::LookupFields;

/// The searcher currently served and the opstamp it was loaded for.
#[derive(Clone)]
struct Snapshot {
    searcher: Searcher,
    generation: u64,
}

/// An opened index together with its reader.
struct OpenIndex {
    index: Index,
    reader: IndexReader,
    fields: LookupFields,
    current: RwLock<Snapshot>,
}

impl OpenIndex {
    fn snapshot(&self) -> Snapshot {
        self.current.read().clone()
    }

    fn generation(&self) -> u64 {
        self.current.read().generation
    }
}

enum ManagerState {
    Unopened,
    Open(Arc<OpenIndex>),
    Closed,
}

/// Owns the read lifecycle of one index directory.
pub struct SearcherManager {
    index_dir: PathBuf,
    state: RwLock<ManagerState>,
    /// Held while reloading; callers finding it taken keep the current searcher.
    refresh_lock: Mutex<()>,
    in_use: Arc<AtomicUsize>,
    refreshes: AtomicU64,
}

impl std::fmt::Debug for SearcherManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearcherManager")
            .field("index_dir", &self.index_dir)
            .field("open", &self.is_open())
            .field("in_use", &self.in_use())
            .finish()
    }
}

impl SearcherManager {
    /// Create a manager for `index_dir`. No I/O happens until the first query.
    pub fn new<P: AsRef<Path>>(index_dir: P) -> Self {
        SearcherManager {
            index_dir: index_dir.as_ref().to_path_buf(),
            state: RwLock::new(ManagerState::Unopened),
            refresh_lock: Mutex::new(()),
            in_use: Arc::new(AtomicUsize::new(0)),
            refreshes: AtomicU64::new(0),
        }
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    /// Whether the index has been opened and not closed.
    pub fn is_open(&self) -> bool {
        matches!(*self.state.read(), ManagerState::Open(_))
    }

    /// Opstamp of the generation currently served, once open.
    pub fn generation(&self) -> Option<u64> {
        match &*self.state.read() {
            ManagerState::Open(open) => Some(open.generation()),
            _ => None,
        }
    }

    /// Number of leases not yet released.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    /// Number of reloads performed so far.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    fn ensure_open(&self) -> Result<Arc<OpenIndex>> {
        match &*self.state.read() {
            ManagerState::Open(open) => return Ok(Arc::clone(open)),
            ManagerState::Closed => return Err(LookupError::Closed),
            ManagerState::Unopened => {}
        }

        let mut state = self.state.write();
        match &*state {
            ManagerState::Open(open) => Ok(Arc::clone(open)),
            ManagerState::Closed => Err(LookupError::Closed),
            ManagerState::Unopened => {
                let open = Arc::new(self.open_index()?);
                *state = ManagerState::Open(Arc::clone(&open));
                Ok(open)
            }
        }
    }

    fn open_index(&self) -> Result<OpenIndex> {
        if !self.index_dir.is_dir() {
            return Err(LookupError::index(format!(
                "index directory not found: {}",
                self.index_dir.display()
            )));
        }

        let index = Index::open_in_dir(&self.index_dir)?;
        let fields = LookupFields::resolve(&index.schema())?;
        // Read before the reader loads, so the label never runs ahead of it.
        let generation = index.load_metas()?.opstamp;
        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        log::info!(
            "Opened lookup index {} at generation {}",
            self.index_dir.display(),
            generation
        );

        let searcher = reader.searcher();
        Ok(OpenIndex {
            index,
            reader,
            fields,
            current: RwLock::new(Snapshot {
                searcher,
                generation,
            }),
        })
    }

    /// Reload the reader if a newer commit exists. Returns whether a reload
    /// happened.
    ///
    /// An unchanged index costs one metadata read and takes no lock. If
    /// another caller is already reloading this returns `Ok(false)` at once
    /// and the caller keeps the current searcher.
    pub fn maybe_refresh(&self) -> Result<bool> {
        let open = self.ensure_open()?;
        if open.index.load_metas()?.opstamp == open.generation() {
            return Ok(false);
        }

        let Some(_guard) = self.refresh_lock.try_lock() else {
            return Ok(false);
        };

        // Whoever held the lock may have reloaded already.
        let on_disk = open.index.load_metas()?.opstamp;
        if on_disk == open.generation() {
            return Ok(false);
        }

        open.reader.reload()?;
        *open.current.write() = Snapshot {
            searcher: open.reader.searcher(),
            generation: on_disk,
        };
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        log::debug!("Lookup index refreshed to generation {on_disk}");
        Ok(true)
    }

    /// Acquire the current searcher. Released when the lease drops.
    pub fn acquire(&self) -> Result<SearcherLease> {
        let open = self.ensure_open()?;
        let Snapshot {
            searcher,
            generation,
        } = open.snapshot();
        self.in_use.fetch_add(1, Ordering::AcqRel);
        Ok(SearcherLease {
            searcher,
            fields: open.fields,
            generation,
            in_use: Arc::clone(&self.in_use),
        })
    }

    /// Refresh, acquire, run `f`, release.
    pub fn with_searcher<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&SearcherLease) -> Result<T>,
    {
        self.maybe_refresh()?;
        let lease = self.acquire()?;
        f(&lease)
    }

    /// Release the reader and the directory handle. Idempotent; later
    /// queries fail with [`LookupError::Closed`].
    pub fn close(&self) {
        let previous = std::mem::replace(&mut *self.state.write(), ManagerState::Closed);
        match previous {
            ManagerState::Open(open) => {
                let outstanding = self.in_use();
                if outstanding > 0 {
                    log::warn!(
                        "Closing lookup index {} with {} searcher(s) still in use",
                        self.index_dir.display(),
                        outstanding
                    );
                }
                drop(open);
                log::info!("Closed lookup index {}", self.index_dir.display());
            }
            ManagerState::Unopened => {
                log::debug!("Lookup index {} closed before first use", self.index_dir.display());
            }
            ManagerState::Closed => {}
        }
    }
}

/// A searcher pinned to one index generation.
pub struct SearcherLease {
    searcher: Searcher,
    fields: LookupFields,
    generation: u64,
    in_use: Arc<AtomicUsize>,
}

impl SearcherLease {
    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    pub fn fields(&self) -> &LookupFields {
        &self.fields
    }

    /// Opstamp of the generation this lease pins.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for SearcherLease {
    fn drop(&mut self) {
        self.in_use.fetch_sub(1, Ordering::AcqRel);
    }
}
