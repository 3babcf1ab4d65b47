//! Process-wide cache of loaded indexes
//!
//! Loading an index and computing the rollup is much more expensive than a
//! query. Hosts that run many queries, e.g. one per web request, keep the
//! loaded [`Ontology`] in an [`IndexCache`].
//!
//! Entries are keyed by the canonical path and the modification time of the
//! index file. A rewritten file is loaded again, the stale entry of the
//! same path is dropped.
//!
//! Cached ontologies are never modified, they are shared as `Arc`. Loading
//! happens under a single build lock, so concurrent first requests for the
//! same file load it only once.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::time::SystemTime;

use tracing::{debug, info};

use crate::{GoError, GoResult, Ontology};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    modified: Option<SystemTime>,
}

impl CacheKey {
    fn new(path: &Path) -> GoResult<Self> {
        let path = fs::canonicalize(path)
            .map_err(|_| GoError::CannotOpenFile(path.display().to_string()))?;
        let modified = fs::metadata(&path).and_then(|meta| meta.modified()).ok();
        Ok(Self { path, modified })
    }
}

/// Cache of [`Ontology`]s loaded from index files
///
/// # Examples
///
/// ```
/// use genescape::{IndexCache, Ontology};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("index.json.gz");
/// Ontology::from_standard("tests/example.obo", "tests/example.gaf", false)
///     .unwrap()
///     .save(&path)
///     .unwrap();
///
/// let cache = IndexCache::new();
/// let first = cache.get_or_load(&path).unwrap();
/// let second = cache.get_or_load(&path).unwrap();
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct IndexCache {
    entries: RwLock<HashMap<CacheKey, Arc<Ontology>>>,
    build_lock: Mutex<()>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached ontology of `path`, loading it on first access
    ///
    /// # Errors
    ///
    /// - [`GoError::CannotOpenFile`]: The index file does not exist
    /// - [`GoError::LockPoisoned`]: Another thread panicked while loading
    /// - Any error of [`Ontology::from_index_file`]
    pub fn get_or_load<P: AsRef<Path>>(&self, path: P) -> GoResult<Arc<Ontology>> {
        let key = CacheKey::new(path.as_ref())?;
        if let Some(ontology) = self.lookup(&key)? {
            debug!("Cache hit for {}", key.path.display());
            return Ok(ontology);
        }

        let _guard = self.build_lock.lock().map_err(|_| GoError::LockPoisoned)?;
        // another thread may have loaded it while we waited
        if let Some(ontology) = self.lookup(&key)? {
            return Ok(ontology);
        }

        info!("Loading index {}", key.path.display());
        let ontology = Arc::new(Ontology::from_index_file(&key.path)?);

        let mut entries = self.entries.write().map_err(|_| GoError::LockPoisoned)?;
        entries.retain(|cached, _| cached.path != key.path);
        entries.insert(key, Arc::clone(&ontology));
        Ok(ontology)
    }

    fn lookup(&self, key: &CacheKey) -> GoResult<Option<Arc<Ontology>>> {
        let entries = self.entries.read().map_err(|_| GoError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    /// Number of cached ontologies
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all entries
    ///
    /// Ontologies that are still in use elsewhere stay alive until their
    /// last `Arc` is dropped.
    pub fn clear(&self) -> GoResult<()> {
        self.entries
            .write()
            .map_err(|_| GoError::LockPoisoned)?
            .clear();
        Ok(())
    }
}
