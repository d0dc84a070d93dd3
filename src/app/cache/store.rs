//! Durable place-key to coordinate store
//!
//! The store is loaded once at the start of a run, mutated only by the
//! coordinator and persisted at checkpoints and at the end. Entries are never
//! overwritten or pruned, so the file grows monotonically across runs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::app::models::{Coordinate, PlaceKey};
use crate::app::persist;
use crate::errors::{CacheError, CacheResult};

/// Mapping persisted to the cache file
pub type CacheRecord = BTreeMap<PlaceKey, Coordinate>;

/// Summary of a cache store's contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSummary {
    /// Total cached places
    pub entries: usize,
    /// Distinct countries across cached keys
    pub countries: usize,
}

/// In-memory cache with JSON file persistence
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
    entries: CacheRecord,
    dirty: bool,
}

impl CacheStore {
    /// Create an empty store that will persist to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: CacheRecord::new(),
            dirty: false,
        }
    }

    /// Load the store from `path`
    ///
    /// A missing file yields an empty store. An unreadable or malformed file
    /// is logged and also yields an empty store; it will be replaced on the
    /// next persist.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_record(&path).await {
            Ok(Some(entries)) => {
                info!(
                    "Loaded {} cached places from {}",
                    entries.len(),
                    path.display()
                );
                entries
            }
            Ok(None) => {
                info!("No cache file at {}, starting empty", path.display());
                CacheRecord::new()
            }
            Err(e) => {
                warn!("{}. Starting with an empty cache", e);
                CacheRecord::new()
            }
        };

        Self {
            path,
            entries,
            dirty: false,
        }
    }

    /// Read the persisted record, returning `Ok(None)` if the file is absent
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Io` if the file cannot be read and
    /// `CacheError::Malformed` if it is not a valid key/coordinate mapping
    pub async fn read_record(path: &Path) -> CacheResult<Option<CacheRecord>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| CacheError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Look up a cached coordinate
    pub fn get(&self, key: &PlaceKey) -> Option<Coordinate> {
        self.entries.get(key).copied()
    }

    /// Whether `key` is cached
    pub fn contains(&self, key: &PlaceKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a coordinate for a key that is not yet cached
    ///
    /// Returns `false` and leaves the existing value untouched if the key is
    /// already present.
    pub fn put(&mut self, key: PlaceKey, coordinate: Coordinate) -> bool {
        if self.entries.contains_key(&key) {
            debug!("Cache already holds {}, keeping existing value", key);
            return false;
        }
        self.entries.insert(key, coordinate);
        self.dirty = true;
        true
    }

    /// Write the full mapping to disk, replacing any previous file
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if serialization or the atomic write fails
    pub async fn persist(&mut self) -> CacheResult<()> {
        let bytes = persist::to_json_bytes(&self.entries)?;
        persist::write_atomic(&self.path, &bytes)
            .await
            .map_err(|source| CacheError::Io {
                path: self.path.clone(),
                source,
            })?;

        self.dirty = false;
        info!(
            "Persisted {} cached places to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Persist only if entries were added since the last write
    pub async fn persist_if_dirty(&mut self) -> CacheResult<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.persist().await?;
        Ok(true)
    }

    /// Path the store persists to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of cached places
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether unsaved entries exist
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read-only view of every entry
    pub fn entries(&self) -> &CacheRecord {
        &self.entries
    }

    /// Summarize the store contents
    pub fn summary(&self) -> CacheSummary {
        let countries: std::collections::HashSet<&str> = self
            .entries
            .keys()
            .filter_map(|key| key.as_str().split_once(crate::constants::KEY_SEPARATOR))
            .map(|(country, _)| country)
            .collect();

        CacheSummary {
            entries: self.entries.len(),
            countries: countries.len(),
        }
    }
}
