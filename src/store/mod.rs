//! Persistent class index.
//!
//! Two mappings make up one store: class name -> set of archive fingerprints, and
//! fingerprint -> [`ArchiveRecord`]. The indexer and finder only talk to [`IndexStore`],
//! so the LMDB backend and the JSON snapshot backend are interchangeable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::error::StoreError;
use crate::fingerprint::fingerprint;

pub mod lmdb;
pub mod lock;
pub mod snapshot;
mod unix_time;

pub use lmdb::LmdbStore;
pub use snapshot::SnapshotStore;

pub const CLASSES_DB: &str = "classes";
pub const JARFILES_DB: &str = "jarfiles";

pub const OPEN_TIMEOUT: Duration = Duration::from_secs(1);

/// Longest class name either backend accepts, in bytes. LMDB's default key limit.
pub const MAX_CLASS_NAME_LEN: usize = 511;

/// Fingerprints of the archives that define one class.
pub type Fingerprints = BTreeSet<String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub path: String,
    #[serde(with = "unix_time")]
    pub modified_at: SystemTime,
}

impl ArchiveRecord {
    pub fn new(path: impl Into<String>, modified_at: SystemTime) -> Self {
        Self {
            path: path.into(),
            modified_at,
        }
    }

    pub fn fingerprint(&self) -> String {
        fingerprint(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    pub class_name: String,
    pub archives: Fingerprints,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub classes: u64,
    pub archives: u64,
}

pub trait IndexStore: Send + Sync {
    fn get_archive(&self, fingerprint: &str) -> Result<Option<ArchiveRecord>, StoreError>;

    /// Overwrites the record keyed by `record.fingerprint()`.
    fn put_archive(&self, record: &ArchiveRecord) -> Result<(), StoreError>;

    fn get_class_entry(&self, class_name: &str) -> Result<Option<Fingerprints>, StoreError>;

    fn put_class_entry(&self, class_name: &str, archives: &Fingerprints)
    -> Result<(), StoreError>;

    /// Up to `limit` class entries in ascending name order, strictly after `after`.
    ///
    /// An empty page means the scan is complete.
    fn scan_classes(&self, after: Option<&str>, limit: usize)
    -> Result<Vec<ClassEntry>, StoreError>;

    fn stats(&self) -> Result<StoreStats, StoreError>;

    /// Makes every change durable. The lock on the store is released when it is dropped.
    fn close(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// Transactional LMDB environment, durable per operation.
    #[default]
    Lmdb,
    /// In-memory state persisted as JSON on close.
    Snapshot,
}

impl Backend {
    pub fn default_file_name(self) -> &'static str {
        match self {
            Backend::Lmdb => ".jar-index.lmdb",
            Backend::Snapshot => ".jar-index.json",
        }
    }
}

/// Rejects class names that cannot be a key in every backend: empty, or longer than
/// [`MAX_CLASS_NAME_LEN`] bytes.
pub fn check_class_name(class_name: &str) -> Result<(), StoreError> {
    if class_name.is_empty() || class_name.len() > MAX_CLASS_NAME_LEN {
        return Err(StoreError::InvalidClassName {
            len: class_name.len(),
        });
    }
    Ok(())
}

pub fn open_store(backend: Backend, path: &Path) -> Result<Arc<dyn IndexStore>, StoreError> {
    let store: Arc<dyn IndexStore> = match backend {
        Backend::Lmdb => Arc::new(LmdbStore::open(path)?),
        Backend::Snapshot => Arc::new(SnapshotStore::open(path)?),
    };
    Ok(store)
}
