//! Flat snapshot backend.
//!
//! The whole index lives in memory and is written to a single JSON file on [`close`].
//! Anything changed after the last successful close is lost if the process dies.
//!
//! [`close`]: IndexStore::close

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::lock::StoreLock;
use super::{
    ArchiveRecord, ClassEntry, Fingerprints, IndexStore, OPEN_TIMEOUT, StoreStats,
    check_class_name,
};
use crate::error::StoreError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotData {
    #[serde(rename = "Entries", default)]
    entries: BTreeMap<String, Fingerprints>,
    #[serde(rename = "JarFiles", default)]
    jar_files: BTreeMap<String, ArchiveRecord>,
}

#[derive(Debug)]
pub struct SnapshotStore {
    data: RwLock<SnapshotData>,
    dirty: AtomicBool,
    path: PathBuf,
    _lock: StoreLock,
}

impl SnapshotStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Unavailable {
                path: path.to_path_buf(),
                reason: format!("failed to create directory {}: {e}", parent.display()),
            })?;
        }

        let lock = StoreLock::acquire(path, OPEN_TIMEOUT)?;
        let data = load(path)?;

        Ok(Self {
            data: RwLock::new(data),
            dirty: AtomicBool::new(false),
            path: path.to_path_buf(),
            _lock: lock,
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, SnapshotData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SnapshotData> {
        self.dirty.store(true, Ordering::Relaxed);
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IndexStore for SnapshotStore {
    fn get_archive(&self, fingerprint: &str) -> Result<Option<ArchiveRecord>, StoreError> {
        Ok(self.read().jar_files.get(fingerprint).cloned())
    }

    fn put_archive(&self, record: &ArchiveRecord) -> Result<(), StoreError> {
        self.write()
            .jar_files
            .insert(record.fingerprint(), record.clone());
        Ok(())
    }

    fn get_class_entry(&self, class_name: &str) -> Result<Option<Fingerprints>, StoreError> {
        check_class_name(class_name)?;
        Ok(self.read().entries.get(class_name).cloned())
    }

    fn put_class_entry(
        &self,
        class_name: &str,
        archives: &Fingerprints,
    ) -> Result<(), StoreError> {
        check_class_name(class_name)?;
        self.write()
            .entries
            .insert(class_name.to_string(), archives.clone());
        Ok(())
    }

    fn scan_classes(
        &self,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ClassEntry>, StoreError> {
        let lower = match after {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };
        let data = self.read();
        Ok(data
            .entries
            .range::<str, _>((lower, Bound::Unbounded))
            .take(limit)
            .map(|(class_name, archives)| ClassEntry {
                class_name: class_name.clone(),
                archives: archives.clone(),
            })
            .collect())
    }

    fn stats(&self) -> Result<StoreStats, StoreError> {
        let data = self.read();
        Ok(StoreStats {
            classes: data.entries.len() as u64,
            archives: data.jar_files.len() as u64,
        })
    }

    fn close(&self) -> Result<(), StoreError> {
        if !self.dirty.load(Ordering::Relaxed) {
            return Ok(());
        }

        let json = serde_json::to_vec(&*self.read())?;
        let mut tmp_os = self.path.as_os_str().to_os_string();
        tmp_os.push(".tmp");
        let tmp = PathBuf::from(tmp_os);
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        self.dirty.store(false, Ordering::Relaxed);
        Ok(())
    }
}

fn load(path: &Path) -> Result<SnapshotData, StoreError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SnapshotData::default()),
        Err(e) => {
            return Err(StoreError::Unavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(SnapshotData::default());
    }
    serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
