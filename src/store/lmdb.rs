//! Transactional backend on LMDB (via heed).
//!
//! One single-file environment holds the `classes` and `jarfiles` databases. Values are
//! JSON strings. Every operation runs in its own transaction, so a read-modify-write of a
//! class entry is last-write-wins.

use heed::types::Str;
use heed::{Database, Env, EnvFlags, EnvOpenOptions};
use std::ops::Bound;
use std::path::Path;
use tracing::warn;

use super::lock::StoreLock;
use super::{
    ArchiveRecord, CLASSES_DB, ClassEntry, Fingerprints, IndexStore, JARFILES_DB, OPEN_TIMEOUT,
    StoreStats, check_class_name,
};
use crate::error::StoreError;

const DEFAULT_MAP_SIZE: usize = 1024 * 1024 * 1024;
const DEFAULT_MAX_DBS: u32 = 4;

type StrDb = Database<Str, Str>;

#[derive(Debug)]
pub struct LmdbStore {
    env: Env,
    classes: StrDb,
    jarfiles: StrDb,
    // Dropped after `env` so the environment is closed before another opener can get in.
    _lock: StoreLock,
}

impl LmdbStore {
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Unavailable {
                path: db_path.to_path_buf(),
                reason: format!("failed to create directory {}: {e}", parent.display()),
            })?;
        }

        let lock = StoreLock::acquire(db_path, OPEN_TIMEOUT)?;
        let env = open_env(db_path)?;

        let mut wtxn = env.write_txn()?;
        let classes = env.create_database::<Str, Str>(&mut wtxn, Some(CLASSES_DB))?;
        let jarfiles = env.create_database::<Str, Str>(&mut wtxn, Some(JARFILES_DB))?;
        wtxn.commit()?;

        Ok(Self {
            env,
            classes,
            jarfiles,
            _lock: lock,
        })
    }
}

impl IndexStore for LmdbStore {
    fn get_archive(&self, fingerprint: &str) -> Result<Option<ArchiveRecord>, StoreError> {
        let rtxn = self.env.read_txn()?;
        let Some(raw) = self.jarfiles.get(&rtxn, fingerprint)? else {
            return Ok(None);
        };
        Ok(decode_or_warn(JARFILES_DB, fingerprint, raw))
    }

    fn put_archive(&self, record: &ArchiveRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record)?;
        let mut wtxn = self.env.write_txn()?;
        self.jarfiles
            .put(&mut wtxn, record.fingerprint().as_str(), json.as_str())?;
        wtxn.commit()?;
        Ok(())
    }

    fn get_class_entry(&self, class_name: &str) -> Result<Option<Fingerprints>, StoreError> {
        check_class_name(class_name)?;
        let rtxn = self.env.read_txn()?;
        let Some(raw) = self.classes.get(&rtxn, class_name)? else {
            return Ok(None);
        };
        Ok(decode_or_warn(CLASSES_DB, class_name, raw))
    }

    fn put_class_entry(
        &self,
        class_name: &str,
        archives: &Fingerprints,
    ) -> Result<(), StoreError> {
        check_class_name(class_name)?;
        let json = serde_json::to_string(archives)?;
        let mut wtxn = self.env.write_txn()?;
        self.classes.put(&mut wtxn, class_name, json.as_str())?;
        wtxn.commit()?;
        Ok(())
    }

    fn scan_classes(
        &self,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ClassEntry>, StoreError> {
        let rtxn = self.env.read_txn()?;
        let lower = match after {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };
        let range: (Bound<&str>, Bound<&str>) = (lower, Bound::Unbounded);

        let mut page = Vec::new();
        for item in self.classes.range(&rtxn, &range)? {
            if page.len() >= limit {
                break;
            }
            let (class_name, raw) = item?;
            if let Some(archives) = decode_or_warn(CLASSES_DB, class_name, raw) {
                page.push(ClassEntry {
                    class_name: class_name.to_string(),
                    archives,
                });
            }
        }
        Ok(page)
    }

    fn stats(&self) -> Result<StoreStats, StoreError> {
        let rtxn = self.env.read_txn()?;
        Ok(StoreStats {
            classes: self.classes.len(&rtxn)?,
            archives: self.jarfiles.len(&rtxn)?,
        })
    }

    fn close(&self) -> Result<(), StoreError> {
        self.env.force_sync()?;
        Ok(())
    }
}

fn open_env(db_path: &Path) -> Result<Env, StoreError> {
    let mut options = EnvOpenOptions::new();
    options.map_size(DEFAULT_MAP_SIZE);
    options.max_dbs(DEFAULT_MAX_DBS);
    // SAFETY: The store lock guarantees this process is the only one opening the environment,
    // and it is opened at most once per process. NO_SUB_DIR keeps the store a single file.
    let opened = unsafe {
        options.flags(EnvFlags::NO_SUB_DIR);
        options.open(db_path)
    };
    opened.map_err(|e| StoreError::Unavailable {
        path: db_path.to_path_buf(),
        reason: format!("failed to open lmdb environment: {e}"),
    })
}

fn decode_or_warn<T: serde::de::DeserializeOwned>(db: &str, key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(db, key, error = %e, "ignoring undecodable value");
            None
        }
    }
}
