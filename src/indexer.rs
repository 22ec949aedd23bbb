use ignore::WalkBuilder;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, info, warn};

use crate::catalog;
use crate::error::IndexError;
use crate::store::{ArchiveRecord, IndexStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// The stored record is at least as new as the file on disk.
    UpToDate,
    Indexed {
        classes: usize,
        added: usize,
        failed: usize,
    },
}

#[derive(Debug, Default, serde::Serialize)]
pub struct IndexReport {
    pub root: String,
    pub scanned_jars: usize,
    pub indexed_jars: usize,
    pub up_to_date_jars: usize,
    pub failed_jars: usize,
    pub cataloged_classes: usize,
    pub added_associations: usize,
    pub failed_classes: usize,
}

pub struct Indexer<'a> {
    store: &'a dyn IndexStore,
}

impl<'a> Indexer<'a> {
    pub fn new(store: &'a dyn IndexStore) -> Self {
        Self { store }
    }

    /// Walks `root` and indexes every file whose name ends in `.jar`.
    ///
    /// Unreadable directories and archives are logged and skipped.
    pub fn index_tree(&self, root: &Path) -> IndexReport {
        let mut report = IndexReport {
            root: root.to_string_lossy().to_string(),
            ..IndexReport::default()
        };

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable path");
                    continue;
                }
            };
            if entry.file_type().is_some_and(|t| t.is_dir()) {
                continue;
            }
            if !entry.file_name().to_string_lossy().ends_with(".jar") {
                continue;
            }

            report.scanned_jars += 1;
            match self.index_archive(entry.path()) {
                Ok(ArchiveOutcome::UpToDate) => report.up_to_date_jars += 1,
                Ok(ArchiveOutcome::Indexed {
                    classes,
                    added,
                    failed,
                }) => {
                    report.indexed_jars += 1;
                    report.cataloged_classes += classes;
                    report.added_associations += added;
                    report.failed_classes += failed;
                }
                Err(e) => {
                    warn!(jar = %entry.path().display(), error = %e, "skipping jar");
                    report.failed_jars += 1;
                }
            }
        }

        report
    }

    /// Indexes one archive unless the stored record shows it unchanged.
    pub fn index_archive(&self, jar_path: &Path) -> Result<ArchiveOutcome, IndexError> {
        let modified_at = jar_path
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or_else(|_| SystemTime::now());
        let record = ArchiveRecord::new(jar_path.to_string_lossy(), modified_at);
        let fingerprint = record.fingerprint();

        if let Some(indexed) = self.store.get_archive(&fingerprint)?
            && indexed.modified_at >= modified_at
        {
            debug!(jar = %record.path, "up to date");
            return Ok(ArchiveOutcome::UpToDate);
        }

        // Read the class list first: a jar that cannot be opened must not get a fresh record.
        let classes = catalog::catalog(jar_path)?;

        info!("Indexing {}", record.path);
        self.store.put_archive(&record)?;

        let mut added = 0usize;
        let mut failed = 0usize;
        for class_name in classes.iter() {
            match self.link_class(class_name, &fingerprint) {
                Ok(true) => added += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(jar = %record.path, class = %class_name, error = %e, "skipping class");
                    failed += 1;
                }
            }
        }

        Ok(ArchiveOutcome::Indexed {
            classes: classes.len(),
            added,
            failed,
        })
    }

    /// Adds `fingerprint` to the class entry; false if it was already there.
    fn link_class(&self, class_name: &str, fingerprint: &str) -> Result<bool, IndexError> {
        let mut archives = self.store.get_class_entry(class_name)?.unwrap_or_default();
        if !archives.insert(fingerprint.to_string()) {
            return Ok(false);
        }
        self.store.put_class_entry(class_name, &archives)?;
        Ok(true)
    }
}
