use std::path::PathBuf;
use std::time::Duration;

/// Failure to open or read a jar as a zip archive.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read zip structure of {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("lmdb error: {0}")]
    Lmdb(#[from] heed::Error),

    #[error("failed to encode store value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("class name of {len} bytes cannot be stored")]
    InvalidClassName { len: usize },

    #[error("store {path} is unavailable: {reason}")]
    Unavailable { path: PathBuf, reason: String },

    #[error("store {path} is held by another process (waited {timeout:?})")]
    Locked { path: PathBuf, timeout: Duration },

    #[error("store {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

impl StoreError {
    /// True when the store itself cannot be used, as opposed to a single failed read or write.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable { .. } | StoreError::Locked { .. } | StoreError::Corrupt { .. }
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum FindError {
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
