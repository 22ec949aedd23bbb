//! Path-derived identity of an indexed archive.
//!
//! The fingerprint hashes the path string, not the archive bytes: the same path always
//! maps to the same identity, and moving a jar gives it a new one.

use sha1::{Digest, Sha1};

/// Lowercase hex SHA-1 of `path`.
pub fn fingerprint(path: &str) -> String {
    hex::encode(Sha1::digest(path.as_bytes()))
}
