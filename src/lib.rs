//! # jar-index
//!
//! Builds a persistent index of the Java classes found in a tree of jar files and
//! answers "which jar defines this class?".
//!
//! ## Architecture
//!
//! - **fingerprint**: Path-derived SHA-1 identity of an archive
//! - **catalog**: Lists the class names inside a jar
//! - **store**: Class and archive mappings behind [`store::IndexStore`], with an LMDB
//!   backend and a JSON snapshot backend
//! - **indexer**: Directory walk and modification-time gated re-indexing
//! - **finder**: Regex search over class names, streamed from a background scan

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod finder;
pub mod fingerprint;
pub mod indexer;
pub mod store;
