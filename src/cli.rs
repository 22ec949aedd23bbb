use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::store::Backend;

#[derive(Debug, Clone, Parser)]
#[command(name = "jar-index")]
#[command(about = "Index the Java classes in a directory of jars and find which jar defines a class")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, value_enum, default_value_t = Backend::Lmdb, global = true)]
    pub backend: Backend,

    #[arg(long, value_name = "FILE", global = true)]
    pub db: Option<PathBuf>,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Add all jars below a folder to the index
    Index {
        folder: PathBuf,

        #[arg(long)]
        json: bool,
    },
    /// Find a class or package in the index
    Find {
        #[arg(value_name = "PATTERN")]
        pattern: String,
    },
    /// Show stats about the index
    Stats {
        #[arg(long)]
        json: bool,
    },
}
