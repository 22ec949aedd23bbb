use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::store::Backend;

pub fn resolve_db_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(p) = cli.db.clone() {
        return Ok(p);
    }
    default_db_path(cli.backend)
}

/// One file per backend kind, directly under the home directory.
pub fn default_db_path(backend: Backend) -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to resolve home directory"))?;
    Ok(home.join(backend.default_file_name()))
}

/// Logs go to stderr so stdout carries only results. `RUST_LOG` wins over `--quiet`.
pub fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
