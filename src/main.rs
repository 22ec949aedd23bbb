use anyhow::{Context, Result};
use clap::Parser;
use jar_index::cli::{Cli, Commands};
use jar_index::config::{init_logging, resolve_db_path};
use jar_index::finder;
use jar_index::indexer::Indexer;
use jar_index::store::{IndexStore, open_store};
use std::io::Write;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let db_path = resolve_db_path(&cli)?;
    let store = open_store(cli.backend, &db_path).map_err(|e| {
        let what = if e.is_unavailable() {
            "Index is unavailable"
        } else {
            "Failed to open index"
        };
        anyhow::Error::new(e).context(format!("{what}: {}", db_path.display()))
    })?;

    let outcome = run(&cli.command, &store);
    let closed = store
        .close()
        .with_context(|| format!("Failed to close index: {}", db_path.display()));
    outcome?;
    closed
}

fn run(command: &Commands, store: &Arc<dyn IndexStore>) -> Result<()> {
    match command {
        Commands::Index { folder, json } => {
            let report = Indexer::new(store.as_ref()).index_tree(folder);
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        Commands::Find { pattern } => {
            let matches = finder::find(Arc::clone(store), pattern)?;
            let mut out = std::io::stdout().lock();
            for m in matches {
                writeln!(out, "{m}")?;
                out.flush()?;
            }
        }
        Commands::Stats { json } => {
            let stats = store.stats()?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Classes: {}\nJars: {}", stats.classes, stats.archives);
            }
        }
    }
    Ok(())
}
