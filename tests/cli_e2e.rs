mod common;

use std::collections::BTreeSet;
use std::path::Path;
use std::process::{Command, Output};

fn run(cwd: &Path, args: &[&str]) -> anyhow::Result<Output> {
    let bin = env!("CARGO_BIN_EXE_jar-index");
    Ok(Command::new(bin)
        .current_dir(cwd)
        .env("RUST_LOG", "info")
        .args(args)
        .output()?)
}

fn with<'a>(base: &[&'a str], rest: &[&'a str]) -> Vec<&'a str> {
    base.iter().chain(rest).copied().collect()
}

fn stdout_lines(out: &Output) -> BTreeSet<String> {
    String::from_utf8_lossy(&out.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn index_find_stats_round_trip() -> anyhow::Result<()> {
    for backend in ["lmdb", "snapshot"] {
        let dir = tempfile::tempdir()?;
        common::write_fixture_tree(dir.path())?;
        let db = dir.path().join("state").join("index.db");
        let db = db.to_str().expect("utf-8 temp path");
        let base = ["--backend", backend, "--db", db];

        let index = run(dir.path(), &with(&base, &["index", "lib"]))?;
        assert!(index.status.success(), "{}", String::from_utf8_lossy(&index.stderr));
        let log = String::from_utf8_lossy(&index.stderr);
        assert!(log.contains("Indexing lib/a.jar"));
        assert!(log.contains("Indexing lib/b.jar"));
        assert!(index.stdout.is_empty());

        let again = run(dir.path(), &with(&base, &["index", "lib"]))?;
        assert!(again.status.success());
        assert!(!String::from_utf8_lossy(&again.stderr).contains("Indexing"));

        let found = run(dir.path(), &with(&base, &["find", "com.x"]))?;
        assert!(found.status.success());
        let expected: BTreeSet<String> = [
            "com.x.A: lib/a.jar",
            "com.x.A: lib/b.jar",
            "com.x.B: lib/a.jar",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(stdout_lines(&found), expected);

        let found = run(dir.path(), &with(&base, &["find", "com/y/C.class"]))?;
        assert_eq!(
            stdout_lines(&found),
            BTreeSet::from(["com.y.C: lib/b.jar".to_string()])
        );

        let stats = run(dir.path(), &with(&base, &["stats"]))?;
        assert!(stats.status.success());
        assert_eq!(String::from_utf8_lossy(&stats.stdout), "Classes: 3\nJars: 2\n");

        let json = run(dir.path(), &with(&base, &["stats", "--json"]))?;
        let value: serde_json::Value = serde_json::from_slice(&json.stdout)?;
        assert_eq!(value["classes"], 3);
        assert_eq!(value["archives"], 2);
    }
    Ok(())
}

#[test]
fn unreadable_store_fails_the_run() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let db = dir.path().join("index.json");
    std::fs::write(&db, b"{ this is not json")?;

    let out = run(
        dir.path(),
        &["--backend", "snapshot", "--db", db.to_str().expect("utf-8 temp path"), "stats"],
    )?;
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Index is unavailable"), "{stderr}");
    assert!(stderr.contains("is corrupt"), "{stderr}");
    Ok(())
}

#[test]
fn invalid_pattern_fails_the_run() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let db = dir.path().join("index.lmdb");
    let out = run(
        dir.path(),
        &["--db", db.to_str().expect("utf-8 temp path"), "find", "(unclosed"],
    )?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid pattern"));
    Ok(())
}
