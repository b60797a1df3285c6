#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

fn journal_stats() -> Command {
    Command::new(env!("CARGO_BIN_EXE_journal-stats"))
}

fn make_store(root: &Path, serial: &str) -> PathBuf {
    let store = root.join(serial).join("datastore-current").join("store");
    fs::create_dir_all(&store).unwrap();
    store
}

fn write_metadata(store: &Path, uid: &str, json: &str) {
    fs::write(store.join(format!("{uid}.metadata")), json).unwrap();
}

/// Two Write records and one Browse record, with share-scope/keep variety.
fn fixture_backup(root: &Path) {
    let store = make_store(root, "SHF00000001");
    write_metadata(
        &store,
        "w1",
        r#"{"activity": "Write", "share-scope": "private", "keep": "1"}"#,
    );
    write_metadata(
        &store,
        "w2",
        r#"{"activity": "Write", "share-scope": "public", "keep": "1"}"#,
    );
    write_metadata(
        &store,
        "b1",
        r#"{"activity": "Browse", "share-scope": "private", "keep": "0"}"#,
    );
}

// --- activity mode, CSV ---

#[test]
fn activity_counts_write_twice_browse_once() {
    let dir = TempDir::new().unwrap();
    fixture_backup(dir.path());
    let out = dir.path().join("out.csv");

    let output = journal_stats()
        .args(["activity", "-d"])
        .arg(dir.path())
        .arg("-o")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());

    let csv = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3); // header + Browse + Write (sorted)
    assert!(lines[1].starts_with("Browse,1"), "line: {}", lines[1]);
    assert!(lines[2].starts_with("Write,2"), "line: {}", lines[2]);
}

#[test]
fn activity_custom_stats_columns() {
    let dir = TempDir::new().unwrap();
    fixture_backup(dir.path());
    let out = dir.path().join("out.csv");

    let output = journal_stats()
        .args(["activity", "-s", "keep", "-d"])
        .arg(dir.path())
        .arg("-o")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());

    let csv = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "activity,count,keep=0,keep=1");
    assert_eq!(lines[1], "Browse,1,1,0");
    assert_eq!(lines[2], "Write,2,0,2");
}

// --- activity mode, JSON ---

#[test]
fn activity_json_counts_sum_to_record_total() {
    let dir = TempDir::new().unwrap();
    fixture_backup(dir.path());
    let out = dir.path().join("out.json");

    let output = journal_stats()
        .args(["activity", "-d"])
        .arg(dir.path())
        .arg("-o")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    let total: u64 = rows.iter().map(|r| r["count"].as_u64().unwrap()).sum();
    assert_eq!(total, 3);
}

#[test]
fn activity_json_breakdown_columns_match_csv() {
    let dir = TempDir::new().unwrap();
    fixture_backup(dir.path());
    let csv_out = dir.path().join("out.csv");
    let json_out = dir.path().join("out.json");

    for out in [&csv_out, &json_out] {
        let output = journal_stats()
            .args(["activity", "-s", "share-scope", "-d"])
            .arg(dir.path())
            .arg("-o")
            .arg(out)
            .output()
            .unwrap();
        assert!(output.status.success());
    }

    let header = fs::read_to_string(&csv_out)
        .unwrap()
        .lines()
        .next()
        .unwrap()
        .to_string();
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_out).unwrap()).unwrap();
    let first = json.as_array().unwrap()[0].as_object().unwrap();

    let mut csv_columns: Vec<&str> = header.split(',').collect();
    let mut json_columns: Vec<&str> = first.keys().map(String::as_str).collect();
    csv_columns.sort_unstable();
    json_columns.sort_unstable();
    assert_eq!(csv_columns, json_columns);
}

// --- records spanning serial directories ---

#[test]
fn activity_aggregates_across_journals() {
    let dir = TempDir::new().unwrap();
    fixture_backup(dir.path());
    let second = make_store(dir.path(), "SHF00000002");
    write_metadata(&second, "w9", r#"{"activity": "Write"}"#);
    let out = dir.path().join("out.csv");

    let output = journal_stats()
        .args(["activity", "-s", "keep", "-d"])
        .arg(dir.path())
        .arg("-o")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.lines().any(|l| l.starts_with("Write,3")), "csv: {csv}");
}

// --- config file defaults ---

#[test]
fn project_config_file_sets_stats_fields() {
    let dir = TempDir::new().unwrap();
    fixture_backup(dir.path());
    fs::write(
        dir.path().join(".journal-stats.toml"),
        "[report]\nstats = [\"keep\"]\n",
    )
    .unwrap();
    let out = dir.path().join("out.csv");

    let output = journal_stats()
        .current_dir(dir.path())
        .args(["activity", "-d"])
        .arg(dir.path())
        .arg("-o")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());

    let header = fs::read_to_string(&out)
        .unwrap()
        .lines()
        .next()
        .unwrap()
        .to_string();
    assert_eq!(header, "activity,count,keep=0,keep=1");
}

#[test]
fn cli_stats_flag_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    fixture_backup(dir.path());
    fs::write(
        dir.path().join(".journal-stats.toml"),
        "[report]\nstats = [\"keep\"]\n",
    )
    .unwrap();
    let out = dir.path().join("out.csv");

    let output = journal_stats()
        .current_dir(dir.path())
        .args(["activity", "-s", "share-scope", "-d"])
        .arg(dir.path())
        .arg("-o")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());

    let header = fs::read_to_string(&out)
        .unwrap()
        .lines()
        .next()
        .unwrap()
        .to_string();
    assert_eq!(header, "activity,count,share-scope=private,share-scope=public");
}
