//! End-to-end runs of the storobj binary

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn storobj(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_storobj"))
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("STOROBJ_LOG")
        .args(args)
        .output()
        .expect("failed to run storobj")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "storobj failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

#[test]
fn test_set_then_get_with_sled_backend() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("db");
    let db = db.to_str().unwrap();

    stdout(&storobj(
        temp_dir.path(),
        &["--backend", "sled", "--path", db, "set", "prefs", "d", "{\"e\":6}"],
    ));
    let out = stdout(&storobj(
        temp_dir.path(),
        &["--backend", "sled", "--path", db, "get", "prefs", "d.e"],
    ));
    assert_eq!(out, "6");
}

#[test]
fn test_dump_shows_date_marker() {
    let temp_dir = TempDir::new().unwrap();
    let objects = temp_dir.path().join("objects");
    let objects = objects.to_str().unwrap();

    stdout(&storobj(
        temp_dir.path(),
        &["--path", objects, "set", "k", "h", "1970-01-01T00:00:01Z", "--date"],
    ));
    let raw = stdout(&storobj(temp_dir.path(), &["--path", objects, "dump", "k"]));
    assert_eq!(raw, r#"{"h":{"__SO_date":1000}}"#);

    let shown = stdout(&storobj(temp_dir.path(), &["--path", objects, "get", "k", "h"]));
    assert_eq!(shown, "\"1970-01-01T00:00:01.000Z\"");
}

#[test]
fn test_missing_path_fails() {
    let temp_dir = TempDir::new().unwrap();
    let objects = temp_dir.path().join("objects");
    let output = storobj(
        temp_dir.path(),
        &["--path", objects.to_str().unwrap(), "get", "k", "nope"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Nothing at 'nope'"));
}

#[test]
fn test_huge_array_index_fails_cleanly() {
    let temp_dir = TempDir::new().unwrap();
    let objects = temp_dir.path().join("objects");
    let objects = objects.to_str().unwrap();

    stdout(&storobj(temp_dir.path(), &["--path", objects, "set", "k", "c", "[1]"]));
    let output = storobj(
        temp_dir.path(),
        &["--path", objects, "set", "k", "c.100000000000", "1"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("exceeds the limit"));

    let raw = stdout(&storobj(temp_dir.path(), &["--path", objects, "dump", "k"]));
    assert_eq!(raw, r#"{"c":[1]}"#);
}
