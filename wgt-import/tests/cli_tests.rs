//! Tests that drive the `wgt-import` binary as a subprocess

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const CONFIG: &str = r#"
[[alias]]
full_name = "Rob Beasley"
player = "rob"

[[alias]]
full_name = "Claire Allen"
player = "claire"

[[alias]]
full_name = "Pete Gibbons"
player = "pete"
"#;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/group_chat.txt")
}

/// Run the binary with a clean environment rooted at `home`
fn wgt_import(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wgt-import"))
        .args(args)
        .env_clear()
        .env("HOME", home)
        .env("RUST_LOG", "info")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run wgt-import")
}

fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("wgt-import.toml");
    std::fs::write(&path, CONFIG).unwrap();
    path
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_summary_is_reported_when_database_cannot_open() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    // Parent of the database path is a regular file
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let database = blocker.join("wgt.db");
    let summary = dir.path().join("summary.json");

    let output = wgt_import(
        dir.path(),
        &[
            "run",
            fixture().to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--database",
            database.to_str().unwrap(),
            "--summary-json",
            summary.to_str().unwrap(),
        ],
    );

    assert!(!output.status.success());
    let log = String::from_utf8_lossy(&output.stdout);
    assert!(log.contains("Games range: 188 to 191"), "log was:\n{}", log);
    assert!(log.contains("Unknown player: Uncle Bob"), "log was:\n{}", log);

    let json = read_json(&summary);
    assert_eq!(json["operations"], 9);
    assert_eq!(json["unresolved_senders"]["Uncle Bob"], 1);
    assert!(json.get("apply").is_none());
}

#[test]
fn test_dry_run_writes_summary_and_script() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let summary = dir.path().join("summary.json");
    let script = dir.path().join("import.sql");

    let output = wgt_import(
        dir.path(),
        &[
            "run",
            fixture().to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--dry-run",
            "--summary-json",
            summary.to_str().unwrap(),
            "--sql-out",
            script.to_str().unwrap(),
        ],
    );

    assert!(output.status.success(), "stderr:\n{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(read_json(&summary)["observed"], 6);
    let sql = std::fs::read_to_string(&script).unwrap();
    assert_eq!(sql.matches("INSERT INTO scores").count(), 9);
}

#[test]
fn test_apply_report_included_after_store_write() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let database = dir.path().join("data").join("wgt.db");
    let summary = dir.path().join("summary.json");

    let output = wgt_import(
        dir.path(),
        &[
            "run",
            fixture().to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--database",
            database.to_str().unwrap(),
            "--seed-players",
            "--summary-json",
            summary.to_str().unwrap(),
        ],
    );

    assert!(output.status.success(), "stderr:\n{}", String::from_utf8_lossy(&output.stderr));
    let json = read_json(&summary);
    assert_eq!(json["apply"]["inserted"], 9);
    assert_eq!(json["apply"]["skipped"], 0);
}
