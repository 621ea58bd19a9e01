//! End-to-end tests for the qiuqiu binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn qiuqiu(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("qiuqiu").unwrap();
    cmd.arg("--database").arg(db).env_remove("RUST_LOG");
    cmd
}

#[test]
fn register_persists_across_invocations() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("qiuqiu.db");

    qiuqiu(&db)
        .args(["register", "--key", "dev1", "tok-abc"])
        .assert()
        .success()
        .stdout("dev1\n");

    qiuqiu(&db)
        .args(["lookup", "tok-abc"])
        .assert()
        .success()
        .stdout("dev1\n");

    qiuqiu(&db)
        .args(["token", "dev1"])
        .assert()
        .success()
        .stdout("tok-abc\n");

    qiuqiu(&db).arg("count").assert().success().stdout("1\n");
}

#[test]
fn delete_then_token_fails() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("qiuqiu.db");

    qiuqiu(&db)
        .args(["register", "--key", "dev1", "tok"])
        .assert()
        .success();
    qiuqiu(&db).args(["delete", "dev1"]).assert().success();

    qiuqiu(&db)
        .args(["token", "dev1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("device key not found: dev1"));
}

#[test]
fn send_logs_message_and_prints_payload() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("qiuqiu.db");

    qiuqiu(&db)
        .args(["register", "--key", "dev1", "tok-abc"])
        .assert()
        .success();

    qiuqiu(&db)
        .args(["send", "tok-abc", "hi", "--timestamp", "1000"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""device_key": "dev1""#));

    qiuqiu(&db)
        .args(["messages", "tok-abc"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""id": "tok-abc-1000""#));
}

#[test]
fn send_rejects_empty_message() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("qiuqiu.db");

    qiuqiu(&db)
        .args(["send", "tok", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("message is required"));
}

#[test]
fn memory_backend_only_accepts_fixed_key() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("unused.db");

    qiuqiu(&db)
        .args(["--memory", "register", "--key", "dev1", "tok"])
        .assert()
        .failure();

    qiuqiu(&db)
        .args(["--memory", "register", "tok"])
        .assert()
        .success()
        .stdout("MemoryBaseKey\n");

    assert!(!db.exists());
}

#[test]
fn config_file_selects_database() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("from-config.db");
    let config = dir.path().join("qiuqiu.toml");
    std::fs::write(
        &config,
        format!(
            "[storage]\nbackend = \"durable\"\ndatabase = {:?}\n",
            db.display().to_string()
        ),
    )
    .unwrap();

    Command::cargo_bin("qiuqiu")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .args(["register", "--key", "dev1", "tok"])
        .assert()
        .success();

    assert!(db.exists());
}
