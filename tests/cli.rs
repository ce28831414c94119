//! # qx2adguard 命令行集成测试
//!
//! 规则源全部是本地文件或行内规则，只有一个指向回环地址的不可达 URL。

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const UNREACHABLE_URL: &str = "http://127.0.0.1:9/reject.list";

/// 创建临时工作目录：规则源列表 + 一个本地规则文件
fn setup(rules: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("local.list"),
        "# local list\nhost-suffix, doubleclick.net, reject\nhost, a.com, reject\n",
    )
    .unwrap();
    fs::write(dir.path().join("rules.txt"), rules).unwrap();
    dir
}

fn cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("qx2adguard").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_convert_local_sources() {
    let dir = setup("# sources\nlocal.list\nhost, a.com, reject\nhost-keyword, track, reject\n");

    cmd(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("translated:   4"))
        .stdout(predicate::str::contains("duplicates:   1"));

    let content = fs::read_to_string(dir.path().join("adguard-rules.txt")).unwrap();
    assert!(content.starts_with("# qx2adguard generated blocklist\n"));
    assert!(content.contains("# local list\n0.0.0.0 doubleclick.net\n||doubleclick.net^\n0.0.0.0 a.com\n||*track*$important\n"));
    assert_eq!(content.matches("0.0.0.0 a.com\n").count(), 1);
    assert!(content.ends_with('\n'));
}

#[test]
fn test_rerun_is_byte_identical() {
    let dir = setup("local.list\nfoobar\n");
    let out = dir.path().join("adguard-rules.txt");

    cmd(dir.path()).assert().success();
    let first = fs::read(&out).unwrap();
    cmd(dir.path()).assert().success();
    let second = fs::read(&out).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_unreachable_url_is_skipped() {
    let dir = setup(&format!("{}\nlocal.list\nhost, b.com, reject\n", UNREACHABLE_URL));

    cmd(dir.path())
        .args(["--timeout", "2", "--retries", "0"])
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join("adguard-rules.txt")).unwrap();
    assert!(content.contains("0.0.0.0 doubleclick.net\n"));
    assert!(content.contains("0.0.0.0 b.com\n"));
}

#[test]
fn test_dry_run_does_not_write() {
    let dir = setup("local.list\n");

    cmd(dir.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("  1: # local list"))
        .stdout(predicate::str::contains("  2: 0.0.0.0 doubleclick.net"));

    assert!(!dir.path().join("adguard-rules.txt").exists());
}

#[test]
fn test_whitelist_and_json_summary() {
    let dir = setup("host-suffix, sub.ads.example.com, reject\nhost, ads.example.com.evil.com, reject\n");
    fs::write(dir.path().join("whitelist.txt"), "@@||ads.example.com^\n").unwrap();

    cmd(dir.path())
        .args(["-w", "whitelist.txt", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"whitelisted\": 2"))
        .stdout(predicate::str::contains("\"emitted\": 1"));

    let content = fs::read_to_string(dir.path().join("adguard-rules.txt")).unwrap();
    assert!(content.contains("# whitelisted: 0.0.0.0 sub.ads.example.com\n"));
    assert!(content.contains("# whitelisted: ||sub.ads.example.com^\n"));
    assert!(content.contains("\n0.0.0.0 ads.example.com.evil.com\n"));
}

#[test]
fn test_literal_mode() {
    let dir = setup("ads.js\n");

    cmd(dir.path()).args(["--mode", "literal"]).assert().success();

    let content = fs::read_to_string(dir.path().join("adguard-rules.txt")).unwrap();
    assert!(content.contains("# Mode: literal\n"));
    assert!(content.contains("\n/ads\\.js/\n"));
}

#[test]
fn test_missing_rules_file_fails() {
    let dir = TempDir::new().unwrap();

    cmd(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read source list"));
}

#[test]
fn test_empty_rules_file_fails() {
    let dir = setup("# nothing here\n\n");

    cmd(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no sources found"));
}

#[test]
fn test_no_rules_produced_fails() {
    let dir = setup("foobar\n");

    cmd(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("unrecognized: 1"))
        .stderr(predicate::str::contains("no rules produced"));

    assert!(!dir.path().join("adguard-rules.txt").exists());
}

#[test]
fn test_write_failure_fails() {
    let dir = setup("local.list\n");

    cmd(dir.path())
        .args(["-o", "missing-dir/out.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to write"));
}
