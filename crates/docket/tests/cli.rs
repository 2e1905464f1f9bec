use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(
        dir.path().join("Cargo.toml"),
        "[package]\nname = \"sample\"\nversion = \"0.1.0\"\nedition = \"2021\"\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("src/lib.rs"),
        "//! Sample crate.\n\n/// Adds one.\npub fn bump(x: u32) -> u32 {\n    x + 1\n}\n",
    )
    .unwrap();
    dir
}

fn docket() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docket"));
    cmd.env_remove("DOCKET_LOG").env_remove("DOCKET_COLOR");
    cmd
}

#[test]
fn json_prints_the_index() {
    let crate_dir = fixture();
    docket()
        .args(["json", "--"])
        .arg(crate_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sample\"").and(predicate::str::contains("\"bump\"")));
}

#[test]
fn json_writes_index_with_out_dir() {
    let crate_dir = fixture();
    let out = TempDir::new().unwrap();
    docket()
        .args(["json", "--"])
        .arg(crate_dir.path())
        .arg("-d")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("index.json"));
    assert!(out.path().join("index.json").is_file());
}

#[test]
fn outline_lists_declarations() {
    let crate_dir = fixture();
    docket()
        .args(["outline", "--color", "never", "--"])
        .arg(crate_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("package sample").and(predicate::str::contains(
            "    pub fn bump(x: u32) -> u32",
        )));
}

#[test]
fn search_reports_matches_and_misses() {
    let crate_dir = fixture();
    docket()
        .args(["search", "bump", "--domain", "name", "--"])
        .arg(crate_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("fn sample::bump [name]"));

    docket()
        .args(["search", "nothing-here", "--"])
        .arg(crate_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No matches for \"nothing-here\""));
}

#[test]
fn html_renders_into_out_dir() {
    let crate_dir = fixture();
    let out = TempDir::new().unwrap();
    let site = out.path().join("site");
    docket()
        .args(["html", "--project", "Sample", "--"])
        .arg(crate_dir.path())
        .arg("-d")
        .arg(&site)
        .assert()
        .success();
    assert!(site.join("index.html").is_file());
    assert!(site.join("sample/fn.bump.html").is_file());
    let root = fs::read_to_string(site.join("index.html")).unwrap();
    assert!(root.contains("Sample"));
}

#[test]
fn html_requires_out_dir() {
    let crate_dir = fixture();
    docket()
        .args(["html", "--"])
        .arg(crate_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("output directory"));
}

#[test]
fn missing_source_fails() {
    let dir = TempDir::new().unwrap();
    docket()
        .args(["json", "--"])
        .arg(dir.path().join("missing.rs"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Source not found"));
}
