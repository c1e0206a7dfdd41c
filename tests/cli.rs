use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn linkvault(dir: &Path) -> Command {
    let config = dir.join("config.yaml");
    fs::write(&config, "{}\n").expect("write config");
    let mut cmd = Command::cargo_bin("linkvault").expect("linkvault binary");
    cmd.env_remove("LINKVAULT_COLLECTIONS")
        .env("LINKVAULT_LOG", "off")
        .arg("--config")
        .arg(config);
    cmd
}

#[test]
fn prints_version() {
    let dir = tempdir().unwrap();
    linkvault(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_mentions_feed() {
    let dir = tempdir().unwrap();
    linkvault(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("feed"))
        .stdout(predicate::str::contains("--collections"));
}

#[test]
fn feed_from_bundled_collections() {
    let dir = tempdir().unwrap();
    linkvault(dir.path())
        .arg("feed")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<?xml"))
        .stdout(predicate::str::contains("<category>tools</category>"))
        .stdout(predicate::str::contains("</rss>"));
}

#[test]
fn feed_from_directory_respects_limit() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("news.json"),
        r#"{"title":"News","links":[
            {"title":"Old","url":"https://old.example.com","date":"2020-01-01"},
            {"title":"New","url":"https://new.example.com","date":"2025-01-01"}
        ]}"#,
    )
    .unwrap();

    linkvault(dir.path())
        .arg("feed")
        .arg("--collections")
        .arg(dir.path())
        .args(["--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<title>New</title>"))
        .stdout(predicate::str::contains("<category>news</category>"))
        .stdout(predicate::str::contains("<title>Old</title>").not());
}

#[test]
fn feed_writes_output_file() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("feed.xml");

    linkvault(dir.path())
        .arg("feed")
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.contains("<rss version=\"2.0\""));
}

#[test]
fn missing_collections_directory_fails() {
    let dir = tempdir().unwrap();
    linkvault(dir.path())
        .arg("feed")
        .args(["--collections", "/nonexistent/linkvault/collections"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn missing_config_file_fails() {
    Command::cargo_bin("linkvault")
        .expect("linkvault binary")
        .env("LINKVAULT_LOG", "off")
        .args(["--config", "/nonexistent/linkvault/config.yaml", "feed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file at"));
}
