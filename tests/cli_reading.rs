use std::fs;
use std::path::{Path, PathBuf};

use predicates::prelude::*;

fn write_book(dir: &Path) -> anyhow::Result<PathBuf> {
    let path = dir.join("book.yaml");
    fs::write(
        &path,
        r#"id: 42
title: The Long Read
author: A. Writer
chapters:
  - title: Opening
    pages: ["first page", "second page"]
  - title: Closing
    pages: ["last page"]
"#,
    )?;
    Ok(path)
}

fn readmark(data_dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("readmark");
    cmd.env_remove("RUST_LOG")
        .env_remove("READMARK_KEY_PREFIX")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn stored(data_dir: &Path) -> anyhow::Result<serde_json::Value> {
    let raw = fs::read_to_string(data_dir.join("store.json"))?;
    Ok(serde_json::from_str(&raw)?)
}

#[test]
fn navigation_crosses_chapters_and_persists_progress() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let data = temp.path().join("data");
    let book = write_book(temp.path())?;

    readmark(&data)
        .args(["nav", "next", "--chapter", "0", "--page", "1", "--book"])
        .arg(&book)
        .assert()
        .success()
        .stdout("chapter 1 page 0\nlast page\n");

    readmark(&data)
        .args(["nav", "next", "--chapter", "1", "--page", "0", "--book"])
        .arg(&book)
        .assert()
        .success()
        .stdout("chapter 1 page 0 (end of book)\nlast page\n");

    readmark(&data)
        .args(["nav", "prev", "--chapter", "1", "--page", "0", "--book"])
        .arg(&book)
        .assert()
        .success()
        .stdout("chapter 0 page 1\nsecond page\n");

    let store = stored(&data)?;
    assert_eq!(store["readingProgress_42"], r#"{"0":1,"1":0}"#);

    readmark(&data)
        .args(["show", "--book"])
        .arg(&book)
        .assert()
        .success()
        .stdout(predicate::str::contains("[0] Opening 50.0% (page 2 of 2)"))
        .stdout(predicate::str::contains("overall 100.0%"));
    Ok(())
}

#[test]
fn chapter_jump_rejects_unknown_chapter() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let data = temp.path().join("data");
    let book = write_book(temp.path())?;

    readmark(&data)
        .args(["nav", "chapter", "--index", "1", "--book"])
        .arg(&book)
        .assert()
        .success()
        .stdout("chapter 1 page 0\nlast page\n");

    readmark(&data)
        .args(["nav", "chapter", "--index", "2", "--book"])
        .arg(&book)
        .assert()
        .failure()
        .stderr(predicate::str::contains("chapter index 2 out of range"));
    Ok(())
}

#[test]
fn bookmark_toggle_twice_restores_set() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let data = temp.path().join("data");
    let book = write_book(temp.path())?;

    readmark(&data)
        .args(["bookmark", "toggle", "--chapter", "0", "--page", "1", "--book"])
        .arg(&book)
        .assert()
        .success()
        .stdout("bookmark 0-1 added (1 total)\n");
    readmark(&data)
        .args(["bookmark", "list", "--book-id", "42"])
        .assert()
        .success()
        .stdout("0-1\n");

    readmark(&data)
        .args(["bookmark", "toggle", "--chapter", "0", "--page", "1", "--book"])
        .arg(&book)
        .assert()
        .success()
        .stdout("bookmark 0-1 removed (0 total)\n");
    readmark(&data)
        .args(["bookmark", "list", "--book-id", "42"])
        .assert()
        .success()
        .stdout("");
    Ok(())
}

#[test]
fn favorite_toggle_reports_membership() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let data = temp.path().join("data");

    readmark(&data)
        .args(["favorite", "toggle", "--book-id", "7"])
        .assert()
        .success()
        .stdout("7 added to favorites\n");
    readmark(&data)
        .args(["favorite", "list"])
        .assert()
        .success()
        .stdout("7\n");
    readmark(&data)
        .args(["favorite", "toggle", "--book-id", "7"])
        .assert()
        .success()
        .stdout("7 removed from favorites\n");
    Ok(())
}

#[test]
fn corrupted_progress_entry_is_healed() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let data = temp.path().join("data");
    let book = write_book(temp.path())?;
    fs::create_dir_all(&data)?;
    fs::write(
        data.join("store.json"),
        r#"{"readingProgress_42": "{not json", "favorites": "[\"42\"]"}"#,
    )?;

    readmark(&data)
        .args(["show", "--book"])
        .arg(&book)
        .assert()
        .success()
        .stdout(predicate::str::contains("[0] Opening 0.0%"))
        .stdout(predicate::str::contains("favorite: yes"));

    let store = stored(&data)?;
    assert!(store.get("readingProgress_42").is_none());
    assert_eq!(store["favorites"], r#"["42"]"#);
    Ok(())
}

#[test]
fn key_prefix_and_clear_all() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let data = temp.path().join("data");

    readmark(&data)
        .args(["--key-prefix", "v2", "purchase", "add", "--book-id", "3"])
        .assert()
        .success();
    assert_eq!(stored(&data)?["v2:purchases"], r#"{"3":true}"#);

    readmark(&data)
        .args(["clear", "--all"])
        .assert()
        .success()
        .stdout("cleared all reading data\n");
    assert_eq!(stored(&data)?, serde_json::json!({}));
    Ok(())
}

#[test]
fn quota_exceeded_purchase_fails() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let data = temp.path().join("data");

    readmark(&data)
        .args(["--quota-bytes", "4", "purchase", "add", "--book-id", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not persist purchase of 3"));
    Ok(())
}

#[test]
fn show_survives_huge_stored_page() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let data = temp.path().join("data");
    let book = write_book(temp.path())?;
    fs::create_dir_all(&data)?;
    fs::write(
        data.join("store.json"),
        serde_json::json!({ "readingProgress_42": format!("{{\"0\":{}}}", usize::MAX) })
            .to_string(),
    )?;

    readmark(&data)
        .args(["show", "--book"])
        .arg(&book)
        .assert()
        .success()
        .stdout(predicate::str::contains("[0] Opening 100.0%"))
        .stdout(predicate::str::contains("overall 100.0%"));
    Ok(())
}

#[test]
fn infinite_session_length_keeps_recorded_stats() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let data = temp.path().join("data");

    readmark(&data)
        .args(["stats", "record", "--book-id", "42", "--words", "100"])
        .args(["--pages", "3", "--seconds", "60"])
        .assert()
        .success();
    readmark(&data)
        .args(["stats", "record", "--book-id", "42", "--words", "10"])
        .args(["--pages", "1", "--seconds", "inf"])
        .assert()
        .success();

    let output = readmark(&data)
        .args(["stats", "show", "--book-id", "42"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stats: serde_json::Value = serde_json::from_slice(&output)?;
    assert_eq!(stats["wordsRead"], 100);
    assert_eq!(stats["pagesRead"], 3);
    assert_eq!(stats["totalReadingTime"], 60.0);
    Ok(())
}

#[test]
fn rust_log_debug_emits_debug_line_to_stderr() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let data = temp.path().join("data");

    readmark(&data)
        .env("RUST_LOG", "debug")
        .args(["favorite", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
    Ok(())
}
