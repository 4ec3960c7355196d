use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tubescribe(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tubescribe").unwrap();
    cmd.env_remove("TUBESCRIBE_CONFIG")
        .arg("--config")
        .arg(config_dir.path().join("config.yaml"));
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("tubescribe")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("transcribe"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_invalid_url_fails_without_network() {
    let dir = TempDir::new().unwrap();

    tubescribe(&dir)
        .args(["transcribe", "not a url", "--no-metadata", "--quiet"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Invalid YouTube URL or video ID: not a url"));
}

#[test]
fn test_config_show_writes_default_file() {
    let dir = TempDir::new().unwrap();

    tubescribe(&dir)
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current Configuration:"))
        .stdout(predicate::str::contains("Sentences per Paragraph: 4"));

    assert!(dir.path().join("config.yaml").exists());
}

#[test]
fn test_batch_reports_failures_and_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let list = dir.path().join("urls.txt");
    fs_err::write(
        &list,
        "# inputs that cannot resolve\nnot a url\n\nhttps://example.com/watch?v=dQw4w9WgXcQ\n",
    )
    .unwrap();

    tubescribe(&dir)
        .args(["batch", "--no-metadata", "--quiet"])
        .arg(&list)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processed:  2"))
        .stderr(predicate::str::contains("Failed:     2"))
        .stderr(predicate::str::contains("not a url"))
        .stderr(predicate::str::contains("https://example.com/watch?v=dQw4w9WgXcQ"));
}

#[test]
fn test_batch_rejects_empty_list() {
    let dir = TempDir::new().unwrap();
    let list = dir.path().join("urls.txt");
    fs_err::write(&list, "# nothing\n   \n").unwrap();

    tubescribe(&dir)
        .args(["batch"])
        .arg(&list)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No URLs found"));
}

#[test]
fn test_json_log_format_emits_json_lines() {
    let dir = TempDir::new().unwrap();

    tubescribe(&dir)
        .env_remove("RUST_LOG")
        .args(["config", "--log-format", "json"])
        .assert()
        .success()
        .stderr(predicate::str::contains(r#""level":"INFO""#))
        .stderr(predicate::str::contains("Wrote default configuration"));
}
