use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

/// Write a config plus sync/metadata snapshots into `dir` and return
/// the config path.
fn write_fixtures(dir: &Path) -> std::path::PathBuf {
    let db_path = dir.join("sync.json");
    fs::write(
        &db_path,
        r#"[
            {"name": "zlib", "version": "1.3.1"},
            {"name": "curl", "version": "8.9.1", "depends": ["zlib"]}
        ]"#,
    )
    .unwrap();

    let cache_path = dir.join("metadata.json");
    fs::write(
        &cache_path,
        r#"[
            {
                "name": "paclight",
                "version": "2.1.0",
                "depends": ["curl", "meson:build", "extra-theme:optional"]
            },
            {"name": "meson", "version": "1.5.1"}
        ]"#,
    )
    .unwrap();

    let config_path = dir.join("config.toml");
    fs::write(
        &config_path,
        format!(
            "[database]\npath = {db:?}\n\n[metadata]\ncache-path = {cache:?}\n",
            db = db_path,
            cache = cache_path
        ),
    )
    .unwrap();
    config_path
}

#[test]
fn graph_prints_nodes_and_layers() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixtures(dir.path());

    Command::cargo_bin("grava")
        .unwrap()
        .args(["--config", config.to_str().unwrap(), "graph", "paclight"])
        .assert()
        .success()
        .stdout(predicate::str::contains("paclight-2.1.0 (source, target)"))
        .stdout(predicate::str::contains("curl-8.9.1 (local)"))
        .stdout(predicate::str::contains("runtime -> curl"))
        .stdout(predicate::str::contains("build -> meson"))
        .stdout(predicate::str::contains("layers map"))
        .stdout(predicate::str::contains("layer 0: extra-theme meson zlib"))
        .stdout(predicate::str::contains("layer 1: curl"))
        .stdout(predicate::str::contains("layer 2: paclight"));
}

#[test]
fn no_optional_excludes_optional_branch() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixtures(dir.path());

    Command::cargo_bin("grava")
        .unwrap()
        .args([
            "--config",
            config.to_str().unwrap(),
            "graph",
            "--no-optional",
            "paclight",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("extra-theme").not());
}

#[test]
fn installed_packages_are_omitted_from_layers() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixtures(dir.path());

    Command::cargo_bin("grava")
        .unwrap()
        .args([
            "--config",
            config.to_str().unwrap(),
            "graph",
            "--no-optional",
            "--installed",
            "curl",
            "--installed",
            "zlib",
            "paclight",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("layer 0: meson\n"))
        .stdout(predicate::str::contains("layer 1: paclight\n"));
}

#[test]
fn unresolved_target_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixtures(dir.path());

    Command::cargo_bin("grava")
        .unwrap()
        .args(["--config", config.to_str().unwrap(), "graph", "ghost"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("ghost (missing, target)"));
}
