//! Integration tests for top-level CLI behavior.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(home: &Path, args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_tree-autoload");
    Command::new(bin)
        .args(args)
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run tree-autoload binary")
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    for (relative, content) in [
        ("app/controllers/foo.toml", "name = \"controllers.foo\"\n"),
        ("app/routes/foo.toml", "name = \"routes.foo\"\n"),
        ("app/routes/baz/bar.toml", "name = \"routes.baz.bar\"\n"),
    ] {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

#[test]
fn prints_json_result() {
    let dir = fixture();
    let app = dir.path().join("app");
    let output = run(
        dir.path(),
        &[app.to_str().unwrap(), "--tree", "--namespaces", "--sort"],
    );
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["app"]["routes"]["baz"]["bar"]["name"], "routes.baz.bar");
    assert_eq!(
        value["namespaces"],
        serde_json::json!(["controllers.foo", "routes.baz.bar", "routes.foo"])
    );
}

#[test]
fn text_format_lists_namespaces() {
    let dir = fixture();
    let app = dir.path().join("app");
    let output = run(
        dir.path(),
        &[
            app.to_str().unwrap(),
            "--namespaces",
            "--sort",
            "--skip",
            "routes.foo",
            "--format",
            "text",
        ],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("<namespaces>\ncontrollers.foo\nroutes.baz.bar\n</namespaces>"));
}

#[test]
fn preset_is_picked_up_from_config_dir() {
    let dir = fixture();
    let presets = dir.path().join(".config/tree_autoload/presets.toml");
    fs::create_dir_all(presets.parent().unwrap()).unwrap();
    fs::write(&presets, "[app]\nfiles_to_skip = [\"routes.baz\"]\n").unwrap();

    let app = dir.path().join("app");
    let output = run(dir.path(), &[app.to_str().unwrap(), "--namespaces", "--sort"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value["namespaces"],
        serde_json::json!(["controllers.foo", "routes.foo"])
    );
}

#[test]
fn missing_path_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["--tree"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("missing required path"));
}

#[test]
fn nonexistent_directory_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    let output = run(dir.path(), &[missing.to_str().unwrap(), "--tree"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("does not exist"));
}

#[test]
fn keep_going_reports_failures() {
    let dir = fixture();
    fs::write(dir.path().join("app/routes/broken.toml"), "= nope").unwrap();

    let app = dir.path().join("app");
    let failing = run(dir.path(), &[app.to_str().unwrap(), "--namespaces"]);
    assert!(!failing.status.success());

    let output = run(dir.path(), &[app.to_str().unwrap(), "--namespaces", "--keep-going"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["failures"][0]["namespace"], "routes.broken");
    assert_eq!(value["namespaces"].as_array().unwrap().len(), 3);
}
