//! Integration tests for the CLI
//!
//! Drives the built binary against copies of the DevTools fixtures.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;
use walkdir::WalkDir;

fn manifest_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

/// Helper to create a DevTools root populated with the upstream fixtures
fn setup_devtools_root() -> TempDir {
    let source = manifest_dir().join("tests/fixtures/devtools");
    let dir = TempDir::new().unwrap();
    for entry in WalkDir::new(&source) {
        let entry = entry.unwrap();
        let target = dir.path().join(entry.path().strip_prefix(&source).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
    dir
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_devtools-simpleview"))
        .args(args)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

fn root_arg(dir: &TempDir) -> &str {
    dir.path().to_str().unwrap()
}

#[test]
fn test_apply_help() {
    let output = run(&["apply", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Apply the patch catalog to a DevTools output directory"));
    assert!(stdout.contains("--allow-missing"));
}

#[test]
fn test_apply_patches_fixtures() {
    let root = setup_devtools_root();
    let output = run(&["apply", "--root", root_arg(&root)]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{stdout}");
    assert!(stdout.contains("DevTools root:"));
    assert!(stdout.contains("Summary:"));
    assert!(stdout.contains("inspector-view-show-drawer: Applied"));

    let ui = fs::read_to_string(root.path().join("ui/ui.js")).unwrap();
    assert!(ui.contains("_showDrawer(focus) { return false;"));
}

#[test]
fn test_apply_idempotent() {
    let root = setup_devtools_root();
    assert!(run(&["apply", "--root", root_arg(&root)]).status.success());
    let patched = fs::read_to_string(root.path().join("shell.js")).unwrap();

    let output = run(&["apply", "--root", root_arg(&root)]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Already applied"));
    assert!(!stdout.contains(": Applied"));
    assert_eq!(
        fs::read_to_string(root.path().join("shell.js")).unwrap(),
        patched
    );
}

#[test]
fn test_apply_dry_run_with_diff() {
    let root = setup_devtools_root();
    let original = fs::read_to_string(root.path().join("host/host.js")).unwrap();

    let output = run(&["apply", "--root", root_arg(&root), "--dry-run", "--diff"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("DRY RUN"));
    assert!(stdout.contains("Would apply"));
    assert!(stdout.contains("+++ host/host.js (patched)"));
    assert!(stdout.contains("removePreference(name){return;}"));

    assert_eq!(
        fs::read_to_string(root.path().join("host/host.js")).unwrap(),
        original
    );
}

#[test]
fn test_apply_json_report() {
    let root = setup_devtools_root();
    let output = run(&["apply", "--root", root_arg(&root), "--json"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["builtin"], true);
    assert_eq!(json["dry_run"], false);
    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 11);
    let ui = files.iter().find(|f| f["file"] == "ui/ui.js").unwrap();
    assert_eq!(ui["written"], true);
    assert_eq!(ui["report"]["patches"].as_array().unwrap().len(), 7);
}

#[test]
fn test_not_applicable_patch_fails_unless_allowed() {
    let root = setup_devtools_root();
    let themes = root.path().join("themes/themes.js");
    let drifted = fs::read_to_string(&themes)
        .unwrap()
        .replace("this._themeName = setting.get()", "this._themeName = this._pick()");
    fs::write(&themes, drifted).unwrap();

    let output = run(&["apply", "--root", root_arg(&root), "--dry-run"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("theme-from-extension-settings: Not applicable"));

    let output = run(&["apply", "--root", root_arg(&root), "--allow-missing"]);
    assert!(output.status.success());
    let ui = fs::read_to_string(root.path().join("ui/ui.js")).unwrap();
    assert!(ui.contains("this._defaultTab=undefined;"));
}

#[test]
fn test_missing_files_fail() {
    let empty = TempDir::new().unwrap();
    let output = run(&["apply", "--root", root_arg(&empty), "--allow-missing"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("file not found"));
}

#[test]
fn test_status_command() {
    let root = setup_devtools_root();

    let output = run(&["status", "--root", root_arg(&root)]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Patch Status Report"));
    assert!(stdout.contains("PENDING (23 patches)"));

    assert!(run(&["apply", "--root", root_arg(&root)]).status.success());
    let output = run(&["status", "--root", root_arg(&root)]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("APPLIED (23 patches)"));
    assert!(!stdout.contains("PENDING"));
}

#[test]
fn test_list_with_patch_set() {
    let patches = manifest_dir().join("patches");
    let output = run(&["list", "--patches", patches.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("port-settings"));
    assert!(stdout.contains("(requires create-extension-settings)"));
    assert!(stdout.contains("clear-preferences-noop"));
    assert!(stdout.contains("24 patches"));
}

#[test]
fn test_list_skips_out_of_range_set() {
    let patches = manifest_dir().join("patches/simple-view.toml");
    let output = run(&[
        "list",
        "--patches",
        patches.to_str().unwrap(),
        "--upstream-version",
        "83.0.0",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("patch set simple-view"));
    assert!(!stdout.contains("clear-preferences-noop"));
    assert!(stdout.contains("23 patches"));
}

#[test]
fn test_invalid_patch_set_is_reported() {
    let dir = TempDir::new().unwrap();
    let set = dir.path().join("bad.toml");
    fs::write(
        &set,
        "[[patches]]\nid = \"x\"\nfile = \"a.js\"\nquery = { type = \"regex\", pattern = \"(\" }\noperation = { type = \"delete\" }\n",
    )
    .unwrap();

    let output = run(&["list", "--patches", set.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("bad.toml"));
}
