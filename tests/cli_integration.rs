//! CLI integration tests for Gantry.
//!
//! These tests drive the binary against synthetic plugin workspaces
//! built in temporary directories.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the gantry binary command.
fn gantry() -> Command {
    Command::cargo_bin("gantry").unwrap()
}

/// Create a temporary directory for test workspaces.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

const CLEAN_MANIFEST: &str = r#"[package]
name = "p"
version = "0.1.0"

[dependencies]
tauri = { version = "2.5.0" }
serde = "1.0"
"#;

/// A plugin whose manifest, surfaces, and bindings all agree.
fn write_consistent_plugin(plugins: &Path, name: &str) {
    let pkg = plugins.join(name);
    write(&pkg.join("Cargo.toml"), CLEAN_MANIFEST);
    write(&pkg.join("src/commands.rs"), "pub(crate) fn ping() {}\n");
    write(&pkg.join("src/mobile.rs"), "pub fn ping() {}\n");
    write(
        &pkg.join("guest-js/index.ts"),
        "import { invoke } from '@tauri-apps/api/core'\n\nexport function ping(): void {}\n",
    );
}

/// A plugin using chrono without declaring it and declaring a command
/// the mobile side never implements.
fn write_broken_plugin(plugins: &Path, name: &str) {
    let pkg = plugins.join(name);
    write(&pkg.join("Cargo.toml"), CLEAN_MANIFEST);
    write(
        &pkg.join("src/commands.rs"),
        "pub(crate) fn start() {}\npub(crate) fn stop() {}\n",
    );
    write(&pkg.join("src/mobile.rs"), "pub fn start() {}\n");
    write(&pkg.join("src/lib.rs"), "use chrono::Utc;\n");
    write(
        &pkg.join("guest-js/index.ts"),
        "import { invoke } from '@tauri-apps/api/core'\n\nexport function start(): void {}\nexport function stop(): void {}\n",
    );
}

// ============================================================================
// gantry analyze
// ============================================================================

#[test]
fn test_analyze_reports_issues_across_workspace() {
    let tmp = temp_dir();
    let plugins = tmp.path().join("plugins");
    write_consistent_plugin(&plugins, "tauri-plugin-ios-camera");
    write_consistent_plugin(&plugins, "tauri-plugin-ios-files");
    write_broken_plugin(&plugins, "tauri-plugin-ios-motion");

    gantry()
        .args(["analyze", "--no-probe"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("## tauri-plugin-ios-motion"))
        .stdout(predicate::str::contains("missing dependency: chrono"))
        .stdout(predicate::str::contains(
            "missing mobile implementation: stop",
        ))
        .stdout(predicate::str::contains("- tauri-plugin-ios-camera"))
        .stdout(predicate::str::contains("- tauri-plugin-ios-files"))
        .stdout(predicate::str::contains("1/3 packages with issues"));
}

#[test]
fn test_analyze_clean_workspace() {
    let tmp = temp_dir();
    let plugins = tmp.path().join("plugins");
    write_consistent_plugin(&plugins, "tauri-plugin-ios-camera");

    gantry()
        .args(["analyze", "--no-probe"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0/1 packages with issues"));
}

#[test]
fn test_analyze_fails_without_plugin_root() {
    let tmp = temp_dir();

    gantry()
        .args(["analyze", "--no-probe"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_analyze_fails_when_prefix_matches_nothing() {
    let tmp = temp_dir();
    let plugins = tmp.path().join("plugins");
    write_consistent_plugin(&plugins, "tauri-plugin-ios-camera");

    gantry()
        .args(["analyze", "--no-probe", "--prefix", "tauri-plugin-android-"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no packages matching prefix"));
}

// ============================================================================
// gantry fix
// ============================================================================

#[test]
fn test_fix_adds_missing_dependency_then_stabilizes() {
    let tmp = temp_dir();
    let plugins = tmp.path().join("plugins");
    write_broken_plugin(&plugins, "tauri-plugin-ios-motion");

    gantry()
        .arg("fix")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("added dependency chrono"))
        .stdout(predicate::str::contains("1 of 1 packages updated"));

    let manifest =
        fs::read_to_string(plugins.join("tauri-plugin-ios-motion/Cargo.toml")).unwrap();
    assert!(manifest.contains(r#"chrono = { version = "0.4", features = ["serde"] }"#));

    // second run has nothing left to do
    gantry()
        .arg("fix")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"))
        .stdout(predicate::str::contains("0 of 1 packages updated"));
}

#[test]
fn test_fix_dry_run_leaves_manifest_untouched() {
    let tmp = temp_dir();
    let plugins = tmp.path().join("plugins");
    write_broken_plugin(&plugins, "tauri-plugin-ios-motion");

    gantry()
        .args(["fix", "--dry-run"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("added dependency chrono"))
        .stdout(predicate::str::contains("dry run: no files were written"));

    let manifest =
        fs::read_to_string(plugins.join("tauri-plugin-ios-motion/Cargo.toml")).unwrap();
    assert_eq!(manifest, CLEAN_MANIFEST);
}

#[test]
fn test_fix_regenerate_writes_template_manifest() {
    let tmp = temp_dir();
    let plugins = tmp.path().join("plugins");
    let pkg = plugins.join("tauri-plugin-ios-haptics");
    write(&pkg.join("Cargo.toml"), "[package]\nname = \"stale\"\n");
    write(&pkg.join("src/lib.rs"), "use serde_json::json;\nfn x() { let _ = json!({}); }\n");

    gantry()
        .args(["fix", "--regenerate"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("regenerated manifest"));

    let manifest = fs::read_to_string(pkg.join("Cargo.toml")).unwrap();
    assert!(manifest.contains(r#"name = "tauri-plugin-ios-haptics""#));
    assert!(manifest.contains("Access haptics APIs on iOS for Tauri applications"));
    assert!(manifest.contains(r#"serde_json = "1.0""#));
    assert!(manifest.contains("[build-dependencies]"));
}

#[test]
fn test_fix_repairs_concatenated_manifest_lines() {
    let tmp = temp_dir();
    let plugins = tmp.path().join("plugins");
    let pkg = plugins.join("tauri-plugin-ios-broken");
    write(
        &pkg.join("Cargo.toml"),
        "[package]\nname = \"p\"\nversion = \"0.1.0\"\n\n[dependencies]\nserde = \"1.0\" thiserror = \"2\"\n",
    );
    write(&pkg.join("src/lib.rs"), "");

    gantry()
        .arg("fix")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("repaired corrupted manifest lines"));

    let manifest = fs::read_to_string(pkg.join("Cargo.toml")).unwrap();
    assert!(manifest.contains("serde = \"1.0\"\nthiserror = \"2\""));
}

// ============================================================================
// gantry patch
// ============================================================================

const UNTYPED_SWIFT: &str = r#"import CoreMotion

class MotionService {
    func start() {
        motionManager.startAccelerometerUpdates(to: queue) { [weak self] data, error in
            self?.handle(data, error)
        }
    }
}
"#;

#[test]
fn test_patch_annotates_swift_closures_once() {
    let tmp = temp_dir();
    let swift = tmp
        .path()
        .join("plugins/tauri-plugin-ios-motion/ios/Sources/Motion.swift");
    write(&swift, UNTYPED_SWIFT);

    gantry()
        .arg("patch")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Motion.swift"))
        .stdout(predicate::str::contains("1 file(s) patched"));

    let patched = fs::read_to_string(&swift).unwrap();
    assert!(patched.contains("(data: CMAccelerometerData?, error: Error?) in"));

    // second run is a no-op
    gantry()
        .arg("patch")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 file(s) patched"));
}
