//! Integration tests for `packup plan --json`.
//!
//! These tests create fixture packages on disk and assert on the single
//! JSON object the command prints to stdout.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "packup-cli", "--bin", "packup", "--"]);
    cmd
}

fn fixture(manifest: &str, sources: &[&str]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(dir.path().join("package.json"), manifest).expect("Failed to write manifest");
    for source in sources {
        let path = dir.path().join(source);
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create source dir");
        fs::write(path, "export {};\n").expect("Failed to write source");
    }
    dir
}

fn plan_json(dir: &TempDir) -> serde_json::Value {
    let output = cargo_bin()
        .args(["plan", "--json", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run packup plan");
    assert!(
        output.status.success(),
        "plan failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not a single JSON object")
}

#[test]
fn plan_derives_a_dual_package() {
    let dir = fixture(
        r#"{
            "name": "dummy",
            "type": "module",
            "exports": {
                ".": {
                    "require": "./dist/index.cjs",
                    "default": "./dist/index.js"
                }
            }
        }"#,
        &["src/index.ts"],
    );

    let plan = plan_json(&dir);
    assert_eq!(plan["outDir"], "dist");
    assert_eq!(plan["formats"], serde_json::json!(["cjs", "es"]));
    assert_eq!(plan["entries"]["index"], "src/index.ts");
    assert_eq!(plan["sourcemap"], true);
    assert_eq!(plan["minify"], false);
    assert_eq!(plan["preserveModules"], true);
    assert_eq!(plan["plugins"][0]["name"], "swc-transform");
    assert_eq!(plan["plugins"][0]["enforce"], "pre");
}

#[test]
fn plan_derives_esm_package_from_legacy_fields() {
    let dir = fixture(
        r#"{
            "name": "dummy",
            "type": "module",
            "module": "./dist/index.js",
            "bin": { "cli": "./dist/cli.js" }
        }"#,
        &["src/index.ts", "src/cli.ts"],
    );

    let plan = plan_json(&dir);
    assert_eq!(plan["outDir"], "dist");
    assert_eq!(plan["formats"], serde_json::json!(["es"]));
    assert_eq!(plan["entries"]["index"], "src/index.ts");
    assert_eq!(plan["entries"]["cli"], "src/cli.ts");
}

#[test]
fn plan_respects_no_transform() {
    let dir = fixture(
        r#"{ "name": "dummy", "exports": "./dist/index.js" }"#,
        &["src/index.ts"],
    );

    let output = cargo_bin()
        .args(["plan", "--json", "--no-transform", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run packup plan");
    assert!(output.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["plugins"], serde_json::json!([]));
}

#[test]
fn plan_merges_an_override_config() {
    let dir = fixture(
        r#"{ "name": "dummy", "exports": "./dist/index.js" }"#,
        &["src/index.ts"],
    );
    fs::write(
        dir.path().join("packup.config.json"),
        r#"{ "sourcemap": false, "logLevel": "silent" }"#,
    )
    .unwrap();

    let plan = plan_json(&dir);
    assert_eq!(plan["sourcemap"], false);
    assert_eq!(plan["logLevel"], "silent");
}

#[test]
fn plan_fails_without_a_manifest() {
    let dir = TempDir::new().unwrap();
    let output = cargo_bin()
        .args(["plan", "--json", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run packup plan");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to read package.json"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn plan_fails_on_conflicting_output_directories() {
    let dir = fixture(
        r#"{
            "name": "dummy",
            "exports": {
                ".": { "default": "./dist/index.js" },
                "./foo": { "default": "./build/foo.js" }
            }
        }"#,
        &["src/index.ts", "src/foo.ts"],
    );

    let output = cargo_bin()
        .args(["plan", "--json", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run packup plan");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("incompatible output directory"),
        "unexpected stderr: {stderr}"
    );
}
