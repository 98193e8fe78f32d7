//! Integration tests for `packup check --json`.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "packup-cli", "--bin", "packup", "--"]);
    cmd
}

#[test]
fn check_reports_a_healthy_package() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/index.ts"), "export {};\n").unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{ "name": "dummy", "type": "module", "exports": "./dist/index.js" }"#,
    )
    .unwrap();

    let output = cargo_bin()
        .args(["check", "--json", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run packup check");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["ok"], true);
    assert_eq!(report["packageType"], "module");
    assert_eq!(report["output"]["outDir"], "dist");
    assert_eq!(report["output"]["module"], true);
    assert_eq!(report["entryPoints"][0]["name"], "index");
    assert_eq!(report["entryPoints"][0]["source"], "src/index.ts");
}

#[test]
fn check_fails_when_a_source_file_is_missing() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{ "name": "dummy", "exports": "./dist/index.js" }"#,
    )
    .unwrap();

    let output = cargo_bin()
        .args(["check", "--json", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run packup check");
    assert!(!output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["ok"], false);
    assert!(
        report["errors"][0]
            .as_str()
            .unwrap()
            .contains("No source file with a supported extension"),
        "unexpected errors: {}",
        report["errors"]
    );
}
