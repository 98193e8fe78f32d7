//! `packup check` command implementation.
//!
//! Derivation health check: resolves the package type, output config and
//! entry points, and reports whether every entry maps to a real source file.

use miette::{IntoDiagnostic, Result};
use packup_core::{
    derive_output_config, package_field_entries, read_package_json, resolve_entrypoints,
    Error, OutputConfig,
};
use serde::Serialize;
use std::path::Path;

/// Check report for JSON output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReportJson {
    ok: bool,
    root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    package_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<OutputConfig>,
    entry_points: Vec<EntryPointJson>,
    errors: Vec<String>,
}

#[derive(Serialize)]
struct EntryPointJson {
    name: String,
    source: String,
}

fn collect(package_dir: &Path) -> CheckReportJson {
    let mut report = CheckReportJson {
        ok: false,
        root: package_dir.display().to_string(),
        package_type: None,
        output: None,
        entry_points: Vec::new(),
        errors: Vec::new(),
    };

    match derive(package_dir, &mut report) {
        Ok(()) => report.ok = true,
        Err(err) => report.errors.push(err.to_string()),
    }

    report
}

/// The derivation pipeline, recording intermediate results as it goes so a
/// failed report still shows how far it got.
fn derive(package_dir: &Path, report: &mut CheckReportJson) -> Result<(), Error> {
    let pkg = read_package_json(package_dir)?;
    let package_type = pkg.package_type()?;
    report.package_type = Some(package_type.to_string());

    let fields = package_field_entries(package_type, &pkg)?;
    let output = derive_output_config(pkg.exports(), package_type, &fields)?;
    report.output = Some(output.clone());

    let entrypoints =
        resolve_entrypoints(package_dir, &output.out_dir, pkg.exports(), &fields)?;
    report.entry_points = entrypoints
        .iter()
        .map(|(source, name)| EntryPointJson {
            name: name.to_string(),
            source: source.to_string(),
        })
        .collect();

    Ok(())
}

/// Run the check command.
///
/// When `json` is true, outputs a single JSON object to stdout. Otherwise,
/// outputs human-readable formatted text. Exits non-zero when the derivation
/// fails.
pub fn run(cwd: &Path, json: bool) -> Result<()> {
    let package_dir =
        packup_core::paths::package_root(cwd).unwrap_or_else(|| cwd.to_path_buf());

    let report = collect(&package_dir);

    if json {
        println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
    } else {
        print_human(&report);
    }

    if !report.ok {
        std::process::exit(1);
    }

    Ok(())
}

fn print_human(report: &CheckReportJson) {
    println!("\x1b[1m## Package\x1b[0m");
    println!("  Root:           {}", report.root);
    if let Some(package_type) = &report.package_type {
        println!("  Type:           {package_type}");
    }
    println!();

    if let Some(output) = &report.output {
        println!("\x1b[1m## Output\x1b[0m");
        println!("  Directory:      {}", output.out_dir);
        println!("  CommonJS:       {}", output.commonjs);
        println!("  ESM:            {}", output.module);
        println!();
    }

    if !report.entry_points.is_empty() {
        println!("\x1b[1m## Entry points\x1b[0m");
        for entry in &report.entry_points {
            println!("  {:<15} {}", entry.name, entry.source);
        }
        println!();
    }

    for error in &report.errors {
        println!("\x1b[31merror\x1b[0m: {error}");
    }

    if report.ok {
        println!("All entry points resolve to source files.");
    }
}
