//! `packup plan` command implementation.
//!
//! Resolves the full build plan for the package (probing mode) and prints
//! it, either human-readable or as a single JSON object.

use miette::{IntoDiagnostic, Result};
use packup_core::{resolve_build_plan, BuildPlan, Enforce, PluginSpec};
use std::path::PathBuf;

/// Plan command action.
#[derive(Debug, Clone)]
pub struct PlanAction {
    /// Working directory; the package root is discovered from here.
    pub cwd: PathBuf,
    /// Inject the default source transform plugin.
    pub transform: bool,
}

/// Run the plan command.
pub fn run(action: &PlanAction, json: bool) -> Result<()> {
    let package_dir = packup_core::paths::package_root(&action.cwd)
        .unwrap_or_else(|| action.cwd.clone());
    tracing::debug!("resolving build plan for {}", package_dir.display());

    let transform = action.transform.then(PluginSpec::swc_transform);

    let rt = tokio::runtime::Runtime::new().into_diagnostic()?;
    let plan = rt
        .block_on(resolve_build_plan(&package_dir, transform))
        .into_diagnostic()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan).into_diagnostic()?);
    } else {
        print_human(&plan);
    }

    Ok(())
}

fn print_human(plan: &BuildPlan) {
    println!("\x1b[1m## Package\x1b[0m");
    println!("  Root:           {}", plan.root.display());
    println!("  Output dir:     {}", plan.out_dir);
    let formats: Vec<String> = plan.formats.iter().map(ToString::to_string).collect();
    println!("  Formats:        {}", formats.join(", "));
    println!("  Sourcemap:      {}", plan.sourcemap);
    println!();

    println!("\x1b[1m## Entry points\x1b[0m");
    for (name, source) in &plan.entries {
        println!("  {name:<15} {source}");
    }
    println!();

    println!("\x1b[1m## Plugins\x1b[0m");
    if plan.plugins.is_empty() {
        println!("  (none)");
    }
    for plugin in &plan.plugins {
        let enforce = match plugin.enforce {
            Some(Enforce::Pre) => " (pre)",
            Some(Enforce::Post) => " (post)",
            None => "",
        };
        println!("  {}{enforce}", plugin.name);
    }
}
