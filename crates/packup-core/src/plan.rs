//! Build-plan assembly: the boundary shape handed to the bundler.
//!
//! The assembler combines the derived output config and entry points into a
//! configuration object the external bundler consumes directly, then
//! deep-merges an optional caller-supplied override config on top. Loading
//! the override is the only async I/O in the crate.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::entrypoints::{resolve_entrypoints, EntryPoints};
use crate::error::Error;
use crate::fields::package_field_entries;
use crate::manifest::read_package_json;
use crate::output::{derive_output_config, OutputConfig};

/// Name of the default source transform plugin.
pub const TRANSFORM_PLUGIN_NAME: &str = "swc-transform";

/// File name of the optional caller-supplied override config.
pub const OVERRIDE_CONFIG_FILE: &str = "packup.config.json";

/// Bundler target formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Cjs,
    Es,
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cjs => f.write_str("cjs"),
            Self::Es => f.write_str("es"),
        }
    }
}

/// Plugin precedence marker, mirroring the bundler's enforce slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Enforce {
    Pre,
    Post,
}

/// A plugin reference in the build plan. Options beyond name and precedence
/// are plugin-specific and pass through untyped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce: Option<Enforce>,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl PluginSpec {
    /// The default source transform: swc targeting the baseline ES level.
    #[must_use]
    pub fn swc_transform() -> Self {
        let mut options = Map::new();
        options.insert(
            "swcOptions".to_string(),
            json!({ "jsc": { "target": "es2021" } }),
        );
        Self {
            name: TRANSFORM_PLUGIN_NAME.to_string(),
            enforce: Some(Enforce::Pre),
            options,
        }
    }
}

/// The bundler-facing build plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    /// Package root directory.
    pub root: PathBuf,
    /// Output directory, relative to the root.
    pub out_dir: String,
    /// Formats to emit, CommonJS first.
    pub formats: Vec<TargetFormat>,
    /// Entry name → source path.
    pub entries: BTreeMap<String, String>,
    pub sourcemap: bool,
    pub minify: bool,
    pub report_compressed_size: bool,
    /// Per-module output file structure is preserved; no chunk merging.
    pub preserve_modules: bool,
    pub plugins: Vec<PluginSpec>,
    /// Untyped settings picked up from an override config.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Whether a module specifier refers outside the package and must not be
/// bundled. Everything except relative and absolute paths is external.
#[must_use]
pub fn is_external_module(specifier: &str) -> bool {
    !(specifier.starts_with('.') || Path::new(specifier).is_absolute())
}

/// Assemble the base build plan from derived configuration. Pure.
///
/// `entrypoints` is a probing-mode map (source path → name) and is inverted
/// here into the bundler's name → source entry spec. The transform plugin is
/// injected only when the capability is supplied; an unavailable transform
/// is a normal branch, not an error.
#[must_use]
pub fn base_build_plan(
    output_config: &OutputConfig,
    entrypoints: &EntryPoints,
    package_dir: &Path,
    transform: Option<PluginSpec>,
) -> BuildPlan {
    let mut formats = Vec::new();
    if output_config.commonjs {
        formats.push(TargetFormat::Cjs);
    }
    if output_config.module {
        formats.push(TargetFormat::Es);
    }

    let entries = entrypoints
        .iter()
        .map(|(source, name)| (name.to_string(), source.to_string()))
        .collect();

    BuildPlan {
        root: package_dir.to_path_buf(),
        out_dir: output_config.out_dir.clone(),
        formats,
        entries,
        sourcemap: true,
        minify: false,
        report_compressed_size: false,
        preserve_modules: true,
        plugins: transform.into_iter().collect(),
        extra: Map::new(),
    }
}

/// Load the optional override config next to the manifest. A missing file is
/// not an error.
pub async fn load_override_config(package_dir: &Path) -> Result<Option<Value>, Error> {
    let path = package_dir.join(OVERRIDE_CONFIG_FILE);

    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(Error::OverrideConfigRead { path, source }),
    };

    let value =
        serde_json::from_str(&text).map_err(|source| Error::OverrideConfigParse { path, source })?;
    Ok(Some(value))
}

/// Deep-merge an override config on top of the plan.
///
/// Objects merge recursively, arrays concatenate, scalars from the override
/// win. When the override carries its own transform plugin (same name with
/// `pre` enforcement) or pins an explicitly empty plugin list, the default
/// transform plugin is dropped first so it is replaced, not duplicated.
pub fn apply_override(mut plan: BuildPlan, override_config: &Value) -> Result<BuildPlan, Error> {
    if let Some(plugins) = override_config.get("plugins").and_then(Value::as_array) {
        if plugins.is_empty() || plugins.iter().any(replaces_transform) {
            plan.plugins.retain(|plugin| plugin.name != TRANSFORM_PLUGIN_NAME);
        }
    }

    let mut base = serde_json::to_value(&plan).map_err(Error::PlanSerialize)?;
    merge_values(&mut base, override_config);
    serde_json::from_value(base).map_err(Error::PlanSerialize)
}

fn replaces_transform(plugin: &Value) -> bool {
    plugin.get("name").and_then(Value::as_str) == Some(TRANSFORM_PLUGIN_NAME)
        && plugin.get("enforce").and_then(Value::as_str) == Some("pre")
}

fn merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (Value::Array(base), Value::Array(overlay)) => {
            base.extend(overlay.iter().cloned());
        }
        (slot, value) => *slot = value.clone(),
    }
}

/// Derive the full build plan for the package at `package_dir`: manifest →
/// package type + field entries → output config → entry points (probing
/// mode) → base plan, with any override config merged on top.
pub async fn resolve_build_plan(
    package_dir: &Path,
    transform: Option<PluginSpec>,
) -> Result<BuildPlan, Error> {
    let pkg = read_package_json(package_dir)?;
    let package_type = pkg.package_type()?;
    let fields = package_field_entries(package_type, &pkg)?;

    let output_config = derive_output_config(pkg.exports(), package_type, &fields)?;
    let entrypoints =
        resolve_entrypoints(package_dir, &output_config.out_dir, pkg.exports(), &fields)?;

    let plan = base_build_plan(&output_config, &entrypoints, package_dir, transform);

    match load_override_config(package_dir).await? {
        Some(override_config) => apply_override(plan, &override_config),
        None => Ok(plan),
    }
}
