//! The `exports` map: discriminated views and the condition walker.
//!
//! `exports` is a recursive, loosely-typed structure: a bare output path, or
//! a map of subpaths to conditional values, with a plain string standing in
//! for `{ "default": ... }` at any level. The walker flattens it into
//! `(subpath, condition, output path)` visits consumed by both the
//! output-config reconciler and the entry-point resolvers.

use std::fmt;

use serde_json::{Map, Value};

use crate::entrypoints::SOURCE_FILE_EXTENSIONS;
use crate::error::Error;
use crate::manifest::{ModuleFormat, PackageType};
use crate::paths;

/// Export conditions recognized for build planning, in evaluation order.
///
/// Every present condition is visited; they are not mutually exclusive. A
/// subpath carrying both `require` and `default` contributes two artifacts.
pub const SUPPORTED_CONDITIONS: [Condition; 4] = [
    Condition::Require,
    Condition::Import,
    Condition::Module,
    Condition::Default,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Require,
    Import,
    Module,
    Default,
}

impl Condition {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Require => "require",
            Self::Import => "import",
            Self::Module => "module",
            Self::Default => "default",
        }
    }

    /// The module format implied by this condition for `output_path`.
    ///
    /// `default` is ambiguous: the artifact extension decides, falling back
    /// to the package type.
    #[must_use]
    pub fn module_format(self, package_type: PackageType, output_path: &str) -> ModuleFormat {
        match self {
            Self::Require => ModuleFormat::CommonJs,
            Self::Import | Self::Module => ModuleFormat::Module,
            Self::Default => match paths::extension(output_path) {
                Some(".mjs") => ModuleFormat::Module,
                Some(".cjs") => ModuleFormat::CommonJs,
                _ => package_type.into(),
            },
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminated view over a raw top-level `exports` value.
#[derive(Debug)]
pub enum Exports<'a> {
    /// Shorthand for a single `default` artifact at subpath `"."`.
    Path(&'a str),
    /// Fallback arrays are not supported for build planning.
    Array(&'a Vec<Value>),
    /// Subpath → conditional value map.
    Subpaths(&'a Map<String, Value>),
    Invalid(&'a Value),
}

impl<'a> Exports<'a> {
    #[must_use]
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(path) => Self::Path(path),
            Value::Array(values) => Self::Array(values),
            Value::Object(subpaths) => Self::Subpaths(subpaths),
            other => Self::Invalid(other),
        }
    }
}

/// Discriminated view over one conditional value.
#[derive(Debug)]
pub enum ConditionalValue<'a> {
    Path(&'a str),
    Conditions(&'a Map<String, Value>),
    Invalid(&'a Value),
}

impl<'a> ConditionalValue<'a> {
    #[must_use]
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(path) => Self::Path(path),
            Value::Object(conditions) => Self::Conditions(conditions),
            other => Self::Invalid(other),
        }
    }
}

/// Whether a subpath key is excluded from build planning entirely.
///
/// The root export is never skipped. Directory exports (trailing `/`) and
/// subpaths with a non-source extension (`./package.json`, `./styles.css`)
/// are ignored, not traversed.
#[must_use]
pub fn should_skip_subpath(subpath: &str) -> bool {
    if subpath == "." {
        return false;
    }
    if subpath.ends_with('/') {
        return true;
    }
    match paths::extension(subpath) {
        Some(ext) => !SOURCE_FILE_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Walk every concrete `(subpath, condition, output path)` declaration in an
/// `exports` value, in subpath order then condition order.
///
/// `None` (or an explicit `null`, filtered by the manifest accessor) walks
/// nothing. Callers own their accumulators; the walker holds no state.
pub fn walk_exports<F>(exports: Option<&Value>, visit: &mut F) -> Result<(), Error>
where
    F: FnMut(&str, Condition, &str) -> Result<(), Error>,
{
    let Some(exports) = exports else {
        return Ok(());
    };

    match Exports::classify(exports) {
        Exports::Path(path) => emit(".", Condition::Default, path, visit),
        Exports::Array(_) => Err(Error::ExportsArrayUnsupported),
        Exports::Subpaths(subpaths) => {
            for (subpath, value) in subpaths {
                if should_skip_subpath(subpath) {
                    continue;
                }
                match ConditionalValue::classify(value) {
                    ConditionalValue::Path(path) => {
                        emit(subpath, Condition::Default, path, visit)?;
                    }
                    ConditionalValue::Conditions(conditions) => {
                        walk_conditions(subpath, conditions, visit)?;
                    }
                    ConditionalValue::Invalid(_) => {
                        return Err(Error::InvalidConditionalValue {
                            subpath: subpath.clone(),
                        });
                    }
                }
            }
            Ok(())
        }
        Exports::Invalid(_) => Err(Error::InvalidConditionalValue {
            subpath: ".".to_string(),
        }),
    }
}

fn walk_conditions<F>(
    subpath: &str,
    conditions: &Map<String, Value>,
    visit: &mut F,
) -> Result<(), Error>
where
    F: FnMut(&str, Condition, &str) -> Result<(), Error>,
{
    for condition in SUPPORTED_CONDITIONS {
        let Some(value) = conditions.get(condition.as_str()) else {
            continue;
        };
        match ConditionalValue::classify(value) {
            // A null condition is explicitly disabled, not invalid.
            ConditionalValue::Invalid(Value::Null) => {}
            ConditionalValue::Conditions(nested) => walk_conditions(subpath, nested, visit)?,
            ConditionalValue::Path(path) => emit(subpath, condition, path, visit)?,
            ConditionalValue::Invalid(_) => {
                return Err(Error::InvalidCondition {
                    subpath: subpath.to_string(),
                    condition,
                });
            }
        }
    }
    Ok(())
}

fn emit<F>(subpath: &str, condition: Condition, path: &str, visit: &mut F) -> Result<(), Error>
where
    F: FnMut(&str, Condition, &str) -> Result<(), Error>,
{
    if path.is_empty() {
        return Err(Error::InvalidCondition {
            subpath: subpath.to_string(),
            condition,
        });
    }
    visit(subpath, condition, path)
}
