//! Legacy top-level fields: `main`, `module`, `bin`.
//!
//! Each field has a pure getter invoked in a fixed order; absent fields
//! contribute nothing, malformed fields fail fast with a field-specific
//! error.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::Error;
use crate::manifest::{ModuleFormat, PackageJson, PackageType};
use crate::paths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageField {
    Main,
    Module,
    Bin,
}

impl PackageField {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Module => "module",
            Self::Bin => "bin",
        }
    }
}

impl fmt::Display for PackageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An output path tagged with its inferred module format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPath {
    pub format: ModuleFormat,
    pub path: String,
}

/// The normalized value of one legacy field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// `main` / `module`: one tagged path per export subpath (always `"."`).
    Subpaths(BTreeMap<String, FormatPath>),
    /// `bin`: one format for the whole field, one path per command name.
    Commands {
        format: ModuleFormat,
        paths: BTreeMap<String, String>,
    },
}

/// A normalized legacy-field declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub field: PackageField,
    pub value: FieldValue,
}

impl FieldEntry {
    /// Every `(format, output path)` pair this entry declares.
    pub(crate) fn format_paths(&self) -> Vec<(ModuleFormat, &str)> {
        match &self.value {
            FieldValue::Subpaths(subpaths) => subpaths
                .values()
                .map(|entry| (entry.format, entry.path.as_str()))
                .collect(),
            FieldValue::Commands { format, paths } => paths
                .values()
                .map(|path| (*format, path.as_str()))
                .collect(),
        }
    }
}

/// Normalized entries for the legacy fields present on a manifest, in the
/// fixed extraction order (`main`, `module`, `bin`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldEntries(Vec<FieldEntry>);

impl FieldEntries {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldEntry> {
        self.0.iter()
    }

    #[must_use]
    pub fn get(&self, field: PackageField) -> Option<&FieldEntry> {
        self.0.iter().find(|entry| entry.field == field)
    }
}

impl<'a> IntoIterator for &'a FieldEntries {
    type Item = &'a FieldEntry;
    type IntoIter = std::slice::Iter<'a, FieldEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

type FieldGetter = fn(PackageType, &PackageJson) -> Result<Option<FieldEntry>, Error>;

const FIELD_GETTERS: [FieldGetter; 3] = [main_entry, module_entry, bin_entry];

/// Extract all supported legacy fields from the manifest.
pub fn package_field_entries(
    package_type: PackageType,
    pkg: &PackageJson,
) -> Result<FieldEntries, Error> {
    let mut entries = Vec::new();
    for getter in FIELD_GETTERS {
        if let Some(entry) = getter(package_type, pkg)? {
            entries.push(entry);
        }
    }
    Ok(FieldEntries(entries))
}

fn string_path<'a>(pkg: &'a PackageJson, field: PackageField) -> Result<Option<&'a str>, Error> {
    match pkg.field(field.as_str()) {
        None => Ok(None),
        Some(Value::String(path)) if !path.is_empty() => Ok(Some(path)),
        Some(_) => Err(Error::InvalidFieldPath { field }),
    }
}

fn single_subpath(format: ModuleFormat, path: &str) -> FieldValue {
    FieldValue::Subpaths(BTreeMap::from([(
        ".".to_string(),
        FormatPath {
            format,
            path: path.to_string(),
        },
    )]))
}

fn main_entry(package_type: PackageType, pkg: &PackageJson) -> Result<Option<FieldEntry>, Error> {
    let Some(path) = string_path(pkg, PackageField::Main)? else {
        return Ok(None);
    };

    // A `.cjs` main stays CommonJS even under `"type": "module"`.
    let format = if package_type != PackageType::CommonJs && paths::extension(path) == Some(".cjs")
    {
        ModuleFormat::CommonJs
    } else {
        package_type.into()
    };

    Ok(Some(FieldEntry {
        field: PackageField::Main,
        value: single_subpath(format, path),
    }))
}

fn module_entry(_package_type: PackageType, pkg: &PackageJson) -> Result<Option<FieldEntry>, Error> {
    let Some(path) = string_path(pkg, PackageField::Module)? else {
        return Ok(None);
    };

    Ok(Some(FieldEntry {
        field: PackageField::Module,
        value: single_subpath(ModuleFormat::Module, path),
    }))
}

fn bin_entry(package_type: PackageType, pkg: &PackageJson) -> Result<Option<FieldEntry>, Error> {
    let Some(value) = pkg.field("bin") else {
        return Ok(None);
    };

    let paths = match value {
        Value::String(path) if path.is_empty() => return Err(Error::EmptyBinField),
        Value::String(path) => {
            let name = pkg.name().ok_or(Error::BinWithoutName)?;
            BTreeMap::from([(name.to_string(), path.clone())])
        }
        Value::Object(commands) => {
            let mut paths = BTreeMap::new();
            for (command, path) in commands {
                match path {
                    Value::String(path) if !command.is_empty() && !path.is_empty() => {
                        paths.insert(command.clone(), path.clone());
                    }
                    _ => return Err(Error::InvalidBinField),
                }
            }
            paths
        }
        _ => return Err(Error::InvalidBinField),
    };

    Ok(Some(FieldEntry {
        field: PackageField::Bin,
        value: FieldValue::Commands {
            format: package_type.into(),
            paths,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn manifest(value: Value) -> PackageJson {
        PackageJson::from_value(PathBuf::from("package.json"), value).unwrap()
    }

    #[test]
    fn test_absent_fields_contribute_nothing() {
        let pkg = manifest(json!({ "name": "dummy" }));
        let entries = package_field_entries(PackageType::CommonJs, &pkg).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_main_takes_the_package_type() {
        let pkg = manifest(json!({ "name": "dummy", "main": "./dist/index.js" }));
        let entries = package_field_entries(PackageType::CommonJs, &pkg).unwrap();
        let entry = entries.get(PackageField::Main).unwrap();
        assert_eq!(
            entry.value,
            single_subpath(ModuleFormat::CommonJs, "./dist/index.js")
        );
    }

    #[test]
    fn test_cjs_main_forces_commonjs_under_a_module_package() {
        let pkg = manifest(json!({ "name": "dummy", "main": "./dist/index.cjs" }));
        let entries = package_field_entries(PackageType::Module, &pkg).unwrap();
        let entry = entries.get(PackageField::Main).unwrap();
        assert_eq!(
            entry.value,
            single_subpath(ModuleFormat::CommonJs, "./dist/index.cjs")
        );
    }

    #[test]
    fn test_module_is_always_esm() {
        let pkg = manifest(json!({ "name": "dummy", "module": "./dist/index.js" }));
        let entries = package_field_entries(PackageType::CommonJs, &pkg).unwrap();
        let entry = entries.get(PackageField::Module).unwrap();
        assert_eq!(
            entry.value,
            single_subpath(ModuleFormat::Module, "./dist/index.js")
        );
    }

    #[test]
    fn test_empty_main_fails() {
        let pkg = manifest(json!({ "name": "dummy", "main": "" }));
        let err = package_field_entries(PackageType::CommonJs, &pkg).unwrap_err();
        assert_eq!(
            err.to_string(),
            "package.json['main'] must be a non-empty string path"
        );
    }

    #[test]
    fn test_non_string_module_fails() {
        let pkg = manifest(json!({ "name": "dummy", "module": ["./dist/index.js"] }));
        let err = package_field_entries(PackageType::CommonJs, &pkg).unwrap_err();
        assert_eq!(
            err.to_string(),
            "package.json['module'] must be a non-empty string path"
        );
    }

    #[test]
    fn test_string_bin_is_keyed_by_the_package_name() {
        let pkg = manifest(json!({ "name": "dummy", "bin": "./dist/cli.js" }));
        let entries = package_field_entries(PackageType::CommonJs, &pkg).unwrap();
        let entry = entries.get(PackageField::Bin).unwrap();
        assert_eq!(
            entry.value,
            FieldValue::Commands {
                format: ModuleFormat::CommonJs,
                paths: BTreeMap::from([("dummy".to_string(), "./dist/cli.js".to_string())]),
            }
        );
    }

    #[test]
    fn test_bin_takes_the_package_type() {
        let pkg = manifest(json!({
            "name": "dummy",
            "type": "module",
            "bin": { "cli": "./dist/cli.js" },
        }));
        let entries = package_field_entries(PackageType::Module, &pkg).unwrap();
        let entry = entries.get(PackageField::Bin).unwrap();
        assert_eq!(
            entry.value,
            FieldValue::Commands {
                format: ModuleFormat::Module,
                paths: BTreeMap::from([("cli".to_string(), "./dist/cli.js".to_string())]),
            }
        );
    }

    #[test]
    fn test_empty_bin_string_fails() {
        let pkg = manifest(json!({ "name": "dummy", "bin": "" }));
        let err = package_field_entries(PackageType::CommonJs, &pkg).unwrap_err();
        assert_eq!(err.to_string(), "package.json['bin'] cannot be empty");
    }

    #[test]
    fn test_bin_map_with_empty_key_or_value_fails() {
        for bin in [json!({ "": "./dist/cli.js" }), json!({ "cli": "" })] {
            let pkg = manifest(json!({ "name": "dummy", "bin": bin }));
            let err = package_field_entries(PackageType::CommonJs, &pkg).unwrap_err();
            assert_eq!(err.to_string(), "package.json['bin'] is invalid");
        }
    }

    #[test]
    fn test_string_bin_without_a_package_name_fails() {
        let pkg = manifest(json!({ "bin": "./dist/cli.js" }));
        let err = package_field_entries(PackageType::CommonJs, &pkg).unwrap_err();
        assert_eq!(
            err.to_string(),
            "package.json['bin'] requires a package name when set to a string path"
        );
    }

    #[test]
    fn test_extraction_order_is_main_module_bin() {
        let pkg = manifest(json!({
            "name": "dummy",
            "bin": { "dummy": "./dist/cli.js" },
            "module": "./dist/index.mjs",
            "main": "./dist/index.cjs",
        }));
        let entries = package_field_entries(PackageType::CommonJs, &pkg).unwrap();
        let order: Vec<PackageField> = entries.iter().map(|entry| entry.field).collect();
        assert_eq!(
            order,
            vec![PackageField::Main, PackageField::Module, PackageField::Bin]
        );
    }
}
