//! package.json loading and the package-level module system.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::Error;

/// The declared module system of a package (its `type` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageType {
    CommonJs,
    Module,
}

impl PackageType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommonJs => "commonjs",
            Self::Module => "module",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The module format of a single output artifact.
///
/// Distinct from [`PackageType`]: a `"module"`-typed package can still
/// declare CommonJS artifacts (a `require` condition, a `.cjs` main).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleFormat {
    CommonJs,
    Module,
}

impl From<PackageType> for ModuleFormat {
    fn from(package_type: PackageType) -> Self {
        match package_type {
            PackageType::CommonJs => Self::CommonJs,
            PackageType::Module => Self::Module,
        }
    }
}

/// A parsed package.json manifest.
///
/// Read once per derivation and treated as immutable input; every derivation
/// function borrows it.
#[derive(Debug, Clone)]
pub struct PackageJson {
    path: PathBuf,
    fields: Map<String, Value>,
}

impl PackageJson {
    /// Wrap an already-parsed manifest value. The document must be a JSON
    /// object.
    pub fn from_value(path: PathBuf, value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(fields) => Ok(Self { path, fields }),
            _ => Err(Error::ManifestNotAnObject),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The package name. Used as the implicit command name for a string
    /// `bin` field.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    /// The raw `exports` value. An explicit `null` counts as absent.
    #[must_use]
    pub fn exports(&self) -> Option<&Value> {
        self.fields.get("exports").filter(|value| !value.is_null())
    }

    pub(crate) fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Resolve the declared package type.
    ///
    /// An absent `type` field means CommonJS. A present field must be exactly
    /// `"commonjs"` or `"module"`; anything else is rejected.
    pub fn package_type(&self) -> Result<PackageType, Error> {
        match self.fields.get("type") {
            None => Ok(PackageType::CommonJs),
            Some(Value::String(value)) if value == "commonjs" => Ok(PackageType::CommonJs),
            Some(Value::String(value)) if value == "module" => Ok(PackageType::Module),
            Some(_) => Err(Error::InvalidPackageType),
        }
    }
}

/// Read and parse `<package_dir>/package.json`.
///
/// Missing and unparsable files both surface as the distinct
/// "Failed to read package.json" error class so callers can recognize them.
pub fn read_package_json(package_dir: &Path) -> Result<PackageJson, Error> {
    let path = package_dir.join("package.json");

    let text = fs::read_to_string(&path).map_err(|source| Error::PackageJsonRead {
        path: path.clone(),
        source,
    })?;

    let fields: Map<String, Value> =
        serde_json::from_str(&text).map_err(|source| Error::PackageJsonParse {
            path: path.clone(),
            source,
        })?;

    Ok(PackageJson { path, fields })
}
