//! Error type for build-plan derivation.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::entrypoints::SOURCE_FILE_EXTENSIONS;
use crate::exports::Condition;
use crate::fields::PackageField;

/// Where a declared output path came from: an `exports` subpath or a legacy
/// top-level field. Carried in errors so conflicts stay attributable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Export(String),
    Field(PackageField),
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Export(subpath) => write!(f, "Package export \"{subpath}\""),
            Self::Field(field) => write!(f, "Package field \"{field}\""),
        }
    }
}

/// Core error type for packup derivations.
///
/// Every failure is immediate and terminal for the current derivation; there
/// is no partial or degraded output. The core never logs and never exits a
/// process — presentation belongs to the caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read package.json at {path}")]
    PackageJsonRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read package.json at {path}")]
    PackageJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("package.json must be a JSON object")]
    ManifestNotAnObject,

    #[error("package.json['type'] must be \"commonjs\" or \"module\"")]
    InvalidPackageType,

    #[error("package.json['{field}'] must be a non-empty string path")]
    InvalidFieldPath { field: PackageField },

    #[error("package.json['bin'] cannot be empty")]
    EmptyBinField,

    #[error("package.json['bin'] requires a package name when set to a string path")]
    BinWithoutName,

    #[error("package.json['bin'] is invalid")]
    InvalidBinField,

    #[error("Package exports of type array are not supported")]
    ExportsArrayUnsupported,

    #[error("Package export \"{subpath}\" does not include a valid conditional value")]
    InvalidConditionalValue { subpath: String },

    #[error("Package export \"{subpath}\" does not include a valid \"{condition}\" conditional value")]
    InvalidCondition {
        subpath: String,
        condition: Condition,
    },

    #[error("{declaration} exhibits an output path without an output directory")]
    MissingOutputDir { declaration: Declaration },

    #[error(
        "{declaration} exhibits a different, incompatible output directory \
         than previously derived output directory (\"{previous}\")"
    )]
    ConflictingOutputDir {
        declaration: Declaration,
        previous: String,
    },

    #[error("Unable to determine output directory from package.json exports.")]
    UndeterminedOutputDir,

    #[error("Unable to determine output format(s) from package.json exports.")]
    UndeterminedOutputFormat,

    #[error("{declaration} has a conflicting entry point name (\"{name}\") with another entry point")]
    ConflictingEntryPoint {
        declaration: Declaration,
        name: String,
    },

    #[error("Unable to determine entry points")]
    NoEntryPoints,

    #[error(
        "No source file with a supported extension ({}) found for source entry point \"{candidate}\"",
        SOURCE_FILE_EXTENSIONS.join(", ")
    )]
    NoSourceFile { candidate: String },

    #[error("Failed to read override config at {path}")]
    OverrideConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse override config at {path}")]
    OverrideConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize build plan")]
    PlanSerialize(#[source] serde_json::Error),
}
