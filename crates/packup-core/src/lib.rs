#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

//! Build-plan inference for JavaScript packages.
//!
//! packup derives everything a bundler needs — module formats, the output
//! directory, and the entry-point map — from the declarative fields of a
//! package.json manifest (`exports`, `main`, `module`, `bin`, `type`),
//! without hand-written bundler configuration.
//!
//! The derivation pipeline is strictly forward: manifest → package type +
//! field entries → output config → entry points → build plan. Every step is
//! a pure synchronous function over the manifest; only entry-point probing
//! checks the filesystem, and only override-config loading in the plan
//! assembler does async I/O. Derivations share no state: each call builds
//! its own accumulators and returns an immutable result.

pub mod entrypoints;
pub mod error;
pub mod exports;
pub mod fields;
pub mod manifest;
pub mod output;
pub mod paths;
pub mod plan;
pub mod version;

pub use entrypoints::{
    derive_entrypoints, find_source_file, resolve_entrypoints, EntryPoints,
    SOURCE_DIRECTORIES, SOURCE_FILE_EXTENSIONS,
};
pub use error::{Declaration, Error};
pub use exports::{walk_exports, Condition, ConditionalValue, Exports, SUPPORTED_CONDITIONS};
pub use fields::{package_field_entries, FieldEntries, FieldEntry, FieldValue, PackageField};
pub use manifest::{read_package_json, ModuleFormat, PackageJson, PackageType};
pub use output::{derive_output_config, OutputConfig};
pub use plan::{
    apply_override, base_build_plan, is_external_module, load_override_config,
    resolve_build_plan, BuildPlan, Enforce, PluginSpec, TargetFormat, OVERRIDE_CONFIG_FILE,
    TRANSFORM_PLUGIN_NAME,
};
pub use version::VERSION;
