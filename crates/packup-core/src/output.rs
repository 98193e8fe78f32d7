//! Output directory and format reconciliation.
//!
//! Every declared artifact carries a directory and a module format. The
//! reconciler folds them into one output directory (narrowing by common
//! prefix) and one non-empty format set, failing on irreconcilable
//! declarations.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Declaration, Error};
use crate::exports::walk_exports;
use crate::fields::FieldEntries;
use crate::manifest::{ModuleFormat, PackageType};
use crate::paths;

/// The reconciled output configuration: one directory, at least one format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    /// Output directory, relative to the package root. Never empty.
    pub out_dir: String,
    pub commonjs: bool,
    pub module: bool,
}

#[derive(Debug, Default)]
struct OutputConfigBuilder {
    out_dir: Option<String>,
    commonjs: bool,
    module: bool,
}

impl OutputConfigBuilder {
    /// Fold one declared artifact into the config. Directories narrow by
    /// common prefix; format flags are monotonic and never cleared.
    fn record(
        &mut self,
        declaration: &Declaration,
        format: ModuleFormat,
        output_path: &str,
    ) -> Result<(), Error> {
        let dir = parent_dir(output_path);
        let refined = match self.out_dir.as_deref() {
            Some(previous) if previous != dir => common_prefix(previous, &dir),
            _ => dir,
        };

        if refined.is_empty() {
            return Err(match self.out_dir.take() {
                Some(previous) => Error::ConflictingOutputDir {
                    declaration: declaration.clone(),
                    previous,
                },
                None => Error::MissingOutputDir {
                    declaration: declaration.clone(),
                },
            });
        }

        self.out_dir = Some(refined);
        match format {
            ModuleFormat::CommonJs => self.commonjs = true,
            ModuleFormat::Module => self.module = true,
        }
        Ok(())
    }

    fn finish(self) -> Result<OutputConfig, Error> {
        let Some(out_dir) = self.out_dir else {
            return Err(Error::UndeterminedOutputDir);
        };
        if !self.commonjs && !self.module {
            return Err(Error::UndeterminedOutputFormat);
        }
        Ok(OutputConfig {
            out_dir,
            commonjs: self.commonjs,
            module: self.module,
        })
    }
}

/// The containing directory of a declared output path, after normalization.
fn parent_dir(output_path: &str) -> String {
    let normalized = paths::normalize(output_path);
    match normalized.rfind('/') {
        Some(index) => normalized[..index].to_string(),
        None => String::new(),
    }
}

// Longest common leading prefix, character-wise rather than segment-wise:
// "dist/esm" against "dist/cjs" narrows to "dist/", not "dist".
fn common_prefix(a: &str, b: &str) -> String {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect()
}

/// Derive the output directory and format set from `exports` and the legacy
/// field entries.
///
/// Exports are folded first and fields after, but prefix narrowing makes the
/// result independent of processing order.
pub fn derive_output_config(
    exports: Option<&Value>,
    package_type: PackageType,
    fields: &FieldEntries,
) -> Result<OutputConfig, Error> {
    let mut builder = OutputConfigBuilder::default();

    walk_exports(exports, &mut |subpath, condition, output_path| {
        let declaration = Declaration::Export(subpath.to_string());
        let format = condition.module_format(package_type, output_path);
        builder.record(&declaration, format, output_path)
    })?;

    for entry in fields {
        let declaration = Declaration::Field(entry.field);
        for (format, output_path) in entry.format_paths() {
            builder.record(&declaration, format, output_path)?;
        }
    }

    builder.finish()
}
