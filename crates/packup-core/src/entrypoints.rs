//! Entry-point resolution: declared output artifacts back to source files.
//!
//! Each accepted output path yields a candidate (its path relative to the
//! output directory, extension stripped) and a logical name (candidate with
//! a trailing `/index` collapsed). Direct mode maps names onto `./src`
//! without touching the filesystem; probing mode locates the actual source
//! file by trying a fixed extension × directory grid.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::error::{Declaration, Error};
use crate::exports::walk_exports;
use crate::fields::FieldEntries;
use crate::paths;

/// Source extensions probed for an entry point, in priority order.
pub const SOURCE_FILE_EXTENSIONS: [&str; 4] = [".ts", ".tsx", ".jsx", ".js"];

/// Source directories probed for an entry point, in priority order. The
/// empty string is the package root (flat layouts).
pub const SOURCE_DIRECTORIES: [&str; 2] = ["src", ""];

/// Derived entry points.
///
/// Direct mode ([`derive_entrypoints`]) maps logical name → extension-less
/// `./src` path. Probing mode ([`resolve_entrypoints`]) maps matched
/// relative source path → logical name; the build-plan assembler inverts it
/// into the bundler's name → source entry spec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPoints(BTreeMap<String, String>);

impl EntryPoints {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl FromIterator<(String, String)> for EntryPoints {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for EntryPoints {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[derive(Debug, Default)]
struct EntryPointsBuilder {
    by_name: BTreeMap<String, String>,
}

impl EntryPointsBuilder {
    /// Identical re-derivation of a name is tolerated; a different value for
    /// an already-assigned name is a conflict.
    fn insert(
        &mut self,
        declaration: &Declaration,
        name: String,
        value: String,
    ) -> Result<(), Error> {
        match self.by_name.get(&name) {
            Some(existing) if *existing != value => Err(Error::ConflictingEntryPoint {
                declaration: declaration.clone(),
                name,
            }),
            Some(_) => Ok(()),
            None => {
                self.by_name.insert(name, value);
                Ok(())
            }
        }
    }

    fn finish(self) -> Result<BTreeMap<String, String>, Error> {
        if self.by_name.is_empty() {
            return Err(Error::NoEntryPoints);
        }
        Ok(self.by_name)
    }
}

/// The relative, extension-less path of one artifact under `out_dir`.
fn candidate_path(out_dir: &str, output_path: &str) -> String {
    let normalized = paths::normalize(output_path);
    let relative = paths::relative(out_dir, &normalized);
    paths::strip_extension(&relative).to_string()
}

/// `foo/index` and `foo` are the same public entry.
fn logical_name(candidate: &str) -> &str {
    candidate.strip_suffix("/index").unwrap_or(candidate)
}

fn collect<F>(exports: Option<&Value>, fields: &FieldEntries, visit: &mut F) -> Result<(), Error>
where
    F: FnMut(&Declaration, &str) -> Result<(), Error>,
{
    walk_exports(exports, &mut |subpath, _condition, output_path| {
        visit(&Declaration::Export(subpath.to_string()), output_path)
    })?;

    for entry in fields {
        let declaration = Declaration::Field(entry.field);
        for (_format, output_path) in entry.format_paths() {
            visit(&declaration, output_path)?;
        }
    }
    Ok(())
}

/// Direct-mode derivation: each artifact maps its logical name to an
/// extension-less path under `./src`, with no filesystem access. The
/// consumer attaches an extension or treats the value as an import
/// specifier.
pub fn derive_entrypoints(
    out_dir: &str,
    exports: Option<&Value>,
    fields: &FieldEntries,
) -> Result<EntryPoints, Error> {
    let mut builder = EntryPointsBuilder::default();

    collect(exports, fields, &mut |declaration, output_path| {
        let candidate = candidate_path(out_dir, output_path);
        let name = logical_name(&candidate).to_string();
        let value = format!("./src/{candidate}");
        builder.insert(declaration, name, value)
    })?;

    Ok(EntryPoints(builder.finish()?))
}

/// Locate the source file for `candidate` by probing every supported
/// extension across the source directory candidates, in that nested order.
/// Returns the first match, relative to `package_dir`.
#[must_use]
pub fn find_source_file(package_dir: &Path, candidate: &str) -> Option<String> {
    for extension in SOURCE_FILE_EXTENSIONS {
        for directory in SOURCE_DIRECTORIES {
            let relative = if directory.is_empty() {
                format!("{candidate}{extension}")
            } else {
                format!("{directory}/{candidate}{extension}")
            };
            if package_dir.join(&relative).is_file() {
                return Some(relative);
            }
        }
    }
    None
}

/// Probing-mode resolution: verify every entry against the filesystem and
/// key the result by the matched source path.
pub fn resolve_entrypoints(
    package_dir: &Path,
    out_dir: &str,
    exports: Option<&Value>,
    fields: &FieldEntries,
) -> Result<EntryPoints, Error> {
    let mut builder = EntryPointsBuilder::default();

    collect(exports, fields, &mut |declaration, output_path| {
        let candidate = candidate_path(out_dir, output_path);
        let source = find_source_file(package_dir, &candidate).ok_or_else(|| {
            Error::NoSourceFile {
                candidate: candidate.clone(),
            }
        })?;
        let name = logical_name(&candidate).to_string();
        builder.insert(declaration, name, source)
    })?;

    let by_name = builder.finish()?;
    Ok(EntryPoints(
        by_name
            .into_iter()
            .map(|(name, source)| (source, name))
            .collect(),
    ))
}
