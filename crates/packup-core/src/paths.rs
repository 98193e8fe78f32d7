//! Path-string helpers for manifest-declared paths.
//!
//! Output paths declared in package.json are `/`-separated relative strings
//! (`"./dist/index.js"`), not OS paths, so they are normalized and compared
//! as strings. Only [`package_root`] touches `std::path`.

use std::path::{Path, PathBuf};

/// Find the nearest package root by walking up from `cwd` looking for a
/// `package.json`.
///
/// Returns the first directory containing the manifest, or `None` if none is
/// found up to the filesystem root.
#[must_use]
pub fn package_root(cwd: &Path) -> Option<PathBuf> {
    let mut current = cwd.to_path_buf();

    loop {
        if current.join("package.json").is_file() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Normalize a `/`-separated relative path: drops `.` segments, collapses
/// duplicate separators and resolves `..` against preceding segments.
#[must_use]
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), None | Some(&"..")) {
                    segments.push("..");
                } else {
                    segments.pop();
                }
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

/// Compute `target` relative to `base`, both `/`-separated relative paths.
///
/// An empty or `.` base leaves the target unchanged; a base that is not a
/// prefix of the target is climbed out of with `..` segments.
#[must_use]
pub fn relative(base: &str, target: &str) -> String {
    let base = normalize(base);
    let target = normalize(target);

    if base == target {
        return String::new();
    }

    let base_segments: Vec<&str> = if base == "." {
        Vec::new()
    } else {
        base.split('/').collect()
    };
    let target_segments: Vec<&str> = if target == "." {
        Vec::new()
    } else {
        target.split('/').collect()
    };

    let common = base_segments
        .iter()
        .zip(target_segments.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = Vec::new();
    for _ in common..base_segments.len() {
        segments.push("..");
    }
    segments.extend(&target_segments[common..]);
    segments.join("/")
}

/// The final extension of `path` including its dot, if any. Dotfiles do not
/// count as extensions.
#[must_use]
pub fn extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(index) if index > 0 => Some(&name[index..]),
        _ => None,
    }
}

/// `path` with its final extension removed.
#[must_use]
pub fn strip_extension(path: &str) -> &str {
    match extension(path) {
        Some(ext) => &path[..path.len() - ext.len()],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_leading_dot_segment() {
        assert_eq!(normalize("./dist/index.js"), "dist/index.js");
    }

    #[test]
    fn test_normalize_collapses_duplicate_separators() {
        assert_eq!(normalize("dist//esm///index.js"), "dist/esm/index.js");
    }

    #[test]
    fn test_normalize_resolves_parent_segments() {
        assert_eq!(normalize("dist/esm/../index.js"), "dist/index.js");
        assert_eq!(normalize("../shared/index.js"), "../shared/index.js");
    }

    #[test]
    fn test_normalize_trailing_slash_and_empty() {
        assert_eq!(normalize("dist/"), "dist");
        assert_eq!(normalize(""), ".");
    }

    #[test]
    fn test_relative_inside_base() {
        assert_eq!(relative("dist", "dist/index.js"), "index.js");
        assert_eq!(relative("./dist", "dist/foo/index.js"), "foo/index.js");
        assert_eq!(relative("dist/esm", "dist/esm/foo.js"), "foo.js");
    }

    #[test]
    fn test_relative_empty_base() {
        assert_eq!(relative("", "dist/index.js"), "dist/index.js");
    }

    #[test]
    fn test_relative_divergent_base_climbs_out() {
        // A character-narrowed out dir can be a partial segment; relative()
        // has to climb out of it rather than panic.
        assert_eq!(relative("dist/e", "dist/esm/index.js"), "../esm/index.js");
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("dist/index.js"), Some(".js"));
        assert_eq!(extension("dist/index.d.ts"), Some(".ts"));
        assert_eq!(extension("dist/index"), None);
        assert_eq!(extension("dist/.bin"), None);
        assert_eq!(extension("."), None);
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("foo/index.js"), "foo/index");
        assert_eq!(strip_extension("foo/index"), "foo/index");
    }
}
