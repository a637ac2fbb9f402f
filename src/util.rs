#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::glob;
use which::which;

/// Finds and returns the path to `program` on `PATH`.
pub fn tool_path(program: &str) -> Result<OsString> {
    which(program)
        .map(PathBuf::into_os_string)
        .with_context(|| format!("Cannot find `{program}` on path"))
}

/// A glob utility function to find paths to files with certain extension
///
/// * `extension`: the file extension to find paths for, with or without the
///   leading dot
/// * `search_depth`: how many folders deep to search for
/// * `root_dir`: the root directory where search starts
pub fn find_files(extension: &str, search_depth: i8, root_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pattern = PathBuf::from(glob::Pattern::escape(
        root_dir
            .to_str()
            .context("Could not convert root_dir to string")?,
    ));

    for _ in 0..search_depth {
        pattern.push("**");
    }

    pattern.push(format!("*.{}", extension.trim_start_matches('.')));
    let pattern = pattern
        .to_str()
        .context("Could not convert glob pattern to string")?
        .to_string();

    let mut found: Vec<PathBuf> = glob(&pattern)
        .context("Could not create glob")?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    found.sort();
    Ok(found)
}

/// Resolves `path` against `base` unless it is already absolute.
pub fn resolve_path(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Splits a `;`-separated list of paths, ignoring blank entries, and resolves
/// each against `base`.
pub fn split_path_list(base: &Path, list: &str) -> Vec<PathBuf> {
    list.split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| resolve_path(base, p))
        .collect()
}

/// File stem of `path` as a string, empty when it has none.
pub fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Finds the first of `candidates` whose stem matches `name`'s stem,
/// ignoring case.
pub fn find_by_stem<'a>(candidates: &'a [PathBuf], name: &Path) -> Option<&'a PathBuf> {
    let wanted = stem(name).to_lowercase();
    candidates.iter().find(|c| stem(c).to_lowercase() == wanted)
}

/// Removes a file, treating "already gone" as success.
///
/// Returns whether a file was actually removed.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Could not delete {}", path.display())),
    }
}

/// Formats a duration in seconds as `h:mm:ss`.
pub fn format_elapsed(secs: u64) -> String {
    let (m, s) = (secs / 60, secs % 60);
    let (h, m) = (m / 60, m % 60);
    format!("{h}:{m:02}:{s:02}")
}
