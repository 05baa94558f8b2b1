// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! Locating recipe files named by `include` actions.

use std::path::{Path, PathBuf};

use crate::processor::clean_path;
use crate::var::split_hints;

#[cfg(test)]
#[path = "./locate_test.rs"]
mod locate_test;

/// Resolve a recipe file name to an existing file.
///
/// Candidates are tried in order, first match wins:
/// 1. `file` itself when absolute, which must then exist
/// 2. the caller's directory
/// 3. each hint relative to the caller's directory
/// 4. the session search path, then each hint as given
/// 5. the default search path
///
/// When nothing matches, `file` is checked as given so the underlying
/// filesystem error can be reported.
pub fn locate(
    file: &str,
    caller: Option<&Path>,
    hints: Option<&str>,
    search_path: &[PathBuf],
    default_path: &[PathBuf],
) -> crate::Result<PathBuf> {
    let target = Path::new(file);
    if target.is_absolute() {
        return check_file(target);
    }

    let hints = hints.map(split_hints).unwrap_or_default();
    let caller_dir = caller.map(|c| c.parent().unwrap_or_else(|| Path::new("")));

    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dir) = caller_dir {
        candidates.push(dir.join(file));
        candidates.extend(hints.iter().map(|hint| dir.join(hint).join(file)));
    }
    candidates.extend(search_path.iter().map(|dir| dir.join(file)));
    candidates.extend(hints.iter().map(|hint| Path::new(hint).join(file)));
    candidates.extend(default_path.iter().map(|dir| dir.join(file)));

    for candidate in candidates {
        tracing::trace!("checking [{}]...", candidate.display());
        if candidate.is_file() {
            tracing::debug!("located {file:?} at [{}]", candidate.display());
            return absolute(&candidate);
        }
    }

    check_file(target)
}

/// `path` made absolute when it names a regular file.
fn check_file(path: &Path) -> crate::Result<PathBuf> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => absolute(path),
        Ok(_) => Err(crate::Error::IncludeNotFound {
            path: path.to_path_buf(),
            error: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        }),
        Err(error) => Err(crate::Error::IncludeNotFound {
            path: path.to_path_buf(),
            error,
        }),
    }
}

/// Make a path absolute against the working directory, cleaned lexically.
fn absolute(path: &Path) -> crate::Result<PathBuf> {
    let path = std::path::absolute(path)?;
    Ok(PathBuf::from(clean_path(&path.to_string_lossy())))
}
