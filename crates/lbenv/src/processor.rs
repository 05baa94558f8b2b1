// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! Value processors applied to every value before it is stored.
//!
//! A processor receives the variable being edited, the candidate value and
//! the session, and returns the value to use instead. Sessions run their
//! processors in order, see [`default_processors`].

use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::environment::Environment;
use crate::var::{join_path_list, split_path_list, Var, VarKind};

#[cfg(test)]
#[path = "./processor_test.rs"]
mod processor_test;

/// Signature shared by all value processors.
pub type Processor = fn(&Var, &str, &Environment) -> String;

/// Matches `$NAME`, `$(NAME)`, `${NAME}` and `${.}`.
static VAR_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\$([A-Za-z_][A-Za-z0-9_]*)|\$\(([A-Za-z_][A-Za-z0-9_]*)\)|\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$\{(\.)\}",
    )
    .expect("variable reference regex is valid")
});

/// The processors every session starts with.
pub fn default_processors() -> Vec<Processor> {
    vec![expand_vars, normalize_paths, remove_duplicates]
}

/// Replace references to declared variables with their current value.
///
/// References to unknown variables are kept verbatim.
pub fn expand_vars(_var: &Var, value: &str, env: &Environment) -> String {
    VAR_REFERENCE
        .replace_all(value, |caps: &Captures<'_>| {
            let name = (1..=4)
                .find_map(|i| caps.get(i))
                .map(|m| m.as_str())
                .unwrap_or_default();
            match env.get(name) {
                Some(var) => var.value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Lexically clean every path-like entry; URLs pass through untouched.
pub fn normalize_paths(var: &Var, value: &str, _env: &Environment) -> String {
    if value.is_empty() {
        return String::new();
    }
    match var.kind {
        VarKind::List => join_path_list(split_path_list(value).into_iter().map(|entry| {
            if entry.is_empty() || is_url(entry) {
                entry.to_string()
            } else {
                clean_path(entry)
            }
        })),
        VarKind::Scalar if is_url(value) => value.to_string(),
        VarKind::Scalar => clean_path(value),
    }
}

/// Drop repeated list entries, keeping the first occurrence.
pub fn remove_duplicates(var: &Var, value: &str, _env: &Environment) -> String {
    if var.kind == VarKind::Scalar {
        return value.to_string();
    }
    let mut seen = std::collections::HashSet::new();
    join_path_list(
        split_path_list(value)
            .into_iter()
            .filter(|entry| seen.insert(*entry)),
    )
}

/// Drop list entries that are missing, not directories, or empty directories.
///
/// Existing `.zip` archives are kept.
pub fn remove_empty_dirs(var: &Var, value: &str, _env: &Environment) -> String {
    if var.kind == VarKind::Scalar {
        return value.to_string();
    }
    join_path_list(split_path_list(value).into_iter().filter(|entry| {
        let path = Path::new(entry);
        if entry.ends_with(".zip") && path.is_file() {
            return true;
        }
        match std::fs::read_dir(path) {
            Ok(mut entries) => entries.next().is_some(),
            Err(_) => false,
        }
    }))
}

/// Prefer `<dir>.zip` archives over plain directories in `PYTHONPATH`.
pub fn use_python_zip(var: &Var, value: &str, _env: &Environment) -> String {
    if var.kind == VarKind::Scalar || var.name != "PYTHONPATH" {
        return value.to_string();
    }
    join_path_list(split_path_list(value).into_iter().map(|dir| {
        let archive = format!("{dir}.zip");
        if is_readable_zip(Path::new(&archive)) {
            archive
        } else {
            dir.to_string()
        }
    }))
}

fn is_readable_zip(path: &Path) -> bool {
    std::fs::File::open(path)
        .ok()
        .is_some_and(|file| zip::ZipArchive::new(file).is_ok())
}

fn is_url(value: &str) -> bool {
    value.contains("://")
}

/// Lexical path cleaning: collapses `.`, `..` and repeated separators.
///
/// An empty result becomes `.`; `..` never climbs above the root.
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(last) if *last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
