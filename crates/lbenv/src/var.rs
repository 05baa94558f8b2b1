// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! Typed environment variables and their mutation primitives.

use std::fmt;
use std::str::FromStr;

use regex::Regex;

#[cfg(test)]
#[path = "./var_test.rs"]
mod var_test;

/// Separator between the entries of a list variable.
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';

/// Name of the reserved variable holding the directory of the recipe
/// currently being processed.
pub const DOT: &str = ".";

/// Whether a variable holds free text or a separator-joined list of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    List,
    Scalar,
}

impl VarKind {
    /// Infer the kind of a variable created implicitly by a mutation.
    ///
    /// Names containing `PATH` or `DIRS` (in any case) are lists, anything
    /// else is a scalar.
    pub fn guess(name: &str) -> Self {
        let upper = name.to_uppercase();
        if upper.contains("PATH") || upper.contains("DIRS") {
            Self::List
        } else {
            Self::Scalar
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Scalar => "scalar",
        }
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VarKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Self::List),
            "scalar" => Ok(Self::Scalar),
            other => Err(format!("unknown variable type {other:?}")),
        }
    }
}

/// An environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
    pub name: String,
    pub value: String,
    pub kind: VarKind,
    /// Local variables are usable in recipes but never exported.
    pub local: bool,
}

impl Var {
    pub fn new<S: Into<String>>(name: S, kind: VarKind, local: bool) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            kind,
            local,
        }
    }

    pub fn set<S: Into<String>>(&mut self, value: S) {
        self.value = value.into();
    }

    pub fn append(&mut self, value: &str) {
        match self.kind {
            VarKind::List if !self.value.is_empty() => {
                self.value.push(PATH_LIST_SEPARATOR);
                self.value.push_str(value);
            }
            VarKind::List | VarKind::Scalar => self.value.push_str(value),
        }
    }

    pub fn prepend(&mut self, value: &str) {
        self.value = match self.kind {
            VarKind::List if !self.value.is_empty() => {
                format!("{value}{PATH_LIST_SEPARATOR}{}", self.value)
            }
            VarKind::List | VarKind::Scalar => format!("{value}{}", self.value),
        };
    }

    /// Remove a literal: list entries equal to it, or scalar substrings.
    pub fn remove(&mut self, value: &str) {
        self.value = match self.kind {
            VarKind::List => join_path_list(
                split_path_list(&self.value)
                    .into_iter()
                    .filter(|entry| *entry != value),
            ),
            VarKind::Scalar => self.value.replace(value, ""),
        };
    }

    /// Remove list entries matched by `re`, or every matching scalar substring.
    pub fn remove_matching(&mut self, re: &Regex) {
        self.value = match self.kind {
            VarKind::List => join_path_list(
                split_path_list(&self.value)
                    .into_iter()
                    .filter(|entry| !re.is_match(entry)),
            ),
            VarKind::Scalar => re.replace_all(&self.value, "").into_owned(),
        };
    }
}

/// Split a list value on the platform path-list separator.
pub fn split_path_list(value: &str) -> Vec<&str> {
    value.split(PATH_LIST_SEPARATOR).collect()
}

/// Join entries with the platform path-list separator.
pub fn join_path_list<I, S>(entries: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, entry) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(PATH_LIST_SEPARATOR);
        }
        out.push_str(entry.as_ref());
    }
    out
}

/// Split a hint or search-path list that may use either `:` or `;`.
pub fn split_hints(hints: &str) -> Vec<&str> {
    hints
        .split([':', ';'])
        .filter(|h| !h.is_empty())
        .collect()
}
