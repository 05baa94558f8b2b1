// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! The recipe action language.

use std::path::PathBuf;

use crate::var::VarKind;

/// A single environment edit, as read from a recipe or recorded by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Declare(DeclareVar),
    Set(SetVar),
    Unset(UnsetVar),
    Append(AppendVar),
    Prepend(PrependVar),
    Remove(RemoveVar),
    RemoveMatching(RemoveMatching),
    Include(Include),
}

impl Action {
    /// Name of the recipe element encoding this action.
    pub fn element(&self) -> &'static str {
        match self {
            Self::Declare(_) => "declare",
            Self::Set(_) => "set",
            Self::Unset(_) => "unset",
            Self::Append(_) => "append",
            Self::Prepend(_) => "prepend",
            Self::Remove(_) => "remove",
            Self::RemoveMatching(_) => "remove-regexp",
            Self::Include(_) => "include",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclareVar {
    pub name: String,
    pub kind: VarKind,
    pub local: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetVar {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsetVar {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendVar {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrependVar {
    pub name: String,
    pub value: String,
}

/// Removal of an exact literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveVar {
    pub name: String,
    pub value: String,
}

/// Removal of everything matched by a regular expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveMatching {
    pub name: String,
    pub pattern: String,
}

/// Inclusion of another recipe file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    pub file: String,
    /// Extra directories to search, separated by `:` or `;`.
    pub hints: Option<String>,
    /// The recipe holding this include, attached when decoding from a file.
    pub caller: Option<PathBuf>,
}
