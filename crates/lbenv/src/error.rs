// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for lbenv operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::var::VarKind;

/// Convenience Result type with lbenv Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing an environment.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// A variable was declared again with a different kind or locality
    #[error(
        "Redeclaration of {name:?}: declared as {existing_kind} (local={existing_local}), \
         now requested as {requested_kind} (local={requested_local})"
    )]
    #[diagnostic(
        code(lbenv::redeclaration),
        help("A variable keeps its type and locality for the whole session")
    )]
    Redeclaration {
        name: String,
        existing_kind: VarKind,
        existing_local: bool,
        requested_kind: VarKind,
        requested_local: bool,
    },

    /// Project could not be found in any root
    #[error("No such project (name={name:?}, version={version:?}, platform={platform:?}) in {roots:?}")]
    #[diagnostic(
        code(lbenv::project_not_found),
        help("Extend the project search path (CMTPROJECTPATH, LHCBPROJECTPATH or --dev-dirs)")
    )]
    ProjectNotFound {
        name: String,
        version: String,
        platform: String,
        roots: Vec<PathBuf>,
    },

    /// Data package could not be found in any root
    #[error("Could not find data package {name:?} matching {pattern:?} in {roots:?}")]
    #[diagnostic(code(lbenv::data_package_not_found))]
    DataPackageNotFound {
        name: String,
        pattern: String,
        roots: Vec<PathBuf>,
    },

    /// Malformed XML in a recipe
    #[error("Invalid XML in {document}: {error}")]
    #[diagnostic(code(lbenv::invalid_xml))]
    InvalidXml {
        document: String,
        #[source]
        error: quick_xml::Error,
    },

    /// Recipe contains an element that is not an action
    #[error("Unknown action <{element}> in {document}")]
    #[diagnostic(
        code(lbenv::unknown_action),
        help("Valid actions are declare, set, unset, append, prepend, remove, remove-regexp and include")
    )]
    UnknownAction { document: String, element: String },

    /// Recipe action is missing data or carries a bad attribute value
    #[error("Malformed <{element}> in {document}: {reason}")]
    #[diagnostic(code(lbenv::malformed_action))]
    MalformedAction {
        document: String,
        element: String,
        reason: String,
    },

    /// Manifest document does not match the expected shape
    #[error("Invalid manifest {path:?}: {error}")]
    #[diagnostic(code(lbenv::invalid_manifest))]
    InvalidManifest {
        path: PathBuf,
        #[source]
        error: quick_xml::DeError,
    },

    /// Include file not found
    #[error("Include file not found: {path:?}")]
    #[diagnostic(
        code(lbenv::include_not_found),
        help("Check the recipe search path (ENVXMLPATH) and the include hints")
    )]
    IncludeNotFound {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Removal pattern does not compile
    #[error("Invalid pattern {pattern:?} for variable {variable:?}")]
    #[diagnostic(code(lbenv::invalid_pattern))]
    InvalidPattern {
        variable: String,
        pattern: String,
        #[source]
        error: regex::Error,
    },

    /// Data package version pattern is not a valid glob
    #[error("Invalid version pattern {pattern:?}")]
    #[diagnostic(code(lbenv::invalid_version_pattern))]
    InvalidVersionPattern {
        pattern: String,
        #[source]
        error: glob::PatternError,
    },

    /// Failed to read file
    #[error("Failed to read file: {path:?}")]
    #[diagnostic(code(lbenv::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// A package source could not be listed
    #[error("Failed to list packages of {repository}: {reason}")]
    #[diagnostic(code(lbenv::package_listing))]
    PackageListing { repository: String, reason: String },

    /// Invalid YAML in the package index or configuration file
    #[error("Invalid YAML in {path:?}: {error}")]
    #[diagnostic(code(lbenv::invalid_yaml))]
    InvalidYaml {
        path: PathBuf,
        #[source]
        error: serde_yaml::Error,
    },

    /// IO error passthrough
    #[error(transparent)]
    #[diagnostic(code(lbenv::io_error))]
    Io(#[from] std::io::Error),
}
