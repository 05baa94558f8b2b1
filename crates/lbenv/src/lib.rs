// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! lbenv - Runtime Environment Composition
//!
//! This crate composes the runtime environment of installed projects from
//! the XML recipes they ship, and resolves the projects and data packages
//! a project depends on.
//!
//! # Overview
//!
//! A [`walk`] over the project search path turns requested projects into
//! an ordered list of directories. An [`Environment`] session searches
//! those directories for each project's `<Project>Environment.xml` recipe
//! and applies its actions, following includes, through a pipeline of
//! value [`processor`]s.
//!
//! # Example
//!
//! ```xml
//! <?xml version="1.0" ?>
//! <env:config xmlns:env="EnvSchema">
//! <env:declare local="true" type="scalar" variable="DAVINCI_ROOT"/>
//! <env:set variable="DAVINCI_ROOT">${.}/../..</env:set>
//! <env:prepend variable="PATH">${DAVINCI_ROOT}/scripts</env:prepend>
//! <env:include>AnalysisEnvironment.xml</env:include>
//! </env:config>
//! ```

pub mod action;
pub mod codec;
pub mod compose;
pub mod config;
pub mod environment;
pub mod error;
pub mod listing;
pub mod locate;
pub mod lookup;
pub mod manifest;
pub mod processor;
pub mod project;
pub mod var;
pub mod walk;

pub use action::Action;
pub use compose::{compose, ProjectSelection};
pub use config::{Config, ConfigFile};
pub use environment::Environment;
pub use error::{Error, Result};
pub use listing::{
    default_repositories, list_packages, load_or_build_index, Package, PackageIndex,
    PackageSource, Packages, RepoGroup, SvnRepository, PACKAGE_INDEX_PATH,
};
pub use lookup::{DataPackageVersion, Locator, LATEST};
pub use manifest::{Manifest, MANIFEST_FILENAME};
pub use processor::Processor;
pub use project::{fix_project_case, ProjectRequest};
pub use var::{Var, VarKind};
pub use walk::walk;
