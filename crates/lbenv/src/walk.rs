// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! Expanding requested projects into the ordered directories they need.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use crate::lookup::Locator;
use crate::manifest::{Manifest, MANIFEST_FILENAME};
use crate::project::ProjectRequest;
use crate::Result;

#[cfg(test)]
#[path = "./walk_test.rs"]
mod walk_test;

/// Resolve `projects` and everything their manifests use.
///
/// The result starts with the requested projects' own directories, in
/// order, followed by every data package and used project in the order
/// their manifests are expanded (breadth first). Each directory appears
/// once. A project without a manifest contributes nothing further.
pub fn walk(
    locator: &Locator,
    platform: &str,
    projects: &[ProjectRequest],
) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let mut seen = HashSet::new();
    let mut pending = VecDeque::new();

    for project in projects {
        let dir = locator.find_project(&project.name, &project.version, platform)?;
        if seen.insert(dir.clone()) {
            pending.push_back(dir.join(MANIFEST_FILENAME));
            paths.push(dir);
        }
    }

    while let Some(manifest_path) = pending.pop_front() {
        if !manifest_path.is_file() {
            tracing::debug!("no manifest at [{}]", manifest_path.display());
            continue;
        }
        tracing::debug!("expanding [{}]", manifest_path.display());
        let manifest = Manifest::load(&manifest_path)?;

        for package in &manifest.used_data_pkgs {
            let dir = locator.find_data_package(&package.name, &package.version)?;
            if seen.insert(dir.clone()) {
                paths.push(dir);
            }
        }

        for project in &manifest.used_projects {
            let dir = locator.find_project(&project.name, &project.version, platform)?;
            if seen.insert(dir.clone()) {
                pending.push_back(dir.join(MANIFEST_FILENAME));
                paths.push(dir);
            }
        }
    }

    Ok(paths)
}
