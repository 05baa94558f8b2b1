// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! Locating installed projects and data packages on the project search path.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Error, Result};

#[cfg(test)]
#[path = "./lookup_test.rs"]
mod lookup_test;

/// Version token meaning "whatever is installed without a version suffix".
pub const LATEST: &str = "latest";

/// Directories under each root that may hold data packages.
const DATA_PACKAGE_CONTAINERS: [&str; 4] = ["", "EXTRAPACKAGES", "DBASE", "PARAM"];

static INTEGER_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("integer run regex is valid"));

/// Searches an ordered list of roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locator {
    roots: Vec<PathBuf>,
}

impl Locator {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Find the install area of a project for the given platform.
    ///
    /// Under each root, in order: `Name` (only for [`LATEST`]),
    /// `Name_version`, then `NAME/NAME_version`; the match is the
    /// `InstallArea/<platform>` directory below it.
    pub fn find_project(&self, name: &str, version: &str, platform: &str) -> Result<PathBuf> {
        let upper = name.to_uppercase();
        let mut suffixes = Vec::with_capacity(3);
        if version == LATEST {
            suffixes.push(PathBuf::from(name));
        }
        suffixes.push(PathBuf::from(format!("{name}_{version}")));
        suffixes.push(Path::new(&upper).join(format!("{upper}_{version}")));

        for root in &self.roots {
            for suffix in &suffixes {
                let dir = root.join(suffix).join("InstallArea").join(platform);
                tracing::debug!("checking [{}]...", dir.display());
                if dir.is_dir() {
                    tracing::debug!("checking [{}]... [OK]", dir.display());
                    return Ok(dir);
                }
            }
        }

        Err(Error::ProjectNotFound {
            name: name.to_string(),
            version: version.to_string(),
            platform: platform.to_string(),
            roots: self.roots.clone(),
        })
    }

    /// Find the best installed version of a data package.
    ///
    /// A version directory named exactly `pattern` wins immediately;
    /// otherwise the highest version matching `pattern` as a glob is used.
    pub fn find_data_package(&self, name: &str, pattern: &str) -> Result<PathBuf> {
        let glob = glob::Pattern::new(pattern).map_err(|error| Error::InvalidVersionPattern {
            pattern: pattern.to_string(),
            error,
        })?;

        let mut best: Option<(DataPackageVersion, PathBuf)> = None;
        for root in &self.roots {
            for container in DATA_PACKAGE_CONTAINERS {
                let dir = root.join(container).join(name);
                tracing::debug!("checking [{}]...", dir.display());
                let Ok(entries) = std::fs::read_dir(&dir) else {
                    continue;
                };
                for entry in entries.flatten() {
                    if !entry.path().is_dir() {
                        continue;
                    }
                    let Ok(version) = entry.file_name().into_string() else {
                        continue;
                    };
                    if version == pattern {
                        return Ok(entry.path());
                    }
                    if !glob.matches(&version) {
                        continue;
                    }
                    let candidate = DataPackageVersion::new(version);
                    if best.as_ref().is_none_or(|(current, _)| candidate > *current) {
                        best = Some((candidate, entry.path()));
                    }
                }
            }
        }

        match best {
            Some((version, path)) => {
                tracing::debug!("selected {name} {} at [{}]", version.as_str(), path.display());
                Ok(path)
            }
            None => Err(Error::DataPackageNotFound {
                name: name.to_string(),
                pattern: pattern.to_string(),
                roots: self.roots.clone(),
            }),
        }
    }
}

/// A data package version, ordered by its embedded integer runs.
///
/// `v10r1` sorts after `v9r2`; when all runs agree the shorter run list
/// sorts first, and the plain string breaks remaining ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPackageVersion {
    text: String,
    numbers: Vec<u64>,
}

impl DataPackageVersion {
    pub fn new<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        let numbers = INTEGER_RUN
            .find_iter(&text)
            .map(|m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
            .collect();
        Self { text, numbers }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Ord for DataPackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.numbers
            .cmp(&other.numbers)
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for DataPackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
