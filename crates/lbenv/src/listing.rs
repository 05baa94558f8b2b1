// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! Listing the packages published by source repositories.
//!
//! Every repository group is listed by its own task; the listing only
//! succeeds when every group does.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[cfg(test)]
#[path = "./listing_test.rs"]
mod listing_test;

/// Default location of the package index, relative to the work area.
pub const PACKAGE_INDEX_PATH: &str = ".lbx/packages-db.yaml";

/// Known repository groups and their mirrors, in preference order.
const KNOWN_REPOSITORIES: &[(&str, &[&str])] = &[
    (
        "dirac",
        &[
            "svn+ssh://svn.cern.ch/reps/dirac",
            "http://svn.cern.ch/guest/dirac",
        ],
    ),
    (
        "gaudi",
        &[
            "svn+ssh://svn.cern.ch/reps/gaudi",
            "http://svn.cern.ch/guest/gaudi",
        ],
    ),
    (
        "lbsvn",
        &[
            "svn+ssh://svn.cern.ch/reps/lhcb",
            "http://svn.cern.ch/guest/lhcb",
        ],
    ),
    ("lhcbint", &["svn+ssh://svn.cern.ch/reps/lhcbint"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Full name, including any hat.
    pub name: String,
    /// Project holding the package, if declared.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project: String,
    /// Repository the package was listed from.
    pub repo: String,
}

/// Packages by name.
pub type Packages = BTreeMap<String, Package>;

/// Something that can enumerate packages.
#[async_trait]
pub trait PackageSource: Send + Sync {
    /// Human readable location, used in logs and errors.
    fn location(&self) -> &str;

    async fn packages(&self) -> Result<Vec<Package>>;
}

/// A subversion repository publishing its packages in the `packages`
/// property of its root.
#[derive(Debug, Clone)]
pub struct SvnRepository {
    url: String,
    program: String,
}

impl SvnRepository {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            program: "svn".to_string(),
        }
    }

    /// Use another client binary instead of `svn`.
    pub fn with_program<S: Into<String>>(mut self, program: S) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl PackageSource for SvnRepository {
    fn location(&self) -> &str {
        &self.url
    }

    async fn packages(&self) -> Result<Vec<Package>> {
        tracing::debug!("listing packages of {}", self.url);
        let output = tokio::process::Command::new(&self.program)
            .args(["propget", "packages", &self.url])
            .output()
            .await
            .map_err(|err| Error::PackageListing {
                repository: self.url.clone(),
                reason: format!("failed to run {}: {err}", self.program),
            })?;
        if !output.status.success() {
            return Err(Error::PackageListing {
                repository: self.url.clone(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(parse_packages(
            &String::from_utf8_lossy(&output.stdout),
            &self.url,
        ))
    }
}

/// Parse `name [project]` lines; blank lines and `#` comments are skipped.
pub fn parse_packages(text: &str, repo: &str) -> Vec<Package> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            let name = tokens.next()?;
            Some(Package {
                name: name.to_string(),
                project: tokens.next().unwrap_or_default().to_string(),
                repo: repo.to_string(),
            })
        })
        .collect()
}

/// Mirrors of one repository, tried in order.
#[derive(Clone)]
pub struct RepoGroup {
    pub name: String,
    pub mirrors: Vec<Arc<dyn PackageSource>>,
}

impl std::fmt::Debug for RepoGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoGroup")
            .field("name", &self.name)
            .field(
                "mirrors",
                &self.mirrors.iter().map(|m| m.location()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl RepoGroup {
    pub fn new<S: Into<String>>(name: S, mirrors: Vec<Arc<dyn PackageSource>>) -> Self {
        Self {
            name: name.into(),
            mirrors,
        }
    }

    /// Packages whose name starts with `hat`, from the first mirror that
    /// answers.
    pub async fn list(&self, hat: &str) -> Result<Vec<Package>> {
        let mut last_error = None;
        for mirror in &self.mirrors {
            match mirror.packages().await {
                Ok(packages) => {
                    return Ok(packages
                        .into_iter()
                        .filter(|pkg| pkg.name.starts_with(hat))
                        .collect());
                }
                Err(err) => {
                    tracing::warn!("mirror {} of {} failed: {err}", mirror.location(), self.name);
                    last_error = Some(err);
                }
            }
        }
        Err(Error::PackageListing {
            repository: self.name.clone(),
            reason: match last_error {
                Some(err) => err.to_string(),
                None => "no mirror configured".to_string(),
            },
        })
    }
}

/// The known repository groups, minus the `excluded` names.
pub fn default_repositories(excluded: &[String]) -> Vec<RepoGroup> {
    KNOWN_REPOSITORIES
        .iter()
        .filter(|(name, _)| !excluded.iter().any(|e| e.as_str() == *name))
        .map(|(name, urls)| {
            let mirrors = urls
                .iter()
                .map(|url| Arc::new(SvnRepository::new(*url)) as Arc<dyn PackageSource>)
                .collect();
            RepoGroup::new(*name, mirrors)
        })
        .collect()
}

/// List every group concurrently and merge the results.
///
/// Any failing group fails the whole listing. When several groups publish
/// the same package name, the earliest group wins.
pub async fn list_packages(groups: Vec<RepoGroup>, hat: &str) -> Result<Packages> {
    let tasks = groups.into_iter().map(|group| {
        let hat = hat.to_string();
        let name = group.name.clone();
        let handle = tokio::spawn(async move { group.list(&hat).await });
        async move {
            handle.await.map_err(|err| Error::PackageListing {
                repository: name,
                reason: err.to_string(),
            })?
        }
    });
    let listed = futures::future::try_join_all(tasks).await?;

    let mut merged = Packages::new();
    for package in listed.into_iter().flatten() {
        merged.entry(package.name.clone()).or_insert(package);
    }
    tracing::info!("listed {} packages", merged.len());
    Ok(merged)
}

/// Packages persisted between invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageIndex {
    #[serde(default)]
    pub packages: Packages,
}

impl PackageIndex {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|error| Error::ReadFailed {
            path: path.to_path_buf(),
            error,
        })?;
        serde_yaml::from_str(&yaml).map_err(|error| Error::InvalidYaml {
            path: path.to_path_buf(),
            error,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self).map_err(|error| Error::InvalidYaml {
            path: path.to_path_buf(),
            error,
        })?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Packages whose name starts with `hat`.
    pub fn with_hat<'a>(&'a self, hat: &'a str) -> impl Iterator<Item = &'a Package> + 'a {
        self.packages
            .values()
            .filter(move |pkg| pkg.name.starts_with(hat))
    }
}

/// Reuse the index at `path` unless `refresh` is set, otherwise list
/// `groups` and save the result there.
pub async fn load_or_build_index(
    path: &Path,
    groups: Vec<RepoGroup>,
    refresh: bool,
) -> Result<PackageIndex> {
    if !refresh && path.is_file() {
        tracing::debug!("reusing package index [{}]", path.display());
        return PackageIndex::load(path);
    }
    let index = PackageIndex {
        packages: list_packages(groups, "").await?,
    };
    index.save(path)?;
    tracing::info!("saved package index to [{}]", path.display());
    Ok(index)
}
