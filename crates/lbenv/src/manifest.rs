// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! Project manifests, as generated by the build of each project.
//!
//! ```xml
//! <manifest>
//!   <project name="DaVinci" version="v45r1"/>
//!   <heptools>
//!     <version>96b</version>
//!     <binary_tag>x86_64-centos7-gcc9-opt</binary_tag>
//!     <lcg_system>x86_64-centos7-gcc9</lcg_system>
//!   </heptools>
//!   <used_projects>
//!     <project name="Analysis" version="v31r1"/>
//!   </used_projects>
//!   <used_data_pkgs>
//!     <package name="TCK/HltTCK" version="v3r*"/>
//!   </used_data_pkgs>
//! </manifest>
//! ```

use std::path::Path;

use serde::Deserialize;

#[cfg(test)]
#[path = "./manifest_test.rs"]
mod manifest_test;

/// File name of the manifest inside a project directory.
pub const MANIFEST_FILENAME: &str = "manifest.xml";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub project: NameVersion,
    pub heptools: HepTools,
    pub used_projects: Vec<NameVersion>,
    /// Data packages; versions are glob patterns.
    pub used_data_pkgs: Vec<NameVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NameVersion {
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@version", default)]
    pub version: String,
}

/// Toolchain the project was built with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HepTools {
    pub version: String,
    pub binary_tag: String,
    pub lcg_system: String,
}

#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    project: NameVersion,
    #[serde(default)]
    heptools: HepTools,
    #[serde(default)]
    used_projects: RawProjects,
    #[serde(default)]
    used_data_pkgs: RawPackages,
}

#[derive(Default, Deserialize)]
struct RawProjects {
    #[serde(default)]
    project: Vec<NameVersion>,
}

#[derive(Default, Deserialize)]
struct RawPackages {
    #[serde(default)]
    package: Vec<NameVersion>,
}

impl From<RawManifest> for Manifest {
    fn from(raw: RawManifest) -> Self {
        Self {
            project: raw.project,
            heptools: raw.heptools,
            used_projects: raw.used_projects.project,
            used_data_pkgs: raw.used_data_pkgs.package,
        }
    }
}

impl Manifest {
    /// Parse a manifest document; `path` only labels errors.
    pub fn parse(xml: &str, path: &Path) -> crate::Result<Self> {
        let raw: RawManifest =
            quick_xml::de::from_str(xml).map_err(|error| crate::Error::InvalidManifest {
                path: path.to_path_buf(),
                error,
            })?;
        Ok(raw.into())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path).map_err(|error| crate::Error::ReadFailed {
            path: path.to_path_buf(),
            error,
        })?;
        Self::parse(&xml, path)
    }
}
