// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! Process-wide configuration.
//!
//! Values are read once, from the process environment and an optional
//! user config file, then passed explicitly to every session and walk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::var::split_path_list;

#[cfg(test)]
#[path = "./config_test.rs"]
mod config_test;

/// Platform used when neither `BINARY_TAG` nor `CMTCONFIG` is set.
pub const DEFAULT_PLATFORM: &str = "x86_64-linux-gcc-opt";

/// Variables holding project roots, in search order.
const PROJECT_PATH_VARS: [&str; 3] = ["CMAKE_PREFIX_PATH", "CMTPROJECTPATH", "LHCBPROJECTPATH"];

/// Variables naming the platform, in priority order.
const PLATFORM_VARS: [&str; 2] = ["BINARY_TAG", "CMTCONFIG"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Fallback directories for included recipes.
    pub envxml_path: Vec<PathBuf>,
    /// Roots searched for projects and data packages.
    pub project_path: Vec<PathBuf>,
    pub platform: String,
    /// Seed non-local declarations from the process environment.
    pub load_from_system: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            envxml_path: vec![PathBuf::from(".")],
            project_path: Vec::new(),
            platform: DEFAULT_PLATFORM.to_string(),
            load_from_system: true,
        }
    }
}

/// Settings read from the user config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub envxml_path: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub project_path: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_from_system: Option<bool>,
}

impl ConfigFile {
    pub fn from_yaml(yaml: &str, path: &Path) -> crate::Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|error| crate::Error::InvalidYaml {
            path: path.to_path_buf(),
            error,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|error| crate::Error::ReadFailed {
            path: path.to_path_buf(),
            error,
        })?;
        Self::from_yaml(&yaml, path)
    }

    /// Location of the user config file, `<config dir>/lbx/config.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lbx").join("config.yaml"))
    }
}

impl Config {
    /// Read the process environment and the user config file, if any.
    pub fn from_env() -> crate::Result<Self> {
        let file = match ConfigFile::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("reading config from [{}]", path.display());
                ConfigFile::load(&path)?
            }
            _ => ConfigFile::default(),
        };
        Ok(Self::resolve(&crate::environment::process_vars(), file))
    }

    /// Build a configuration from the given variables alone.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::with_file(vars, ConfigFile::default())
    }

    /// Build a configuration from variables, completed by config file settings.
    ///
    /// Entries from variables come first; a platform named by a variable wins.
    pub fn with_file<I, K, V>(vars: I, file: ConfigFile) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::resolve(&vars, file)
    }

    fn resolve(vars: &HashMap<String, String>, file: ConfigFile) -> Self {
        let mut envxml_path = vec![PathBuf::from(".")];
        envxml_path.extend(path_entries(vars.get("ENVXMLPATH")));
        envxml_path.extend(file.envxml_path);

        let mut project_path: Vec<PathBuf> = PROJECT_PATH_VARS
            .iter()
            .flat_map(|name| path_entries(vars.get(*name)))
            .collect();
        project_path.extend(file.project_path);

        let platform = PLATFORM_VARS
            .iter()
            .find_map(|name| vars.get(*name).filter(|v| !v.is_empty()).cloned())
            .or(file.platform)
            .unwrap_or_else(|| DEFAULT_PLATFORM.to_string());

        Self {
            envxml_path,
            project_path,
            platform,
            load_from_system: file.load_from_system.unwrap_or(true),
        }
    }
}

fn path_entries(value: Option<&String>) -> Vec<PathBuf> {
    value
        .map(|v| {
            split_path_list(v)
                .into_iter()
                .filter(|entry| !entry.is_empty())
                .map(PathBuf::from)
                .collect()
        })
        .unwrap_or_default()
}
