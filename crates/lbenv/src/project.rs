// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use crate::lookup::LATEST;

#[cfg(test)]
#[path = "./project_test.rs"]
mod project_test;

/// Known project names with their canonical spelling, in dependency order.
pub const PROJECT_NAMES: &[&str] = &[
    "Gaudi",
    "LHCb",
    "Lbcom",
    "Rec",
    "Boole",
    "Brunel",
    "Gauss",
    "Phys",
    "Analysis",
    "Hlt",
    "Alignment",
    "Moore",
    "Online",
    "Euler",
    "Geant4",
    "DaVinci",
    "Bender",
    "Orwell",
    "Panoramix",
    "LbScripts",
    "Dirac",
    "LHCbGrid",
    "Panoptes",
    "Curie",
    "Vetra",
    "VetraTB",
    "Compat",
    "VanDerMeer",
    "Ganga",
    "LHCbDirac",
    "Integration",
    "Erasmus",
    "Feicim",
    "Stripping",
    "LHCbExternals",
    "Urania",
    "VMDirac",
    "LHCbVMDirac",
    "Noether",
    "Tesla",
    "MooreOnline",
    "BeautyDirac",
    "Kepler",
];

/// Canonical spelling of a known project, or `name` unchanged.
pub fn fix_project_case(name: &str) -> String {
    PROJECT_NAMES
        .iter()
        .find(|known| known.eq_ignore_ascii_case(name))
        .map(|known| known.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// File name of the recipe shipped by a project.
pub fn recipe_name(project: &str) -> String {
    format!("{project}Environment.xml")
}

/// A project asked for by name and version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectRequest {
    pub name: String,
    pub version: String,
}

impl ProjectRequest {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, version: V) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn recipe_name(&self) -> String {
        recipe_name(&self.name)
    }
}

impl fmt::Display for ProjectRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

impl FromStr for ProjectRequest {
    type Err = String;

    /// Parse `Name[:version]`; the name is case-fixed and the version
    /// defaults to `latest`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, version) = match s.split_once(':') {
            Some((name, version)) => (name.trim(), version.trim()),
            None => (s.trim(), LATEST),
        };
        if name.is_empty() {
            return Err(format!("missing project name in {s:?}"));
        }
        let version = if version.is_empty() { LATEST } else { version };
        Ok(Self::new(fix_project_case(name), version))
    }
}
