// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! Composing the runtime environment of a selection of projects.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::config::Config;
use crate::environment::Environment;
use crate::lookup::{Locator, LATEST};
use crate::processor::Processor;
use crate::project::ProjectRequest;
use crate::var::PATH_LIST_SEPARATOR;
use crate::{walk, Result};

#[cfg(test)]
#[path = "./compose_test.rs"]
mod compose_test;

/// Project providing the grid middleware.
pub const GRID_PROJECT: &str = "LHCbGrid";

/// Tag prefixed to the shell prompt of composed environments.
pub const PROMPT_TAG: &str = "[lbx] ";

/// The projects taking part in one composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSelection {
    pub project: ProjectRequest,
    /// Add the grid middleware ahead of everything else.
    pub use_grid: bool,
    /// Projects loaded before the main one.
    pub overriding: Vec<ProjectRequest>,
    /// Projects loaded after the main one.
    pub runtime: Vec<ProjectRequest>,
}

impl ProjectSelection {
    pub fn new(project: ProjectRequest) -> Self {
        Self {
            project,
            use_grid: false,
            overriding: Vec::new(),
            runtime: Vec::new(),
        }
    }

    /// Every selected project, in the order their recipes are loaded.
    pub fn projects(&self) -> Vec<ProjectRequest> {
        let mut projects = Vec::new();
        if self.use_grid {
            projects.push(ProjectRequest::new(GRID_PROJECT, LATEST));
        }
        projects.extend(self.overriding.iter().cloned());
        projects.push(self.project.clone());
        projects.extend(self.runtime.iter().cloned());
        projects
    }
}

/// Walk the dependencies of each project in turn and concatenate the results.
///
/// A directory reached from several projects keeps its first position.
pub fn search_path(
    locator: &Locator,
    platform: &str,
    projects: &[ProjectRequest],
) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    for project in projects {
        let walked = walk(locator, platform, std::slice::from_ref(project))?;
        tracing::debug!("{project} uses {} directories", walked.len());
        paths.extend(walked.into_iter().filter(|dir| seen.insert(dir.clone())));
    }
    Ok(paths)
}

/// Set every given variable in the session, in name order.
pub fn import_vars(env: &mut Environment, vars: &HashMap<String, String>) -> Result<()> {
    let mut names: Vec<_> = vars.keys().collect();
    names.sort();
    for name in names {
        env.set(name, &vars[name])?;
    }
    Ok(())
}

/// Apply the `<Project>Environment.xml` recipe of each project.
pub fn load_projects(env: &mut Environment, projects: &[ProjectRequest]) -> Result<()> {
    for project in projects {
        tracing::info!("loading environment of {project}");
        env.load_by_name(&project.recipe_name())?;
    }
    Ok(())
}

/// Move `LD_LIBRARY_PATH` to the variable the loader of `os` reads.
///
/// `os` takes the values of [`std::env::consts::OS`]. The entries are
/// appended to `PATH` on windows and to `DYLD_LIBRARY_PATH` on macos;
/// other systems are left untouched.
pub fn fix_library_path(env: &mut Environment, os: &str) -> Result<()> {
    let target = match os {
        "windows" => "PATH",
        "macos" => "DYLD_LIBRARY_PATH",
        _ => return Ok(()),
    };
    let Some(libs) = env.get("LD_LIBRARY_PATH").map(|var| var.value.clone()) else {
        return Ok(());
    };
    let value = match env.get(target).map(|var| var.value.as_str()) {
        Some(current) if !current.is_empty() => format!("{current}{PATH_LIST_SEPARATOR}{libs}"),
        _ => libs,
    };
    env.set(target, &value)?;
    env.unset("LD_LIBRARY_PATH")
}

/// Prefix the shell prompt with [`PROMPT_TAG`].
pub fn tag_prompt(env: &mut Environment) -> Result<()> {
    let current = env
        .get("PS1")
        .map(|var| var.value.clone())
        .unwrap_or_default();
    if current.starts_with(PROMPT_TAG) {
        return Ok(());
    }
    env.set("PS1", &format!("{PROMPT_TAG}{current}"))
}

/// Compose the environment of `projects`.
///
/// The session searches the directories of the dependency walk for
/// recipes, starts from `imported` and runs `processors` after the
/// default ones.
pub fn compose(
    config: &Config,
    projects: &[ProjectRequest],
    imported: &HashMap<String, String>,
    processors: &[Processor],
) -> Result<Environment> {
    let locator = Locator::new(config.project_path.clone());
    let search = search_path(&locator, &config.platform, projects)?;
    let mut env = Environment::new(config).with_search_path(search);
    for processor in processors {
        env.push_processor(*processor);
    }
    import_vars(&mut env, imported)?;
    load_projects(&mut env, projects)?;
    Ok(env)
}
