// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `lbx search-path` command.

use clap::Args;
use colored::Colorize;
use lbenv::Locator;
use miette::Result;

/// Print the directories searched for recipes
#[derive(Debug, Args)]
pub struct CmdSearchPath {
    #[clap(flatten)]
    pub projects: crate::ProjectFlags,

    /// Print the requested projects before the directories
    #[clap(long)]
    pub show_projects: bool,
}

impl CmdSearchPath {
    pub async fn run(&mut self) -> Result<i32> {
        let config = self.projects.search.config()?;
        let projects = self.projects.selection().projects();

        if self.show_projects {
            println!("{}", "Projects:".bold());
            for project in &projects {
                println!("  - {}", project.to_string().green());
            }
            println!();
        }

        let locator = Locator::new(config.project_path.clone());
        let paths = lbenv::compose::search_path(&locator, &config.platform, &projects)?;
        for path in paths {
            println!("{}", path.display());
        }
        Ok(0)
    }
}
