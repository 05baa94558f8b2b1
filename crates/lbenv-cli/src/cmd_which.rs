// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `lbx which` command.

use clap::Args;
use lbenv::{fix_project_case, Locator, LATEST};
use miette::Result;

/// Print the install directory of a project
#[derive(Debug, Args)]
pub struct CmdWhich {
    #[clap(flatten)]
    pub search: crate::SearchFlags,

    /// Name of the project
    pub project: String,

    /// Version of the project
    #[clap(default_value = LATEST)]
    pub version: String,
}

impl CmdWhich {
    pub async fn run(&mut self) -> Result<i32> {
        let config = self.search.config()?;
        let locator = Locator::new(config.project_path);
        let name = fix_project_case(&self.project);
        tracing::info!("which project={name} version={}", self.version);

        let dir = locator.find_project(&name, &self.version, &config.platform)?;
        println!("{}", dir.display());
        Ok(0)
    }
}
