// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `lbx env` command.

use clap::Args;
use miette::Result;

/// Print the environment of a project as a shell script
#[derive(Debug, Args)]
pub struct CmdEnv {
    #[clap(flatten)]
    pub projects: crate::ProjectFlags,

    #[clap(flatten)]
    pub processors: crate::ProcessorFlags,

    /// Print the recipe replaying the composition instead
    #[clap(long)]
    pub xml: bool,
}

impl CmdEnv {
    pub async fn run(&mut self) -> Result<i32> {
        let env = self.projects.compose(&self.processors.processors())?;
        if self.xml {
            print!("{}", env.save_xml());
        } else {
            print!("{}", env.gen_script());
        }
        Ok(0)
    }
}
