// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `lbx run` command.

use clap::Args;
use miette::Result;

/// Run a command in the environment of a project
#[derive(Debug, Args)]
pub struct CmdRun {
    #[clap(flatten)]
    pub projects: crate::ProjectFlags,

    #[clap(flatten)]
    pub processors: crate::ProcessorFlags,

    /// Command to run (default: $SHELL)
    #[clap(last = true)]
    pub command: Vec<String>,
}

impl CmdRun {
    pub async fn run(&mut self) -> Result<i32> {
        let env = self.projects.compose(&self.processors.processors())?;

        let (command, args) = match self.command.split_first() {
            Some((command, args)) => (command.clone(), args.to_vec()),
            None => (
                std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string()),
                Vec::new(),
            ),
        };

        tracing::info!("running {command} in the environment of {}", self.projects.project);
        let status = tokio::process::Command::new(&command)
            .args(&args)
            .env_clear()
            .envs(env.exported())
            .status()
            .await
            .map_err(|e| miette::miette!("Failed to run {command}: {e}"))?;

        match status.code() {
            Some(code) => Ok(code),
            None => {
                tracing::warn!("{command} was terminated by a signal");
                Ok(1)
            }
        }
    }
}
