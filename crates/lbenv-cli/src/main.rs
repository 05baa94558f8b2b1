// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! lbx - Runtime Environment Composition CLI

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lbenv::{Config, Environment, Processor, ProjectRequest, ProjectSelection};
use miette::Result;

mod cmd_env;
mod cmd_pkg;
mod cmd_run;
mod cmd_search_path;
mod cmd_which;

use cmd_env::CmdEnv;
use cmd_pkg::CmdPkg;
use cmd_run::CmdRun;
use cmd_search_path::CmdSearchPath;
use cmd_which::CmdWhich;

#[cfg(test)]
#[path = "./main_test.rs"]
mod main_test;

#[derive(Parser)]
#[clap(
    name = "lbx",
    about = "Runtime Environment Composition",
    version,
    long_about = "Compose the runtime environment of installed projects from their XML recipes"
)]
struct Opt {
    #[clap(flatten)]
    logging: Logging,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
struct Logging {
    /// Increase verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[clap(short, long, global = true)]
    quiet: bool,
}

/// Where projects are looked up.
#[derive(Parser, Clone, Debug, Default)]
pub struct SearchFlags {
    /// Search these directories before the configured project roots
    #[clap(long = "dev-dirs", value_name = "DIR")]
    pub dev_dirs: Vec<PathBuf>,

    /// Platform of the install areas to use
    #[clap(short = 'c', long)]
    pub platform: Option<String>,
}

impl SearchFlags {
    /// The process configuration, with these flags applied.
    pub fn config(&self) -> Result<Config> {
        Ok(self.apply(Config::from_env()?))
    }

    fn apply(&self, mut config: Config) -> Config {
        if !self.dev_dirs.is_empty() {
            let mut roots = self.dev_dirs.clone();
            roots.append(&mut config.project_path);
            config.project_path = roots;
        }
        if let Some(platform) = &self.platform {
            config.platform = platform.clone();
        }
        config
    }
}

/// Which projects make up the environment.
#[derive(Parser, Clone, Debug)]
pub struct ProjectFlags {
    #[clap(flatten)]
    pub search: SearchFlags,

    /// Add the LHCbGrid project ahead of everything else
    #[clap(long)]
    pub use_grid: bool,

    /// Projects loaded before the main one (e.g. "Foo:v1r2,Bar")
    #[clap(long, value_delimiter = ',', value_name = "PROJECT[:VERSION]")]
    pub overriding_projects: Vec<ProjectRequest>,

    /// Projects loaded after the main one (e.g. "Foo:v1r2,Bar")
    #[clap(long, value_delimiter = ',', value_name = "PROJECT[:VERSION]")]
    pub runtime_projects: Vec<ProjectRequest>,

    /// The project to set up
    #[clap(value_name = "PROJECT[:VERSION]")]
    pub project: ProjectRequest,
}

impl ProjectFlags {
    pub fn selection(&self) -> ProjectSelection {
        ProjectSelection {
            project: self.project.clone(),
            use_grid: self.use_grid,
            overriding: self.overriding_projects.clone(),
            runtime: self.runtime_projects.clone(),
        }
    }

    /// Compose the environment of the selected projects on top of the
    /// current process environment.
    pub fn compose(&self, processors: &[Processor]) -> Result<Environment> {
        let config = self.search.config()?;
        let projects = self.selection().projects();
        tracing::debug!(
            "composing {} on {}",
            projects
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            config.platform
        );
        let mut env = lbenv::compose(
            &config,
            &projects,
            &lbenv::environment::process_vars(),
            processors,
        )?;
        lbenv::compose::fix_library_path(&mut env, std::env::consts::OS)?;
        lbenv::compose::tag_prompt(&mut env)?;
        Ok(env)
    }
}

/// Optional value processors.
#[derive(Parser, Clone, Debug, Default)]
pub struct ProcessorFlags {
    /// Use zipped python modules when available
    #[clap(long)]
    pub python_zip: bool,

    /// Drop missing and empty directories from path lists
    #[clap(long)]
    pub strip_empty_dirs: bool,
}

impl ProcessorFlags {
    pub fn processors(&self) -> Vec<Processor> {
        let mut processors: Vec<Processor> = Vec::new();
        if self.strip_empty_dirs {
            processors.push(lbenv::processor::remove_empty_dirs);
        }
        if self.python_zip {
            processors.push(lbenv::processor::use_python_zip);
        }
        processors
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run a command in the environment of a project
    Run(CmdRun),

    /// Print the environment of a project as a shell script
    Env(CmdEnv),

    /// Print the install directory of a project
    Which(CmdWhich),

    /// Print the directories searched for recipes
    SearchPath(CmdSearchPath),

    /// Index and list the packages of the source repositories
    Pkg(CmdPkg),
}

impl Opt {
    async fn run(self) -> Result<i32> {
        let log_level = match (self.logging.quiet, self.logging.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, 2) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .init();

        match self.cmd {
            Command::Run(mut cmd) => cmd.run().await,
            Command::Env(mut cmd) => cmd.run().await,
            Command::Which(mut cmd) => cmd.run().await,
            Command::SearchPath(mut cmd) => cmd.run().await,
            Command::Pkg(mut cmd) => cmd.run().await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();
    let code = opt.run().await?;
    std::process::exit(code);
}
