// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `lbx pkg` commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use colored::Colorize;
use lbenv::{default_repositories, load_or_build_index, Package, PackageIndex, PACKAGE_INDEX_PATH};
use miette::Result;

/// Index and list the packages of the source repositories
#[derive(Debug, Args)]
pub struct CmdPkg {
    #[clap(subcommand)]
    cmd: PkgCommand,
}

#[derive(Debug, Subcommand)]
enum PkgCommand {
    /// Build the package index, or reuse an existing one
    Index(CmdPkgIndex),

    /// List the packages of the index
    Ls(CmdPkgLs),
}

impl CmdPkg {
    pub async fn run(&mut self) -> Result<i32> {
        match &mut self.cmd {
            PkgCommand::Index(cmd) => cmd.run().await,
            PkgCommand::Ls(cmd) => cmd.run().await,
        }
    }
}

#[derive(Debug, Args)]
pub struct CmdPkgIndex {
    /// Print the indexed packages whose name starts with HAT
    #[clap(long)]
    hat: Option<String>,

    /// Skip these repositories (dirac, gaudi, lbsvn, lhcbint)
    #[clap(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Where the index is stored
    #[clap(short, long, default_value = PACKAGE_INDEX_PATH)]
    output: PathBuf,

    /// List the repositories again even if the index exists
    #[clap(long)]
    refresh: bool,
}

impl CmdPkgIndex {
    pub async fn run(&mut self) -> Result<i32> {
        let groups = default_repositories(&self.exclude);
        tracing::info!(
            "indexing {}",
            groups
                .iter()
                .map(|g| g.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        let index = load_or_build_index(&self.output, groups, self.refresh).await?;

        if let Some(hat) = &self.hat {
            print_packages(index.with_hat(hat));
        }
        eprintln!(
            "{} packages in {}",
            index.packages.len().to_string().bold(),
            self.output.display()
        );
        Ok(0)
    }
}

#[derive(Debug, Args)]
pub struct CmdPkgLs {
    /// Only list packages whose name starts with HAT
    #[clap(long, default_value = "")]
    hat: String,

    /// Index to read
    #[clap(short, long, default_value = PACKAGE_INDEX_PATH)]
    index: PathBuf,
}

impl CmdPkgLs {
    pub async fn run(&mut self) -> Result<i32> {
        if !self.index.is_file() {
            return Err(miette::miette!(
                help = "Run 'lbx pkg index' to create it",
                "No package index at {}",
                self.index.display()
            ));
        }
        let index = PackageIndex::load(&self.index)?;
        print_packages(index.with_hat(&self.hat));
        Ok(0)
    }
}

fn print_packages<'a>(packages: impl Iterator<Item = &'a Package>) {
    for package in packages {
        if package.project.is_empty() {
            println!("{}", package.name);
        } else {
            println!("{} {}", package.name, package.project.green());
        }
    }
}
