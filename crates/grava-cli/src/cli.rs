//! CLI argument definitions for grava.
//!
//! Uses `clap` derive macros. Each command corresponds to a handler in
//! the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "grava",
    version,
    about = "Resolve package dependency closures and plan build order",
    long_about = "grava resolves the full dependency closure of one or more packages \
                  from the local sync database and the source-metadata cache, and \
                  prints the graph together with topological layers in which the \
                  packages can be built in parallel."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve targets and print the dependency graph with its layers
    Graph {
        /// Packages to resolve
        #[arg(required = true)]
        targets: Vec<String>,

        /// Only add the targets themselves; skip dependency expansion
        #[arg(long)]
        no_deps: bool,

        /// Do not follow optional dependencies
        #[arg(long)]
        no_optional: bool,

        /// Do not expand dependencies already satisfied by the sync database
        #[arg(long)]
        skip_installed: bool,

        /// Mark the plan as not requiring confirmation prompts
        #[arg(long)]
        no_confirm: bool,

        /// Abort on the first unresolved target or provider failure
        #[arg(long)]
        fail_fast: bool,

        /// Treat a package as already satisfied when layering (repeatable)
        #[arg(long = "installed", value_name = "NAME")]
        installed: Vec<String>,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
