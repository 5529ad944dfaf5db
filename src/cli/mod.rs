//! Command-line interface for depcmake.
//!
//! Each subcommand lives in its own module with its own argument struct and
//! execution logic:
//!
//! - `init` - write a starter `depcmake.yaml`
//! - `list` - describe the declared dependencies and their cache state
//! - `fetch` - fetch and expand dependencies, then check for conflicts
//! - `build` - fetch, check and build
//! - `install` - fetch, check, build and install into the shared prefix
//! - `clean` - remove cache areas
//!
//! Global flags control verbosity and progress display; `--project-dir`
//! points every subcommand at a project other than the current directory.

mod build;
mod clean;
mod fetch;
mod init;
mod install;
mod list;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::utils::progress::NO_PROGRESS_ENV;

/// Top-level command-line interface.
#[derive(Parser)]
#[command(
    name = "depcmake",
    about = "Fetch, build and install CMake project dependencies",
    version,
    long_about = "depcmake reads the dependencies declared in depcmake.yaml, fetches them \
                  into a local cache, expands their own declared dependencies recursively, \
                  and builds and installs everything in dependency order."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable progress bars
    #[arg(long, global = true)]
    no_progress: bool,

    /// Project directory containing depcmake.yaml (defaults to the current
    /// directory)
    #[arg(short = 'p', long, global = true)]
    project_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter depcmake.yaml into the project directory
    Init(init::InitCommand),

    /// Describe the declared dependencies and their cache state
    List(list::ListCommand),

    /// Fetch dependencies, expand subdependencies and check for conflicts
    Fetch(fetch::FetchCommand),

    /// Fetch, check and build dependencies
    Build(build::BuildCommand),

    /// Fetch, check, build and install dependencies
    Install(install::InstallCommand),

    /// Remove cache areas
    Clean(clean::CleanCommand),
}

impl Cli {
    /// Set up logging and progress display, then dispatch to the
    /// subcommand.
    pub async fn execute(self) -> Result<()> {
        if self.no_progress {
            std::env::set_var(NO_PROGRESS_ENV, "1");
        }
        init_tracing(self.verbose, self.quiet);

        let project_dir = self.project_dir()?;
        match self.command {
            Commands::Init(cmd) => cmd.execute(&project_dir),
            Commands::List(cmd) => cmd.execute(&project_dir),
            Commands::Fetch(cmd) => cmd.execute(&project_dir).await,
            Commands::Build(cmd) => cmd.execute(&project_dir).await,
            Commands::Install(cmd) => cmd.execute(&project_dir).await,
            Commands::Clean(cmd) => cmd.execute(&project_dir),
        }
    }

    /// Resolve the project directory to an absolute path.
    ///
    /// The cache layout and the configure-step prefix arguments are derived
    /// from this path, so it must not depend on the process working
    /// directory afterwards.
    fn project_dir(&self) -> Result<PathBuf> {
        let dir = self
            .project_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        dir.canonicalize()
            .with_context(|| format!("project directory {} is not accessible", dir.display()))
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let fallback = if verbose {
        "depcmake=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
