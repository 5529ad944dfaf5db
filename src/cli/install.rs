//! Fetch, check, build and install dependencies into the shared prefix.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::dependency::list::DependencyList;

use super::build::layout_with_prefix;

#[derive(Args)]
pub struct InstallCommand {
    /// Install prefix the dependencies are installed into (defaults to the
    /// install area of the cache)
    #[arg(long)]
    install_prefix: Option<PathBuf>,

    /// Extra arguments passed to every configure invocation, after `--`
    #[arg(last = true)]
    cmake_args: Vec<String>,
}

impl InstallCommand {
    pub async fn execute(self, project_dir: &Path) -> Result<()> {
        let layout = layout_with_prefix(project_dir, self.install_prefix)?;
        let install_root = layout.install_root.clone();

        let mut list = DependencyList::load(project_dir, layout)?;
        list.fetch().await?;
        list.check()?;
        list.build(&self.cmake_args).await?;
        list.install().await?;

        println!("{}", "Dependencies installed".green().bold());
        println!(
            "You can now configure your project, pointing CMake at the installed \
             dependencies with:\n\n    -DCMAKE_PREFIX_PATH={}",
            install_root.display()
        );
        Ok(())
    }
}
