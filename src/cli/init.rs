//! Write a starter `depcmake.yaml` into the project directory.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config;

#[derive(Args)]
pub struct InitCommand {
    /// Overwrite an existing configuration file
    #[arg(short, long)]
    force: bool,
}

impl InitCommand {
    pub fn execute(self, project_dir: &Path) -> Result<()> {
        config::create(project_dir, self.force)?;
        println!(
            "{} {}",
            "Created".green().bold(),
            project_dir.join(config::CONFIG_NAME).display()
        );
        Ok(())
    }
}
