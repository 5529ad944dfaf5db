//! Fetch dependencies, expand subdependencies and check for conflicts.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::cache::CacheLayout;
use crate::dependency::list::DependencyList;

#[derive(Args)]
pub struct FetchCommand {}

impl FetchCommand {
    pub async fn execute(self, project_dir: &Path) -> Result<()> {
        let layout = CacheLayout::new(project_dir);
        let mut list = DependencyList::load(project_dir, layout)?;
        list.fetch().await?;
        list.check()?;
        println!("{}", "Dependencies fetched".green().bold());
        Ok(())
    }
}
