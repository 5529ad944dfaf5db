//! Describe the declared dependencies and their cache state.
//!
//! Listing reads the configuration only; nothing is fetched. The lifecycle
//! flags shown for each dependency reflect cache directory presence, so a
//! dependency fetched or built by a previous run shows up as such.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::cache::CacheLayout;
use crate::dependency::list::DependencyList;

#[derive(Args)]
pub struct ListCommand {}

impl ListCommand {
    pub fn execute(self, project_dir: &Path) -> Result<()> {
        let layout = CacheLayout::new(project_dir);
        let mut list = DependencyList::load(project_dir, layout)?;
        list.describe(&mut std::io::stdout().lock())?;
        Ok(())
    }
}
