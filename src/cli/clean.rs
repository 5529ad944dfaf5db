//! Remove cache areas.
//!
//! Each area can be cleaned independently: fetched sources, build trees, or
//! the install prefix. Cleaning an area simply deletes its directory; the
//! next pipeline run recreates whatever it needs.

use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use crate::cache::CacheLayout;

#[derive(Args)]
pub struct CleanCommand {
    /// Remove fetched sources
    #[arg(long)]
    fetch: bool,

    /// Remove build trees
    #[arg(long)]
    build: bool,

    /// Remove the install area
    #[arg(long)]
    install: bool,

    /// Remove the whole cache
    #[arg(long, conflicts_with_all = ["fetch", "build", "install"])]
    all: bool,
}

impl CleanCommand {
    pub fn execute(self, project_dir: &Path) -> Result<()> {
        let (fetch, build, install) = if self.all {
            (true, true, true)
        } else {
            (self.fetch, self.build, self.install)
        };
        if !(fetch || build || install) {
            bail!("nothing to clean, pass --fetch, --build, --install or --all");
        }

        let layout = CacheLayout::new(project_dir);
        layout.clean(fetch, build, install)?;
        println!("{}", "Cache cleaned".green().bold());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_to_run_without_a_target() {
        let cmd = CleanCommand {
            fetch: false,
            build: false,
            install: false,
            all: false,
        };
        let temp = tempfile::TempDir::new().unwrap();
        assert!(cmd.execute(temp.path()).is_err());
    }

    #[test]
    fn all_cleans_every_area() {
        let temp = tempfile::TempDir::new().unwrap();
        let layout = CacheLayout::new(temp.path());
        for dir in [&layout.fetch_root, &layout.build_root, &layout.install_root] {
            std::fs::create_dir_all(dir).unwrap();
        }

        let cmd = CleanCommand {
            fetch: false,
            build: false,
            install: false,
            all: true,
        };
        cmd.execute(temp.path()).unwrap();

        assert!(!layout.fetch_root.exists());
        assert!(!layout.build_root.exists());
        assert!(!layout.install_root.exists());
    }
}
