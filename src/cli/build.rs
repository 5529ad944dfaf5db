//! Fetch, check and build dependencies.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cache::CacheLayout;
use crate::dependency::list::DependencyList;

#[derive(Args)]
pub struct BuildCommand {
    /// Install prefix the dependencies are configured against (defaults to
    /// the install area of the cache)
    #[arg(long)]
    install_prefix: Option<PathBuf>,

    /// Extra arguments passed to every configure invocation, after `--`
    #[arg(last = true)]
    cmake_args: Vec<String>,
}

impl BuildCommand {
    pub async fn execute(self, project_dir: &Path) -> Result<()> {
        let layout = layout_with_prefix(project_dir, self.install_prefix)?;
        let mut list = DependencyList::load(project_dir, layout)?;
        list.fetch().await?;
        list.check()?;
        list.build(&self.cmake_args).await?;
        println!("{}", "Dependencies built".green().bold());
        Ok(())
    }
}

/// Resolve the cache layout, redirecting the install area when a custom
/// prefix was given.
///
/// The prefix is made absolute up front: it ends up in
/// `CMAKE_INSTALL_PREFIX` and `CMAKE_PREFIX_PATH`, where a relative path
/// would be resolved against each dependency's build tree instead.
pub(super) fn layout_with_prefix(
    project_dir: &Path,
    install_prefix: Option<PathBuf>,
) -> Result<CacheLayout> {
    let layout = CacheLayout::new(project_dir);
    match install_prefix {
        Some(prefix) => {
            let prefix = std::path::absolute(&prefix).with_context(|| {
                format!("install prefix {} is not resolvable", prefix.display())
            })?;
            Ok(layout.with_install_root(prefix))
        }
        None => Ok(layout),
    }
}
