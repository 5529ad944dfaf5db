//! The ordered dependency list and the stage pipeline over it.
//!
//! [`DependencyList`] owns every unit - declared or discovered - in build
//! order: after expansion, every discovered subdependency precedes the unit
//! that declared it. Parent back-references are indices into this list; the
//! list alone owns units.
//!
//! Expansion and fetching interleave: fetching a unit is what makes its
//! nested `depcmake.yaml` readable, so the expander fetches each unit,
//! discovers its children, and recursively expands them *before* emitting
//! the unit itself. This explicit depth-first construction yields the
//! dependency-before-dependent order directly, to arbitrary depth.
//!
//! All stages run sequentially in list order and halt on the first failure.
//! There is no partial continuation and no retry; a re-run skips completed
//! work through cache presence.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use futures::future::BoxFuture;
use indicatif::ProgressBar;

use crate::cache::CacheLayout;
use crate::cmake;
use crate::config;
use crate::core::DepcmakeError;
use crate::utils::fs::ensure_dir;
use crate::utils::progress::stage_bar;

use super::Dependency;

/// Ordered sequence of dependency units in build order.
#[derive(Debug)]
pub struct DependencyList {
    /// Units in build order (after [`fetch`](Self::fetch), expanded)
    pub units: Vec<Dependency>,
    layout: CacheLayout,
}

impl DependencyList {
    /// Load the declared units from the configuration file in
    /// `project_dir`.
    pub fn load(project_dir: &Path, layout: CacheLayout) -> Result<Self, DepcmakeError> {
        let config = config::load(project_dir)?;
        let units = config
            .dependencies
            .into_iter()
            .map(|decl| Dependency::from_decl(decl, None))
            .collect();
        Ok(Self { units, layout })
    }

    /// Build a list from already-constructed units.
    pub fn from_units(units: Vec<Dependency>, layout: CacheLayout) -> Self {
        Self { units, layout }
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Fetch all units and expand discovered subdependencies, depth-first.
    ///
    /// On return the list is in final build order and every unit carries
    /// its discovered project identity, ready for [`check`](Self::check).
    pub async fn fetch(&mut self) -> Result<(), DepcmakeError> {
        println!("Fetching dependencies...");
        let bar = stage_bar(self.units.len() as u64, "dependencies");

        let declared = std::mem::take(&mut self.units);
        let mut ordered = Vec::with_capacity(declared.len());
        for unit in declared {
            visit(&self.layout, unit, &mut ordered, &bar).await?;
        }
        self.units = ordered;

        bar.finish_and_clear();
        Ok(())
    }

    /// Scan the expanded list pairwise for diamond dependencies.
    ///
    /// Two units sharing a CMake project name pass when their resolved
    /// versions are both known and equal, or when they point at the same
    /// URL with the same revision pin (the latter can in principle hide
    /// drift behind a revision-less URL; accepted behavior). Anything else
    /// is a conflict, reported with both units' full descriptions.
    pub fn check(&self) -> Result<(), DepcmakeError> {
        println!("Checking dependencies...");

        for (index, unit) in self.units.iter().enumerate() {
            for other in &self.units[index + 1..] {
                let (Some(name), Some(other_name)) = (&unit.project_name, &other.project_name)
                else {
                    continue;
                };
                if name != other_name {
                    continue;
                }

                if let (Some(version), Some(other_version)) =
                    (&unit.project_version, &other.project_version)
                {
                    if version == other_version {
                        continue;
                    }
                }

                if unit.url == other.url && unit.git_hash == other.git_hash {
                    continue;
                }

                return Err(DepcmakeError::DiamondDependency {
                    first: unit.describe(self.parent_name_of(unit)),
                    second: other.describe(self.parent_name_of(other)),
                });
            }
        }
        Ok(())
    }

    /// Configure and build every unit, in list order.
    pub async fn build(&mut self, extra_args: &[String]) -> Result<()> {
        ensure_dir(&self.layout.build_root)?;
        cmake::ensure_cmake_available().await?;

        println!("Building dependencies...");
        let bar = stage_bar(self.units.len() as u64, "dependencies");
        for unit in &mut self.units {
            unit.build(&self.layout, extra_args).await?;
            bar.inc(1);
        }
        bar.finish_and_clear();
        Ok(())
    }

    /// Install every built unit into the shared prefix, in list order.
    pub async fn install(&mut self) -> Result<()> {
        ensure_dir(&self.layout.install_root)?;
        cmake::ensure_cmake_available().await?;

        println!("Installing dependencies...");
        let bar = stage_bar(self.units.len() as u64, "dependencies");
        for unit in &mut self.units {
            unit.install(&self.layout).await?;
            bar.inc(1);
        }
        bar.finish_and_clear();
        Ok(())
    }

    /// Describe every unit as text, refreshing lifecycle flags from cache
    /// presence first.
    pub fn describe(&mut self, out: &mut impl Write) -> std::io::Result<()> {
        let layout = self.layout.clone();
        for unit in &mut self.units {
            unit.refresh(&layout);
        }

        let separator = format!("{}\n", "-".repeat(39));
        writeln!(out, "Dependencies listed in config\n")?;
        out.write_all(separator.as_bytes())?;
        for index in 0..self.units.len() {
            let parent = self.units[index]
                .parent
                .map(|parent| self.units[parent].name.clone());
            let text = self.units[index].describe(parent.as_deref());
            out.write_all(text.as_bytes())?;
            out.write_all(separator.as_bytes())?;
        }
        Ok(())
    }

    fn parent_name_of(&self, unit: &Dependency) -> Option<&str> {
        unit.parent.map(|index| self.units[index].name.as_str())
    }
}

/// Fetch one unit, expand its discovered children before it, and append it.
///
/// `depcmake.yaml` missing from the fetch slot means "no nested
/// declarations"; any other configuration error propagates exactly like a
/// top-level one. Direct children get their parent's final index patched in
/// once the parent is appended.
fn visit<'a>(
    layout: &'a CacheLayout,
    mut unit: Dependency,
    ordered: &'a mut Vec<Dependency>,
    bar: &'a ProgressBar,
) -> BoxFuture<'a, Result<(), DepcmakeError>> {
    Box::pin(async move {
        unit.fetch(layout).await?;
        unit.read_project_metadata(layout)?;
        bar.inc(1);

        let nested = match config::load(&layout.fetch_path(&unit.slug)) {
            Ok(config) => config.dependencies,
            Err(DepcmakeError::ConfigNotFound { .. }) => Vec::new(),
            Err(error) => return Err(error),
        };

        if !nested.is_empty() {
            tracing::debug!(
                name = %unit.name,
                count = nested.len(),
                "discovered subdependencies"
            );
            bar.inc_length(nested.len() as u64);
        }

        let mut direct_children = Vec::with_capacity(nested.len());
        for decl in nested {
            let child = Dependency::from_decl(decl, None);
            visit(layout, child, ordered, bar).await?;
            direct_children.push(ordered.len() - 1);
        }

        ordered.push(unit);
        let parent_index = ordered.len() - 1;
        for child_index in direct_children {
            ordered[child_index].parent = Some(parent_index);
        }
        Ok(())
    })
}
