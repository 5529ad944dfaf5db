//! Cache layout and dependency slugs.
//!
//! Every dependency owns one subdirectory per stage, named by its slug:
//!
//! ```text
//! <project>/depcmake/
//! ├── fetch/<slug>/     # acquired sources, one per dependency
//! ├── build/<slug>/     # private CMake build trees
//! └── install/          # shared install prefix (overridable)
//! ```
//!
//! The slug is `slugify(name) + "_" + digest(url)`: identical name and URL
//! always collide to the same cache slot, which is what makes fetches
//! idempotent and de-duplicates the same dependency appearing in several
//! subtrees. On-disk presence of these directories is the only state depcmake
//! keeps between runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// Cache directory name, relative to the project being set up.
pub const CACHE_DIR: &str = "depcmake";

/// Hex characters kept from the URL digest. Collision resistance is the
/// requirement here, not security; 128 bits is plenty for a dependency tree.
const DIGEST_LEN: usize = 32;

/// The three cache roots threaded through every component that touches disk.
#[derive(Debug, Clone)]
pub struct CacheLayout {
    /// Root of the per-dependency fetch slots
    pub fetch_root: PathBuf,
    /// Root of the per-dependency build trees
    pub build_root: PathBuf,
    /// Shared install prefix for all dependencies
    pub install_root: PathBuf,
}

impl CacheLayout {
    /// Default layout under `<project_dir>/depcmake/`.
    pub fn new(project_dir: &Path) -> Self {
        let cache = project_dir.join(CACHE_DIR);
        Self {
            fetch_root: cache.join("fetch"),
            build_root: cache.join("build"),
            install_root: cache.join("install"),
        }
    }

    /// Override the shared install prefix.
    #[must_use]
    pub fn with_install_root(mut self, install_root: PathBuf) -> Self {
        self.install_root = install_root;
        self
    }

    /// Fetch slot of a dependency.
    pub fn fetch_path(&self, slug: &str) -> PathBuf {
        self.fetch_root.join(slug)
    }

    /// Private build tree of a dependency.
    pub fn build_path(&self, slug: &str) -> PathBuf {
        self.build_root.join(slug)
    }

    /// Remove the selected cache roots. Missing roots are not an error.
    pub fn clean(&self, fetch: bool, build: bool, install: bool) -> Result<()> {
        for (selected, root) in [
            (fetch, &self.fetch_root),
            (build, &self.build_root),
            (install, &self.install_root),
        ] {
            if selected && root.exists() {
                std::fs::remove_dir_all(root)
                    .with_context(|| format!("Failed to remove {}", root.display()))?;
            }
        }
        Ok(())
    }
}

/// Deterministic cache slug for a dependency identity.
pub fn slug(name: &str, url: &str) -> String {
    format!("{}_{}", slugify(name), digest(url))
}

/// Lower-case the name and join its whitespace-split tokens with `_`.
fn slugify(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

/// Stable content digest of the URL string, truncated hex.
fn digest(url: &str) -> String {
    let hash = Sha256::digest(url.as_bytes());
    let mut hex = hex::encode(hash);
    hex.truncate(DIGEST_LEN);
    hex
}
