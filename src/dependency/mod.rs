//! Dependency units: one resolved dependency instance tracked through
//! fetch, build and install.
//!
//! A [`Dependency`] owns everything about one dependency instance: its
//! declared identity (name + URL, immutable after construction), the
//! derived cache slug, its lifecycle flags, and the CMake project identity
//! discovered after fetching. The ordered list of units and the stage loops
//! over it live in [`list`].
//!
//! Acquisition is idempotent by construction: every fetch variant checks
//! its cache slot first and does nothing when it exists. Two units with the
//! same name and URL collide to the same slot, so a dependency shared by
//! several subtrees is fetched once.

pub mod list;

use std::path::{Path, PathBuf};

use crate::cache::{self, CacheLayout};
use crate::cmake::{self, ProjectVersion};
use crate::config::DependencyDecl;
use crate::core::DepcmakeError;
use crate::git::GitRepo;
use crate::source::{self, SourceKind};
use crate::utils::fs::{copy_dir, ensure_dir};

/// One dependency instance, declared or discovered.
#[derive(Debug)]
pub struct Dependency {
    /// Display name
    pub name: String,
    /// Source URL
    pub url: String,
    /// Revision pin, checked out after clone
    pub git_hash: Option<String>,
    /// Suppress pull/checkout on an already-cloned repository
    pub git_no_update: bool,
    /// Subdirectory of the fetched tree holding the CMakeLists.txt
    pub cmake_subdir: Option<PathBuf>,
    /// Free-form configure arguments
    pub cmake_args: Option<String>,
    /// Parallelism hint for the build
    pub jobs: Option<u32>,
    /// Index of the unit that discovered this one, in the owning list
    pub parent: Option<usize>,
    /// Derived cache slug
    pub slug: String,
    /// Lifecycle flags
    pub fetched: bool,
    pub built: bool,
    pub installed: bool,
    /// CMake project name discovered after fetching
    pub project_name: Option<String>,
    /// CMake project version discovered after fetching, when declared
    pub project_version: Option<ProjectVersion>,
}

impl Dependency {
    /// Build a unit from a configuration declaration.
    pub fn from_decl(decl: DependencyDecl, parent: Option<usize>) -> Self {
        let slug = cache::slug(&decl.name, &decl.url);
        Self {
            name: decl.name,
            url: decl.url,
            git_hash: decl.git_hash,
            git_no_update: decl.git_no_update,
            cmake_subdir: decl.cmake_subdir,
            cmake_args: decl.cmake_args,
            jobs: decl.jobs,
            parent,
            slug,
            fetched: false,
            built: false,
            installed: false,
            project_name: None,
            project_version: None,
        }
    }

    /// Jobs for this unit's build: the configured value, or twice the host
    /// cores plus one.
    pub fn jobs_or_default(&self) -> u32 {
        self.jobs.unwrap_or_else(|| {
            let cores = std::thread::available_parallelism().map_or(1, |n| n.get()) as u32;
            cores * 2 + 1
        })
    }

    /// Refresh the fetched/built flags from cache presence.
    pub fn refresh(&mut self, layout: &CacheLayout) {
        if layout.fetch_path(&self.slug).exists() {
            self.fetched = true;
        }
        if layout.build_path(&self.slug).exists() {
            self.built = true;
        }
    }

    /// Textual description of this unit: identity, configuration, slug and
    /// lifecycle flags.
    pub fn describe(&self, parent_name: Option<&str>) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(out, "Name: {}", self.name);
        let _ = writeln!(out, "URL: {}", self.url);
        if let Some(hash) = &self.git_hash {
            let _ = writeln!(out, "Git hash: {hash}");
        }
        if let Some(subdir) = &self.cmake_subdir {
            let _ = writeln!(out, "Directory with CMake files: {}", subdir.display());
        }
        if let Some(args) = &self.cmake_args {
            let _ = writeln!(out, "CMake arguments: {args}");
        }
        if let Some(jobs) = self.jobs {
            let _ = writeln!(out, "Jobs for building: {jobs}");
        }
        out.push('\n');
        if let Some(parent) = parent_name {
            let _ = writeln!(out, "Dependency of: {parent}");
        }
        let _ = writeln!(out, "Directory name: {}", self.slug);
        if self.fetched {
            out.push_str("Fetched\n");
        }
        if self.built {
            out.push_str("Built\n");
        }
        if self.installed {
            out.push_str("Installed\n");
        }
        out
    }

    /// The directory handed to the build backend: the fetch path, or one of
    /// its subdirectories if configured.
    pub fn source_dir(&self, layout: &CacheLayout) -> PathBuf {
        let mut dir = layout.fetch_path(&self.slug);
        if let Some(subdir) = &self.cmake_subdir {
            dir = dir.join(subdir);
        }
        dir
    }

    /// Fetch the dependency according to its source kind.
    ///
    /// Dispatches over the four acquisition kinds; an unclassifiable URL is
    /// a checked error, not a fallback. On success the unit is marked
    /// fetched.
    pub async fn fetch(&mut self, layout: &CacheLayout) -> Result<(), DepcmakeError> {
        ensure_dir(&layout.fetch_root).map_err(io_like)?;

        let kind = source::classify(&self.url).map_err(|unknown| {
            DepcmakeError::UnknownDependencyType {
                name: self.name.clone(),
                detail: unknown.to_string(),
            }
        })?;

        tracing::debug!(name = %self.name, ?kind, slug = %self.slug, "fetching dependency");

        match kind {
            SourceKind::GitRemote => self.fetch_git(layout).await?,
            SourceKind::ArchiveRemote => self.fetch_archive(layout).await?,
            SourceKind::LocalFolder => self.fetch_folder(layout)?,
            SourceKind::LocalArchive => self.fetch_local_archive(layout)?,
        }

        self.fetched = true;
        Ok(())
    }

    /// Clone or update a git repository, then check out the pin if any.
    ///
    /// On an existing clone, `git_no_update` suppresses the whole
    /// pull-and-checkout step, not just the pull.
    async fn fetch_git(&self, layout: &CacheLayout) -> Result<(), DepcmakeError> {
        let path = layout.fetch_path(&self.slug);

        let repo = if !path.exists() {
            GitRepo::clone(&self.url, &path)
                .await
                .map_err(|error| self.git_error(error))?
        } else if self.git_no_update {
            return Ok(());
        } else {
            let repo = GitRepo::new(&path);
            repo.pull_default_branch()
                .await
                .map_err(|error| self.git_error(error))?;
            repo
        };

        if let Some(hash) = &self.git_hash {
            repo.checkout(hash)
                .await
                .map_err(|error| self.git_error(error))?;
        }
        Ok(())
    }

    /// Download a remote archive, decompress it in scratch space and move
    /// the result into the fetch slot. No-op when the slot exists.
    async fn fetch_archive(&self, layout: &CacheLayout) -> Result<(), DepcmakeError> {
        let path = layout.fetch_path(&self.slug);
        if path.exists() {
            return Ok(());
        }

        // scratch under the fetch root: the final move never crosses
        // filesystems, and the directory is released on drop either way
        let scratch = tempfile::tempdir_in(&layout.fetch_root)?;
        let archive_path = scratch.path().join(source::file_name(&self.url));

        self.download(&archive_path).await?;
        let unpacked = self.unpack_to_scratch(&archive_path, scratch.path())?;
        self.collapse_into(&unpacked, &path)
    }

    /// Copy a local folder into the fetch slot. No-op when the slot exists.
    fn fetch_folder(&self, layout: &CacheLayout) -> Result<(), DepcmakeError> {
        let path = layout.fetch_path(&self.slug);
        if path.exists() {
            return Ok(());
        }

        let folder = source::local_path(&self.url);
        if !folder.exists() {
            return Err(DepcmakeError::FolderAccess {
                name: self.name.clone(),
                url: self.url.clone(),
            });
        }

        copy_dir(&folder, &path).map_err(|error| DepcmakeError::FolderCopy {
            name: self.name.clone(),
            url: self.url.clone(),
            reason: format!("{error:#}"),
        })
    }

    /// Decompress a local archive into the fetch slot. No-op when the slot
    /// exists.
    fn fetch_local_archive(&self, layout: &CacheLayout) -> Result<(), DepcmakeError> {
        let path = layout.fetch_path(&self.slug);
        if path.exists() {
            return Ok(());
        }

        let archive = source::local_path(&self.url);
        if !archive.exists() {
            return Err(DepcmakeError::ArchiveAccess {
                name: self.name.clone(),
                url: self.url.clone(),
            });
        }

        let scratch = tempfile::tempdir_in(&layout.fetch_root)?;
        let unpacked = self.unpack_to_scratch(&archive, scratch.path())?;
        self.collapse_into(&unpacked, &path)
    }

    async fn download(&self, dest: &Path) -> Result<(), DepcmakeError> {
        let download_error = |reason: String| DepcmakeError::ArchiveDownload {
            name: self.name.clone(),
            url: self.url.clone(),
            reason,
        };

        let response = reqwest::get(&self.url)
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|error| download_error(error.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|error| download_error(error.to_string()))?;

        tokio::fs::write(dest, &bytes).await?;
        Ok(())
    }

    /// Decompress into a private scratch subdirectory; the archive content
    /// cannot be listed up front, so it gets a directory of its own.
    fn unpack_to_scratch(
        &self,
        archive: &Path,
        scratch: &Path,
    ) -> Result<PathBuf, DepcmakeError> {
        let unpacked = scratch.join("extract");
        std::fs::create_dir_all(&unpacked)?;

        crate::archive::unpack(archive, &unpacked).map_err(|error| {
            DepcmakeError::ArchiveDecompress {
                name: self.name.clone(),
                reason: error.to_string(),
            }
        })?;
        Ok(unpacked)
    }

    /// Move decompressed content into the fetch slot, applying the
    /// single-child collapse rule: an archive whose root holds exactly one
    /// entry contributes that entry's content directly, without the extra
    /// nesting level.
    fn collapse_into(&self, unpacked: &Path, dest: &Path) -> Result<(), DepcmakeError> {
        let move_error = |reason: String| DepcmakeError::ArchiveMove {
            name: self.name.clone(),
            reason,
        };

        let entries: Vec<PathBuf> = std::fs::read_dir(unpacked)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;

        let to_move = match entries.as_slice() {
            [single] => single.as_path(),
            _ => unpacked,
        };

        std::fs::rename(to_move, dest).map_err(|error| move_error(error.to_string()))
    }

    /// Read the CMake project identity from the effective source directory.
    ///
    /// Fatal when no project name is declared: conflict detection needs it.
    pub fn read_project_metadata(&mut self, layout: &CacheLayout) -> Result<(), DepcmakeError> {
        let data = cmake::project_data(&self.source_dir(layout))?;

        let data = data.ok_or_else(|| DepcmakeError::ProjectDataNotFound {
            name: self.name.clone(),
        })?;

        tracing::debug!(
            name = %self.name,
            project = %data.name,
            version = ?data.version,
            "read project metadata"
        );

        self.project_name = Some(data.name);
        self.project_version = data.version;
        Ok(())
    }

    /// Configure and build the dependency into its private build tree.
    pub async fn build(
        &mut self,
        layout: &CacheLayout,
        extra_args: &[String],
    ) -> Result<(), DepcmakeError> {
        let source_dir = self.source_dir(layout);

        if !cmake::lists_file(&source_dir).exists() {
            return Err(DepcmakeError::CmakeListsMissing {
                path: source_dir.display().to_string(),
            });
        }

        let mut args: Vec<String> = self
            .cmake_args
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        args.extend(extra_args.iter().cloned());

        let build_dir = layout.build_path(&self.slug);

        cmake::configure(&source_dir, &build_dir, &layout.install_root, &args)
            .await
            .map_err(|error| DepcmakeError::Configure {
                name: self.name.clone(),
                reason: error.to_string(),
            })?;

        cmake::build(&build_dir, self.jobs_or_default())
            .await
            .map_err(|error| DepcmakeError::Build {
                name: self.name.clone(),
                reason: error.to_string(),
            })?;

        self.built = true;
        Ok(())
    }

    /// Install the built tree into the shared prefix.
    pub async fn install(&mut self, layout: &CacheLayout) -> Result<(), DepcmakeError> {
        cmake::install(&layout.build_path(&self.slug))
            .await
            .map_err(|error| DepcmakeError::Install {
                name: self.name.clone(),
                reason: error.to_string(),
            })?;

        self.installed = true;
        Ok(())
    }

    fn git_error(&self, error: crate::git::GitError) -> DepcmakeError {
        DepcmakeError::GitFetch {
            name: self.name.clone(),
            url: self.url.clone(),
            reason: error.to_string(),
        }
    }
}

fn io_like(error: anyhow::Error) -> DepcmakeError {
    match error.downcast::<std::io::Error>() {
        Ok(io) => DepcmakeError::Io(io),
        Err(other) => DepcmakeError::Io(std::io::Error::other(other.to_string())),
    }
}
