//! Error taxonomy for depcmake.
//!
//! Every failure in the pipeline is wrapped in a stage-specific variant of
//! [`DepcmakeError`] and surfaced to the top level, which halts the remaining
//! stages immediately. There is no silent recovery or retry anywhere:
//! resumability comes from on-disk cache presence, so a re-run after fixing
//! the cause skips already-completed stages.
//!
//! The taxonomy mirrors the pipeline stages:
//! - configuration errors ([`ConfigNotFound`], [`IncorrectConfig`])
//! - classification errors ([`UnknownDependencyType`])
//! - acquisition errors (git, download, decompress, move, local access)
//! - metadata errors ([`ProjectDataNotFound`])
//! - conflict errors ([`DiamondDependency`])
//! - backend errors (missing `CMakeLists.txt`, configure/build/install)
//!
//! Acquisition and backend variants carry the dependency name and, where it
//! helps, the source URL, so the final message identifies the failing unit
//! without extra context.
//!
//! Low-level invocation failures live next to their backends
//! ([`crate::git::GitError`], [`crate::cmake::CmakeError`]) and are wrapped
//! into the unit-level variants here by the dependency layer.
//!
//! [`ConfigNotFound`]: DepcmakeError::ConfigNotFound
//! [`IncorrectConfig`]: DepcmakeError::IncorrectConfig
//! [`UnknownDependencyType`]: DepcmakeError::UnknownDependencyType
//! [`ProjectDataNotFound`]: DepcmakeError::ProjectDataNotFound
//! [`DiamondDependency`]: DepcmakeError::DiamondDependency

use colored::Colorize;
use thiserror::Error;

use crate::cmake::CmakeError;
use crate::git::GitError;

/// The main error type for depcmake operations.
#[derive(Error, Debug)]
pub enum DepcmakeError {
    /// No `depcmake.yaml` in the given directory.
    ///
    /// At the top level this is fatal; during subdependency expansion it is
    /// the normal "no nested declarations" signal and is matched on by the
    /// expander.
    #[error("Unable to find a depcmake.yaml file in {path}")]
    ConfigNotFound {
        /// Directory that was searched
        path: String,
    },

    /// The configuration file exists but cannot be used.
    #[error("Incorrect config: {reason}")]
    IncorrectConfig {
        /// What is wrong with the file
        reason: String,
    },

    /// The dependency URL matches none of the four supported source kinds.
    #[error("Unable to manage dependency {name}: {detail}")]
    UnknownDependencyType {
        /// Display name of the dependency
        name: String,
        /// Scheme or extension that failed classification
        detail: String,
    },

    /// A git clone, pull or checkout failed.
    #[error("Cannot fetch {name} at {url}: {reason}")]
    GitFetch {
        name: String,
        url: String,
        reason: String,
    },

    /// Downloading a remote archive failed.
    #[error("Cannot download {name} at {url}: {reason}")]
    ArchiveDownload {
        name: String,
        url: String,
        reason: String,
    },

    /// Decompressing an archive failed (corrupt or unsupported content).
    #[error("Cannot decompress archive of {name}: {reason}")]
    ArchiveDecompress { name: String, reason: String },

    /// Moving decompressed content into the fetch cache failed.
    #[error("Cannot move archive of {name}: {reason}")]
    ArchiveMove { name: String, reason: String },

    /// A local archive file does not exist.
    #[error("Cannot access {name} at {url}: file not found")]
    ArchiveAccess { name: String, url: String },

    /// A local folder does not exist.
    #[error("Cannot access {name} at {url}: folder not found")]
    FolderAccess { name: String, url: String },

    /// Copying a local folder into the fetch cache failed.
    #[error("Cannot copy {name} at {url}: {reason}")]
    FolderCopy {
        name: String,
        url: String,
        reason: String,
    },

    /// No project name could be read from the dependency's `CMakeLists.txt`.
    ///
    /// Fatal: conflict detection needs the declared project identity.
    #[error("Unable to get project data from {name}")]
    ProjectDataNotFound { name: String },

    /// Two dependency subtrees resolve the same CMake project at
    /// incompatible versions.
    #[error(
        "Diamond dependency detected with two different versions:\n\n\
         {first}\nand:\n\n{second}"
    )]
    DiamondDependency {
        /// Full description of the first conflicting unit
        first: String,
        /// Full description of the second conflicting unit
        second: String,
    },

    /// The effective source directory has no `CMakeLists.txt`.
    #[error("CMakeLists.txt not found in {path}")]
    CmakeListsMissing { path: String },

    /// CMake configure failed for a dependency.
    #[error("Cannot configure {name}: {reason}")]
    Configure { name: String, reason: String },

    /// CMake build failed for a dependency.
    #[error("Cannot build {name}: {reason}")]
    Build { name: String, reason: String },

    /// CMake install failed for a dependency.
    #[error("Cannot install {name}: {reason}")]
    Install { name: String, reason: String },

    /// Underlying I/O failure not covered by a more specific variant.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Print an error to stderr with a contextual hint when one applies.
///
/// Used once, at the top of the CLI. Backend-availability problems get a
/// short installation hint; a missing configuration points at `depcmake
/// init`.
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {error:#}", "error:".red().bold());

    if let Some(hint) = hint_for(error) {
        eprintln!("{} {hint}", "hint:".yellow().bold());
    }
}

fn hint_for(error: &anyhow::Error) -> Option<&'static str> {
    if let Some(err) = error.downcast_ref::<DepcmakeError>() {
        return match err {
            DepcmakeError::ConfigNotFound { .. } => {
                Some("run `depcmake init` to create a starter depcmake.yaml")
            }
            _ => None,
        };
    }

    if let Some(err) = error.downcast_ref::<CmakeError>() {
        return match err {
            CmakeError::NotFound => Some("install CMake and make sure it is in your PATH"),
            _ => None,
        };
    }

    if let Some(err) = error.downcast_ref::<GitError>() {
        return match err {
            GitError::NotFound => Some("install git and make sure it is in your PATH"),
            _ => None,
        };
    }

    None
}
