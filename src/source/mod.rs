//! Source URL classification.
//!
//! A dependency URL is classified into one of four acquisition kinds from
//! its scheme and extension alone - no network access happens here:
//!
//! | scheme      | extension              | kind            |
//! |-------------|------------------------|-----------------|
//! | http/https  | `.git`                 | [`GitRemote`]   |
//! | http/https  | archive extension      | [`ArchiveRemote`] |
//! | file        | none                   | [`LocalFolder`] |
//! | file        | archive extension      | [`LocalArchive`] |
//!
//! Anything else is a checked classification error, not an open-ended
//! fallback. The archive-extension set is queried from
//! [`crate::archive::extensions`], never duplicated here.
//!
//! [`GitRemote`]: SourceKind::GitRemote
//! [`ArchiveRemote`]: SourceKind::ArchiveRemote
//! [`LocalFolder`]: SourceKind::LocalFolder
//! [`LocalArchive`]: SourceKind::LocalArchive

use std::path::PathBuf;

use crate::archive;

/// How a dependency is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Remote git repository, cloned then optionally pinned
    GitRemote,
    /// Remote archive, downloaded then decompressed
    ArchiveRemote,
    /// Local folder, copied recursively
    LocalFolder,
    /// Local archive file, decompressed
    LocalArchive,
}

/// Why a URL failed classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownSource {
    /// Recognized scheme, unusable extension
    Extension(String),
    /// Scheme outside http/https/file
    Scheme(String),
}

impl std::fmt::Display for UnknownSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extension(ext) if ext.is_empty() => write!(f, "unsupported type (no extension)"),
            Self::Extension(ext) => write!(f, "unsupported type {ext}"),
            Self::Scheme(scheme) => write!(f, "unsupported scheme {scheme}"),
        }
    }
}

/// Classify a dependency URL into its acquisition kind.
pub fn classify(url: &str) -> Result<SourceKind, UnknownSource> {
    let scheme = scheme_of(url);
    let name = file_name(url);

    match scheme {
        "http" | "https" => {
            if name.ends_with(".git") {
                Ok(SourceKind::GitRemote)
            } else if is_archive(name) {
                Ok(SourceKind::ArchiveRemote)
            } else {
                Err(UnknownSource::Extension(extension_of(name).to_string()))
            }
        }
        "file" => {
            if extension_of(name).is_empty() {
                Ok(SourceKind::LocalFolder)
            } else if is_archive(name) {
                Ok(SourceKind::LocalArchive)
            } else {
                Err(UnknownSource::Extension(extension_of(name).to_string()))
            }
        }
        other => Err(UnknownSource::Scheme(other.to_string())),
    }
}

/// The last path segment of the URL, query and fragment stripped.
pub fn file_name(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or(without_scheme);
    path.rsplit('/').next().unwrap_or(path).trim_end_matches('/')
}

/// The filesystem path of a `file://` URL.
pub fn local_path(url: &str) -> PathBuf {
    let path = url.strip_prefix("file://").unwrap_or(url);
    let path = path.split(['?', '#']).next().unwrap_or(path);
    PathBuf::from(path)
}

fn scheme_of(url: &str) -> &str {
    url.split_once("://").map_or("", |(scheme, _)| scheme)
}

/// The extension of a file name, with the leading dot; empty if none.
///
/// A lone leading dot (hidden file) does not count as an extension.
fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => "",
        Some(index) => &name[index..],
    }
}

fn is_archive(name: &str) -> bool {
    archive::extensions().any(|ext| name.ends_with(ext))
}
