//! Shared fixtures for depcmake integration tests.

// Not every helper is used by every test file
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use assert_cmd::Command;
use tempfile::TempDir;

/// A throwaway project directory with a place for local dependency sources.
pub struct TestProject {
    temp: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("project")).unwrap();
        std::fs::create_dir_all(temp.path().join("sources")).unwrap();
        Self { temp }
    }

    pub fn project_dir(&self) -> PathBuf {
        self.temp.path().join("project")
    }

    /// Fetch area of the project's cache, where sources land.
    pub fn fetch_root(&self) -> PathBuf {
        self.project_dir().join("depcmake").join("fetch")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.project_dir().join("depcmake")
    }

    pub fn write_config(&self, content: &str) {
        std::fs::write(self.project_dir().join("depcmake.yaml"), content).unwrap();
    }

    /// Create a local source folder with a `CMakeLists.txt` and return its
    /// `file://` URL.
    ///
    /// `version` adds an inline VERSION to the project call; `nested` writes
    /// the folder's own `depcmake.yaml`.
    pub fn add_source(
        &self,
        dir_name: &str,
        project_name: &str,
        version: Option<&str>,
        nested_config: Option<&str>,
    ) -> String {
        let dir = self.temp.path().join("sources").join(dir_name);
        std::fs::create_dir_all(&dir).unwrap();

        let version_part = version.map_or(String::new(), |v| format!(" VERSION {v}"));
        std::fs::write(
            dir.join("CMakeLists.txt"),
            format!("cmake_minimum_required(VERSION 3.10)\nproject({project_name}{version_part})\n"),
        )
        .unwrap();

        if let Some(config) = nested_config {
            std::fs::write(dir.join("depcmake.yaml"), config).unwrap();
        }

        format!("file://{}", dir.display())
    }

    /// Pack a source folder into a gzipped tarball and return the archive's
    /// `file://` URL.
    pub fn pack_source(&self, dir_name: &str, archive_name: &str) -> String {
        let sources = self.temp.path().join("sources");
        let archive = sources.join(archive_name);
        let status = StdCommand::new("tar")
            .arg("czf")
            .arg(&archive)
            .arg("-C")
            .arg(&sources)
            .arg(dir_name)
            .status()
            .unwrap();
        assert!(status.success(), "tar failed packing {dir_name}");
        format!("file://{}", archive.display())
    }

    /// A `depcmake` invocation pointed at this project, with progress bars
    /// off.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("depcmake").unwrap();
        cmd.arg("--no-progress")
            .arg("--project-dir")
            .arg(self.project_dir());
        cmd
    }
}

/// One `dependencies:` stanza from name/url pairs.
pub fn config_with(entries: &[(&str, &str)]) -> String {
    let mut out = String::from("dependencies:\n");
    for (name, url) in entries {
        out.push_str(&format!("  - name: {name}\n    url: {url}\n"));
    }
    out
}

/// The cache directory names present under a directory, sorted.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
