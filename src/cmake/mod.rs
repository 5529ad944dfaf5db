//! CMake backend: availability probe, configure/build/install invocations,
//! and `CMakeLists.txt` project metadata.
//!
//! Invocations capture output and wrap non-zero exits into [`CmakeError`]
//! variants carrying the exit code and stderr; the dependency layer adds
//! the failing unit's name on top. The configure step points both
//! `CMAKE_INSTALL_PREFIX` and `CMAKE_PREFIX_PATH` at the shared install
//! prefix, so every dependency can find the ones installed before it.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tokio::process::Command;

/// Build-description file CMake projects are identified by.
pub const CMAKE_LISTS_FILE: &str = "CMakeLists.txt";

/// Low-level CMake failures, wrapped into unit-level errors by the
/// dependency layer.
#[derive(Error, Debug)]
pub enum CmakeError {
    #[error("CMake executable was not found")]
    NotFound,

    #[error("CMake executable cannot be run")]
    NotUsable,

    #[error("configuration failed with code {code}: {stderr}")]
    ConfigureFailed { code: i32, stderr: String },

    #[error("build failed with code {code}: {stderr}")]
    BuildFailed { code: i32, stderr: String },

    #[error("install failed with code {code}: {stderr}")]
    InstallFailed { code: i32, stderr: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Availability probe, run once before the build and install stages.
pub async fn ensure_cmake_available() -> Result<(), CmakeError> {
    which::which("cmake").map_err(|_| CmakeError::NotFound)?;

    let status = Command::new("cmake")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|_| CmakeError::NotUsable)?;

    if !status.success() {
        return Err(CmakeError::NotUsable);
    }
    Ok(())
}

/// Path of the build-description file in a source directory.
pub fn lists_file(source_dir: &Path) -> PathBuf {
    source_dir.join(CMAKE_LISTS_FILE)
}

/// Configure a dependency into its private build tree.
pub async fn configure(
    source_dir: &Path,
    build_dir: &Path,
    install_prefix: &Path,
    extra_args: &[String],
) -> Result<(), CmakeError> {
    let mut args = vec![
        format!("-DCMAKE_INSTALL_PREFIX={}", install_prefix.display()),
        format!("-DCMAKE_PREFIX_PATH={}", install_prefix.display()),
    ];
    args.extend(extra_args.iter().cloned());
    args.push("-S".to_string());
    args.push(source_dir.display().to_string());
    args.push("-B".to_string());
    args.push(build_dir.display().to_string());

    run_cmake(&args, |code, stderr| CmakeError::ConfigureFailed { code, stderr }).await
}

/// Build a configured build tree with the given parallelism.
pub async fn build(build_dir: &Path, jobs: u32) -> Result<(), CmakeError> {
    let args = [
        "--build".to_string(),
        build_dir.display().to_string(),
        "--parallel".to_string(),
        jobs.to_string(),
    ];
    run_cmake(&args, |code, stderr| CmakeError::BuildFailed { code, stderr }).await
}

/// Install a built tree into its configured prefix.
pub async fn install(build_dir: &Path) -> Result<(), CmakeError> {
    let args = ["--install".to_string(), build_dir.display().to_string()];
    run_cmake(&args, |code, stderr| CmakeError::InstallFailed { code, stderr }).await
}

async fn run_cmake(
    args: &[String],
    on_failure: impl FnOnce(i32, String) -> CmakeError,
) -> Result<(), CmakeError> {
    tracing::debug!(target: "cmake", "Executing command: cmake {}", args.join(" "));

    let output = Command::new("cmake")
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|error| {
            if error.kind() == std::io::ErrorKind::NotFound {
                CmakeError::NotFound
            } else {
                CmakeError::Io(error)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(on_failure(output.status.code().unwrap_or(-1), stderr));
    }
    Ok(())
}

/// Project identity declared by a `CMakeLists.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectData {
    pub name: String,
    pub version: Option<ProjectVersion>,
}

/// CMake-style project version: dot-separated numeric components.
///
/// Not semver - `1.0`, `2.10.4.1` and similar are all valid. Trailing
/// non-numeric decoration (`1.0-rc1`) is truncated at the first component
/// that does not start with a digit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProjectVersion(Vec<u64>);

impl ProjectVersion {
    /// Parse a version string; `None` when no leading numeric component
    /// exists.
    pub fn parse(text: &str) -> Option<Self> {
        let mut components = Vec::new();
        for part in text.split('.') {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                break;
            }
            components.push(digits.parse().ok()?);
        }
        if components.is_empty() {
            None
        } else {
            Some(Self(components))
        }
    }
}

impl std::fmt::Display for ProjectVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = self
            .0
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{text}")
    }
}

static PROJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bproject\s*\(\s*([A-Za-z0-9_.+-]+)([^)]*)\)")
        .expect("project regex is valid")
});

static INLINE_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bVERSION\s+([0-9][0-9A-Za-z.\-]*)").expect("version regex is valid")
});

static SET_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?im)^\s*set\s*\(\s*[A-Za-z0-9_]*VERSION\s+"?([0-9][0-9A-Za-z.\-]*)"?\s*\)"#)
        .expect("set-version regex is valid")
});

/// Read the declared project name and version from the `CMakeLists.txt` in
/// `source_dir`.
///
/// The version is looked up inline in the `project()` call first, then via
/// a separate `set(..VERSION ..)` assignment anywhere in the file. Returns
/// `Ok(None)` when the file is missing or declares no project; callers
/// decide how fatal that is.
pub fn project_data(source_dir: &Path) -> std::io::Result<Option<ProjectData>> {
    let path = lists_file(source_dir);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)?;
    Ok(parse_project_data(&content))
}

fn parse_project_data(content: &str) -> Option<ProjectData> {
    let captures = PROJECT_RE.captures(content)?;
    let name = captures[1].to_string();
    let arguments = captures.get(2).map_or("", |m| m.as_str());

    let version = INLINE_VERSION_RE
        .captures(arguments)
        .or_else(|| SET_VERSION_RE.captures(content))
        .and_then(|c| ProjectVersion::parse(&c[1]));

    Some(ProjectData { name, version })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_inline_version() {
        let data = parse_project_data("project(MyLib VERSION 1.2.3 LANGUAGES CXX)").unwrap();
        assert_eq!(data.name, "MyLib");
        assert_eq!(data.version, ProjectVersion::parse("1.2.3"));
    }

    #[test]
    fn parses_multiline_project_call() {
        let content = "cmake_minimum_required(VERSION 3.10)\n\
                       project(\n    MyLib\n    DESCRIPTION \"a lib\"\n    VERSION 2.0\n)\n";
        let data = parse_project_data(content).unwrap();
        assert_eq!(data.name, "MyLib");
        assert_eq!(data.version, ProjectVersion::parse("2.0"));
    }

    #[test]
    fn falls_back_to_separate_version_assignment() {
        let content = "project(MyLib LANGUAGES CXX)\n\
                       set(SOME_OTHER_FLAG ON)\n\
                       set(MYLIB_VERSION \"3.1.4\")\n";
        let data = parse_project_data(content).unwrap();
        assert_eq!(data.version, ProjectVersion::parse("3.1.4"));
    }

    #[test]
    fn name_without_any_version() {
        let data = parse_project_data("project(Bare)").unwrap();
        assert_eq!(data.name, "Bare");
        assert_eq!(data.version, None);
    }

    #[test]
    fn no_project_call_yields_none() {
        assert!(parse_project_data("add_subdirectory(src)").is_none());
        assert!(parse_project_data("").is_none());
    }

    #[test]
    fn cmake_minimum_required_version_is_not_a_project() {
        // the VERSION inside cmake_minimum_required must not leak into the
        // project version when project() itself has none
        let content = "cmake_minimum_required(VERSION 3.10)\nproject(Lib)\n";
        let data = parse_project_data(content).unwrap();
        assert_eq!(data.name, "Lib");
        assert_eq!(data.version, None);
    }

    #[test]
    fn version_parse_is_tolerant() {
        assert_eq!(ProjectVersion::parse("1.0"), Some(ProjectVersion(vec![1, 0])));
        assert_eq!(
            ProjectVersion::parse("2.10.4.1"),
            Some(ProjectVersion(vec![2, 10, 4, 1]))
        );
        assert_eq!(ProjectVersion::parse("1.0-rc1"), Some(ProjectVersion(vec![1, 0])));
        assert_eq!(ProjectVersion::parse("abc"), None);
    }

    #[test]
    fn versions_compare_by_components() {
        assert_eq!(ProjectVersion::parse("1.0"), ProjectVersion::parse("1.0"));
        assert_ne!(ProjectVersion::parse("1.0"), ProjectVersion::parse("2.0"));
        assert!(ProjectVersion::parse("1.2") < ProjectVersion::parse("1.10"));
    }

    #[test]
    fn missing_lists_file_is_none() {
        let temp = tempfile::TempDir::new().unwrap();
        assert_eq!(project_data(temp.path()).unwrap(), None);
    }

    #[tokio::test]
    async fn probe_reports_missing_cmake_clearly() {
        // The probe either succeeds (cmake installed) or fails with the
        // NotFound variant; anything else is a bug.
        match ensure_cmake_available().await {
            Ok(()) => {}
            Err(CmakeError::NotFound) => {}
            Err(other) => panic!("unexpected probe error: {other}"),
        }
    }
}
