//! `depcmake.yaml` loading and validation.
//!
//! The configuration file is one YAML mapping with a mandatory
//! `dependencies` key holding the declared dependency list. The same loader
//! serves the project's own file and the nested files discovered inside
//! fetched dependencies during expansion; a nested file failing validation
//! raises the same [`IncorrectConfig`] as a top-level one.
//!
//! ```yaml
//! dependencies:
//!   - name: My library
//!     url: https://example.com/my-library.git
//!     git_hash: v2.1.0
//!     cmake_args: -DBUILD_SHARED_LIBS=ON
//! ```
//!
//! [`IncorrectConfig`]: DepcmakeError::IncorrectConfig

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::DepcmakeError;

/// Configuration file name, looked up in the project directory and in every
/// fetched dependency.
pub const CONFIG_NAME: &str = "depcmake.yaml";

/// Starter configuration written by `depcmake init`.
pub const CONFIG_TEMPLATE: &str = r#"# Dependencies of this project, set up by depcmake.
#
# Each entry supports:
#   name:          display name (required)
#   url:           git repository, remote archive, local folder (file://...)
#                  or local archive (required)
#   git_hash:      revision to check out after cloning (optional)
#   git_no_update: do not update an already-cloned repository (optional)
#   cmake_subdir:  subdirectory containing the CMakeLists.txt (optional)
#   cmake_args:    extra arguments for the configure step (optional)
#   jobs:          parallel jobs when building this dependency (optional)

dependencies:
#  - name: My library
#    url: https://example.com/my-library.git
#    git_hash: v2.1.0
#    cmake_args: -DBUILD_SHARED_LIBS=ON
"#;

/// Parsed configuration file.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub dependencies: Vec<DependencyDecl>,
}

/// One declared dependency, as written in `depcmake.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyDecl {
    /// Display name
    pub name: String,
    /// Source URL
    pub url: String,
    /// Revision pin, checked out after clone
    #[serde(default)]
    pub git_hash: Option<String>,
    /// Suppress updating an already-cloned repository
    #[serde(default)]
    pub git_no_update: bool,
    /// Subdirectory of the fetched tree holding the CMakeLists.txt
    #[serde(default)]
    pub cmake_subdir: Option<PathBuf>,
    /// Free-form arguments appended to the configure invocation
    #[serde(default)]
    pub cmake_args: Option<String>,
    /// Parallelism hint for this dependency's build
    #[serde(default)]
    pub jobs: Option<u32>,
}

/// Load and validate the configuration file in `dir`.
///
/// A missing file is [`DepcmakeError::ConfigNotFound`] - fatal at the top
/// level, and the expander's termination signal during discovery. A file
/// without a `dependencies` key, or with declarations that do not match
/// [`DependencyDecl`], is [`DepcmakeError::IncorrectConfig`]. An empty
/// (null) `dependencies` key is a valid empty list.
pub fn load(dir: &Path) -> Result<Config, DepcmakeError> {
    let path = dir.join(CONFIG_NAME);
    if !path.exists() {
        return Err(DepcmakeError::ConfigNotFound {
            path: dir.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(&path)?;
    let value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|error| DepcmakeError::IncorrectConfig {
            reason: error.to_string(),
        })?;

    let dependencies = value
        .get("dependencies")
        .ok_or_else(|| DepcmakeError::IncorrectConfig {
            reason: "key 'dependencies' missing from config".to_string(),
        })?;

    let dependencies = if dependencies.is_null() {
        Vec::new()
    } else {
        serde_yaml::from_value(dependencies.clone()).map_err(|error| {
            DepcmakeError::IncorrectConfig {
                reason: error.to_string(),
            }
        })?
    };

    Ok(Config { dependencies })
}

/// Write the starter configuration into `dir`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn create(dir: &Path, force: bool) -> Result<(), DepcmakeError> {
    let path = dir.join(CONFIG_NAME);
    if path.exists() && !force {
        return Err(DepcmakeError::IncorrectConfig {
            reason: format!("{CONFIG_NAME} already exists, pass --force to overwrite"),
        });
    }
    std::fs::write(&path, CONFIG_TEMPLATE)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) {
        std::fs::write(dir.join(CONFIG_NAME), content).unwrap();
    }

    #[test]
    fn loads_full_declaration() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            "dependencies:\n\
             \x20 - name: My library\n\
             \x20   url: https://example.com/lib.git\n\
             \x20   git_hash: v1.0\n\
             \x20   git_no_update: true\n\
             \x20   cmake_subdir: sub/dir\n\
             \x20   cmake_args: -DX=ON -DY=OFF\n\
             \x20   jobs: 4\n",
        );

        let config = load(temp.path()).unwrap();
        assert_eq!(config.dependencies.len(), 1);
        let decl = &config.dependencies[0];
        assert_eq!(decl.name, "My library");
        assert_eq!(decl.git_hash.as_deref(), Some("v1.0"));
        assert!(decl.git_no_update);
        assert_eq!(decl.cmake_subdir, Some(PathBuf::from("sub/dir")));
        assert_eq!(decl.jobs, Some(4));
    }

    #[test]
    fn missing_file_is_config_not_found() {
        let temp = TempDir::new().unwrap();
        let error = load(temp.path()).unwrap_err();
        assert!(matches!(error, DepcmakeError::ConfigNotFound { .. }));
    }

    #[test]
    fn missing_dependencies_key_is_incorrect_config() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "something_else: 1\n");
        let error = load(temp.path()).unwrap_err();
        match error {
            DepcmakeError::IncorrectConfig { reason } => {
                assert!(reason.contains("dependencies"));
            }
            other => panic!("expected IncorrectConfig, got {other}"),
        }
    }

    #[test]
    fn null_dependencies_is_an_empty_list() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "dependencies:\n");
        assert!(load(temp.path()).unwrap().dependencies.is_empty());
    }

    #[test]
    fn unknown_declaration_field_is_rejected() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            "dependencies:\n  - name: A\n    url: file:///a\n    shiny: yes\n",
        );
        assert!(matches!(
            load(temp.path()),
            Err(DepcmakeError::IncorrectConfig { .. })
        ));
    }

    #[test]
    fn create_respects_existing_file() {
        let temp = TempDir::new().unwrap();
        create(temp.path(), false).unwrap();
        assert!(temp.path().join(CONFIG_NAME).exists());

        // the template itself must load
        assert!(load(temp.path()).unwrap().dependencies.is_empty());

        assert!(create(temp.path(), false).is_err());
        create(temp.path(), true).unwrap();
    }
}
