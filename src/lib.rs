//! depcmake - dependency manager for CMake-based projects
//!
//! depcmake reads a `depcmake.yaml` file describing the dependencies of a
//! CMake project (git repositories, remote archives, local folders or local
//! archives), fetches them into a shared cache, recursively discovers the
//! dependencies declared by the fetched projects themselves, then configures,
//! builds and installs everything into one shared install prefix.
//!
//! # Architecture Overview
//!
//! The pipeline runs in fixed stages, each requiring the previous one:
//!
//! 1. **Fetch + expand**: declared dependencies are fetched into
//!    `depcmake/fetch/<slug>`; any `depcmake.yaml` found inside a fetched
//!    dependency is expanded in place, dependency-before-dependent, to
//!    arbitrary depth.
//! 2. **Check**: the expanded list is scanned pairwise for diamond
//!    dependencies (same CMake project name, incompatible versions).
//! 3. **Build**: each dependency is configured and built in list order into
//!    `depcmake/build/<slug>`.
//! 4. **Install**: each build tree is installed into the shared prefix,
//!    `depcmake/install` by default.
//!
//! There is no version solver: conflicts are reported, never resolved.
//! Idempotence comes from on-disk cache presence, not from any lockfile or
//! metadata store - re-running after a failure skips completed work.
//!
//! # Core Modules
//!
//! - [`dependency`] - the dependency unit and ordered dependency list
//! - [`source`] - classification of dependency URLs into source kinds
//! - [`cache`] - deterministic cache layout (fetch/build/install roots)
//! - [`cmake`] - CMake backend invocations and `CMakeLists.txt` metadata
//! - [`git`] - git operations wrapper using the system git command
//! - [`archive`] - archive format capability table and extraction
//! - [`config`] - `depcmake.yaml` loading and validation
//! - [`cli`] - command-line interface
//! - [`core`] - error taxonomy shared by all stages

pub mod archive;
pub mod cache;
pub mod cli;
pub mod cmake;
pub mod config;
pub mod core;
pub mod dependency;
pub mod git;
pub mod source;
pub mod utils;
