// src/params.rs

//! Immutable description of one build invocation.
//!
//! A [`BuildParams`] value is constructed once (by the CLI or an embedding
//! caller) and handed to every collaborator for the duration of a build.
//! Nothing mutates it mid-run; the single-project entry points derive a
//! *copy* with upward search forced off via [`BuildParams::with_search_upwards`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default per-project build file name, overridable per invocation.
pub const DEFAULT_BUILD_FILE_NAME: &str = "Gantry.toml";

/// Parameters for a single build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildParams {
    /// Requested task names, in request order. Empty means "use the current
    /// project's default tasks".
    pub task_names: Vec<String>,

    /// Directory the build was invoked from. The "current" project is the
    /// project nearest this directory.
    pub current_dir: PathBuf,

    /// Whether settings discovery may walk parent directories.
    pub search_upwards: bool,

    /// The gantry home directory (user-level properties, shared imports).
    pub gantry_home_dir: PathBuf,

    /// `-D key=value` overrides, published to the process-wide configuration
    /// registry at the start of the build.
    pub system_properties: BTreeMap<String, String>,

    /// `-P key=value` overrides, applied to every loaded project's
    /// properties (they win over file- and environment-sourced properties).
    pub project_properties: BTreeMap<String, String>,

    /// Name of the per-project build file.
    pub build_file_name: String,

    /// Extra directories searched for shared task definition files, in
    /// addition to the ones the settings model contributes.
    pub import_dirs: Vec<PathBuf>,
}

impl BuildParams {
    /// Minimal params rooted at `current_dir`, everything else defaulted.
    pub fn new(current_dir: impl Into<PathBuf>, gantry_home_dir: impl Into<PathBuf>) -> Self {
        Self {
            task_names: Vec::new(),
            current_dir: current_dir.into(),
            search_upwards: true,
            gantry_home_dir: gantry_home_dir.into(),
            system_properties: BTreeMap::new(),
            project_properties: BTreeMap::new(),
            build_file_name: DEFAULT_BUILD_FILE_NAME.to_string(),
            import_dirs: Vec::new(),
        }
    }

    /// Derive a copy with the upward-search flag replaced.
    ///
    /// The single-project entry points use this to force `false` no matter
    /// what the caller asked for.
    pub fn with_search_upwards(&self, search_upwards: bool) -> Self {
        Self {
            search_upwards,
            ..self.clone()
        }
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }
}
