// src/settings/mod.rs

//! Settings model: the build's project topology.
//!
//! A `Gantry-settings.toml` at the build root declares which directories are
//! subprojects and where shared task definitions live:
//!
//! ```toml
//! [settings]
//! include = ["core", "cli"]
//! import_dirs = ["imports"]
//! ```
//!
//! Both sections are optional; a missing or empty file describes a
//! single-project build.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{GantryError, Result};

pub mod finder;
pub mod processor;

pub use finder::{DefaultSettingsFinder, SETTINGS_FILE_NAME, SettingsFinder};
pub use processor::{DefaultSettingsProcessor, SettingsProcessor};

/// How a [`Settings`] value was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsProvenance {
    /// Full processing: settings file discovery (possibly upward search).
    Discovered,
    /// Basic mode: single project rooted at the invocation directory,
    /// no settings file consulted.
    Basic,
}

/// Model of the build's project topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    root_dir: PathBuf,
    include: Vec<String>,
    import_dirs: Vec<PathBuf>,
    provenance: SettingsProvenance,
}

impl Settings {
    pub fn new(
        root_dir: PathBuf,
        include: Vec<String>,
        import_dirs: Vec<PathBuf>,
        provenance: SettingsProvenance,
    ) -> Self {
        Self {
            root_dir,
            include,
            import_dirs,
            provenance,
        }
    }

    /// Single-project settings rooted at `root_dir`, nothing included.
    pub fn single_project(root_dir: PathBuf, provenance: SettingsProvenance) -> Self {
        Self::new(root_dir, Vec::new(), Vec::new(), provenance)
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Relative directories of included subprojects.
    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn provenance(&self) -> SettingsProvenance {
        self.provenance
    }

    /// Directories searched for shared task definition files referenced by
    /// build files via `import = [...]`. This is the value threaded into
    /// [`crate::project::loader::ProjectsLoader::load`].
    pub fn import_roots(&self) -> ImportRoots {
        ImportRoots {
            dirs: self.import_dirs.clone(),
        }
    }
}

/// Resolved search path for shared task definition files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRoots {
    pub dirs: Vec<PathBuf>,
}

impl ImportRoots {
    /// Resolve an `import = ["name"]` reference to an existing file.
    ///
    /// `name` may omit the `.toml` extension.
    pub fn resolve(&self, name: &str, exists: impl Fn(&Path) -> bool) -> Option<PathBuf> {
        let file_name = if name.ends_with(".toml") {
            name.to_string()
        } else {
            format!("{name}.toml")
        };
        self.dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| exists(candidate))
    }
}

/// Raw settings file as deserialized from TOML, before validation.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSettingsFile {
    #[serde(default)]
    pub settings: SettingsSection,
}

/// `[settings]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SettingsSection {
    /// Relative directories of subprojects.
    #[serde(default)]
    pub include: Vec<String>,

    /// Relative directories searched for shared task definition files.
    #[serde(default)]
    pub import_dirs: Vec<String>,
}

impl RawSettingsFile {
    pub fn validate(&self) -> Result<()> {
        for entry in &self.settings.include {
            if entry.is_empty() {
                return Err(GantryError::ConfigError(
                    "[settings].include entries must be non-empty".to_string(),
                ));
            }
            if Path::new(entry).is_absolute() {
                return Err(GantryError::ConfigError(format!(
                    "[settings].include entry '{entry}' must be a relative path"
                )));
            }
        }
        for entry in &self.settings.import_dirs {
            if Path::new(entry).is_absolute() {
                return Err(GantryError::ConfigError(format!(
                    "[settings].import_dirs entry '{entry}' must be a relative path"
                )));
            }
        }
        Ok(())
    }
}
