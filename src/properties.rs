// src/properties.rs

//! Layered build property loading.
//!
//! Properties are flat `key = "value"` TOML tables named
//! `Gantry-properties.toml`. Three layers contribute, later wins:
//!
//! 1. the gantry home directory (user-level defaults)
//! 2. the settings root directory (per-build overrides)
//! 3. `GANTRY_PROP_*` environment variables (prefix stripped)
//!
//! The loader only *produces* the merged mapping. Exposing `sys.`-prefixed
//! entries process-wide is a separate, named orchestrator step (see
//! [`crate::sysconfig`]) so the global mutation never hides in here.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::params::BuildParams;

/// Properties file name, looked up in the home dir and the settings root.
pub const PROPERTIES_FILE_NAME: &str = "Gantry-properties.toml";

/// Environment variables with this prefix contribute properties.
pub const ENV_PROP_PREFIX: &str = "GANTRY_PROP_";

/// Loads the layered property mapping for a build.
pub trait PropertiesLoader {
    /// Load and merge all property layers for the given settings root.
    fn load_properties(&mut self, settings_root: &Path, params: &BuildParams) -> Result<()>;

    /// The mapping produced by the last [`load_properties`](Self::load_properties) call.
    fn properties(&self) -> &BTreeMap<String, String>;
}

/// Default loader reading through the [`FileSystem`] seam.
#[derive(Debug)]
pub struct DefaultPropertiesLoader {
    fs: Arc<dyn FileSystem>,
    environment: BTreeMap<String, String>,
    properties: BTreeMap<String, String>,
}

impl DefaultPropertiesLoader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::with_environment(fs, std::env::vars().collect())
    }

    /// Construct with an explicit environment snapshot instead of the
    /// process environment. Used by tests.
    pub fn with_environment(fs: Arc<dyn FileSystem>, environment: BTreeMap<String, String>) -> Self {
        Self {
            fs,
            environment,
            properties: BTreeMap::new(),
        }
    }

    fn merge_file(&self, dir: &Path, into: &mut BTreeMap<String, String>) -> Result<()> {
        let path = dir.join(PROPERTIES_FILE_NAME);
        if !self.fs.is_file(&path) {
            debug!(path = ?path, "no properties file");
            return Ok(());
        }
        let contents = self.fs.read_to_string(&path)?;
        let parsed: BTreeMap<String, String> = toml::from_str(&contents)?;
        debug!(path = ?path, count = parsed.len(), "merged properties file");
        into.extend(parsed);
        Ok(())
    }
}

impl PropertiesLoader for DefaultPropertiesLoader {
    fn load_properties(&mut self, settings_root: &Path, params: &BuildParams) -> Result<()> {
        let mut merged = BTreeMap::new();

        self.merge_file(&params.gantry_home_dir, &mut merged)?;
        self.merge_file(settings_root, &mut merged)?;

        for (key, value) in &self.environment {
            if let Some(stripped) = key.strip_prefix(ENV_PROP_PREFIX) {
                merged.insert(stripped.to_string(), value.clone());
            }
        }

        debug!(count = merged.len(), "build properties loaded");
        self.properties = merged;
        Ok(())
    }

    fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}
