// src/settings/processor.rs

//! Settings processing: turning a located settings root into a [`Settings`]
//! model, either by parsing the discovered settings file or in "basic"
//! single-project mode.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::params::BuildParams;
use crate::settings::finder::SettingsFinder;
use crate::settings::{RawSettingsFile, Settings, SettingsProvenance};

/// Produces the [`Settings`] model for a build.
pub trait SettingsProcessor {
    /// Full processing: run discovery via the finder, parse the settings
    /// file when one was found.
    fn process(
        &mut self,
        finder: &mut dyn SettingsFinder,
        params: &BuildParams,
    ) -> Result<Settings>;

    /// Basic mode for embedded/non-recursive invocations: a single project
    /// rooted at the located settings dir, no settings file consulted.
    fn basic_settings(
        &mut self,
        finder: &mut dyn SettingsFinder,
        params: &BuildParams,
    ) -> Result<Settings>;
}

/// Default processor reading through the [`FileSystem`] seam.
#[derive(Debug)]
pub struct DefaultSettingsProcessor {
    fs: Arc<dyn FileSystem>,
}

impl DefaultSettingsProcessor {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Import roots shared by both processing modes: dirs declared in the
    /// settings file (already resolved by the caller), then per-invocation
    /// extras, then the home-level `imports` directory when it exists.
    fn shared_import_dirs(&self, params: &BuildParams) -> Vec<PathBuf> {
        let mut dirs = params.import_dirs.clone();
        let home_imports = params.gantry_home_dir.join("imports");
        if self.fs.is_dir(&home_imports) {
            dirs.push(home_imports);
        }
        dirs
    }
}

impl SettingsProcessor for DefaultSettingsProcessor {
    fn process(
        &mut self,
        finder: &mut dyn SettingsFinder,
        params: &BuildParams,
    ) -> Result<Settings> {
        finder.find(params)?;
        let root_dir = finder.settings_dir().to_path_buf();

        let Some(settings_file) = finder.settings_file() else {
            debug!(root = ?root_dir, "no settings file; single-project settings");
            return Ok(Settings::new(
                root_dir,
                Vec::new(),
                self.shared_import_dirs(params),
                SettingsProvenance::Discovered,
            ));
        };

        let contents = self.fs.read_to_string(settings_file)?;
        let raw: RawSettingsFile = toml::from_str(&contents)?;
        raw.validate()?;

        let mut import_dirs: Vec<PathBuf> = raw
            .settings
            .import_dirs
            .iter()
            .map(|dir| root_dir.join(dir))
            .collect();
        import_dirs.extend(self.shared_import_dirs(params));

        debug!(
            root = ?root_dir,
            subprojects = raw.settings.include.len(),
            "settings processed"
        );
        Ok(Settings::new(
            root_dir,
            raw.settings.include,
            import_dirs,
            SettingsProvenance::Discovered,
        ))
    }

    fn basic_settings(
        &mut self,
        finder: &mut dyn SettingsFinder,
        params: &BuildParams,
    ) -> Result<Settings> {
        finder.find(params)?;
        let root_dir = finder.settings_dir().to_path_buf();
        debug!(root = ?root_dir, "basic single-project settings");
        Ok(Settings::new(
            root_dir,
            Vec::new(),
            self.shared_import_dirs(params),
            SettingsProvenance::Basic,
        ))
    }
}
