// src/settings/finder.rs

//! Settings file discovery.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::params::BuildParams;

/// Settings file name looked for during discovery.
pub const SETTINGS_FILE_NAME: &str = "Gantry-settings.toml";

/// Locates the settings root for an invocation.
///
/// `find` must run before `settings_dir`/`settings_file` are meaningful.
pub trait SettingsFinder {
    fn find(&mut self, params: &BuildParams) -> Result<()>;

    /// Directory the build is rooted at: where the settings file was found,
    /// or the invocation directory when there is none.
    fn settings_dir(&self) -> &Path;

    /// The located settings file, if any.
    fn settings_file(&self) -> Option<&Path>;
}

/// Default finder: checks the invocation directory and, when
/// `params.search_upwards` is set, every parent directory above it.
#[derive(Debug)]
pub struct DefaultSettingsFinder {
    fs: Arc<dyn FileSystem>,
    settings_dir: PathBuf,
    settings_file: Option<PathBuf>,
}

impl DefaultSettingsFinder {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            settings_dir: PathBuf::new(),
            settings_file: None,
        }
    }
}

impl SettingsFinder for DefaultSettingsFinder {
    fn find(&mut self, params: &BuildParams) -> Result<()> {
        let mut dir = params.current_dir.clone();

        loop {
            let candidate = dir.join(SETTINGS_FILE_NAME);
            if self.fs.is_file(&candidate) {
                debug!(file = ?candidate, "settings file found");
                self.settings_dir = dir;
                self.settings_file = Some(candidate);
                return Ok(());
            }

            if !params.search_upwards {
                break;
            }
            match dir.parent() {
                Some(parent) => dir = parent.to_path_buf(),
                None => break,
            }
        }

        // No settings file anywhere: single-project build rooted at the
        // invocation directory.
        debug!(dir = ?params.current_dir, "no settings file; using invocation dir");
        self.settings_dir = params.current_dir.clone();
        self.settings_file = None;
        Ok(())
    }

    fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }

    fn settings_file(&self) -> Option<&Path> {
        self.settings_file.as_deref()
    }
}
