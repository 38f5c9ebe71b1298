// src/project/loader.rs

//! Project hierarchy construction.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{GantryError, Result};
use crate::fs::FileSystem;
use crate::params::BuildParams;
use crate::project::build_file::{BuildFile, RawBuildFile};
use crate::project::{ProjectId, ProjectTree};
use crate::properties::ENV_PROP_PREFIX;
use crate::settings::{ImportRoots, Settings};
use crate::sysconfig::SYSTEM_PROP_PREFIX;

/// Builds the project hierarchy for a build.
///
/// Every call produces a fresh [`ProjectTree`]; the orchestrator re-fetches
/// root and current from the new tree after any reload.
pub trait ProjectsLoader {
    #[allow(clippy::too_many_arguments)]
    fn load(
        &mut self,
        settings: &Settings,
        imports: &ImportRoots,
        params: &BuildParams,
        properties: &BTreeMap<String, String>,
        system_config: &BTreeMap<String, String>,
        environment: &BTreeMap<String, String>,
    ) -> Result<ProjectTree>;
}

/// Default loader reading build files through the [`FileSystem`] seam.
#[derive(Debug)]
pub struct DefaultProjectsLoader {
    fs: Arc<dyn FileSystem>,
}

impl DefaultProjectsLoader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Parse a project's build file, merging imported task tables.
    ///
    /// Project-local tasks win over imported ones; imports of imports are
    /// not followed.
    fn read_build_file(
        &self,
        dir: &Path,
        build_file_name: &str,
        imports: &ImportRoots,
    ) -> Result<Option<BuildFile>> {
        let path = dir.join(build_file_name);
        if !self.fs.is_file(&path) {
            debug!(path = ?path, "project has no build file");
            return Ok(None);
        }

        let contents = self.fs.read_to_string(&path)?;
        let mut raw: RawBuildFile = toml::from_str(&contents)?;

        for import in std::mem::take(&mut raw.import) {
            let Some(import_path) = imports.resolve(&import, |p| self.fs.is_file(p)) else {
                return Err(GantryError::ConfigError(format!(
                    "build file {:?} imports '{}', which matches no file in the import roots",
                    path, import
                )));
            };
            let imported: RawBuildFile = toml::from_str(&self.fs.read_to_string(&import_path)?)?;
            debug!(path = ?import_path, tasks = imported.task.len(), "merged import");
            for (name, task) in imported.task {
                raw.task.entry(name).or_insert(task);
            }
        }

        Ok(Some(BuildFile::try_from(raw)?))
    }

    /// Project properties, lowest to highest precedence: unprefixed loaded
    /// properties, `GANTRY_PROP_*` environment entries, `-P` overrides.
    fn project_properties(
        params: &BuildParams,
        properties: &BTreeMap<String, String>,
        environment: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let sys_prefix = format!("{SYSTEM_PROP_PREFIX}.");
        let mut merged: BTreeMap<String, String> = properties
            .iter()
            .filter(|(key, _)| !key.starts_with(&sys_prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        for (key, value) in environment {
            if let Some(stripped) = key.strip_prefix(ENV_PROP_PREFIX) {
                merged.insert(stripped.to_string(), value.clone());
            }
        }
        merged.extend(params.project_properties.clone());
        merged
    }
}

impl ProjectsLoader for DefaultProjectsLoader {
    fn load(
        &mut self,
        settings: &Settings,
        imports: &ImportRoots,
        params: &BuildParams,
        properties: &BTreeMap<String, String>,
        system_config: &BTreeMap<String, String>,
        environment: &BTreeMap<String, String>,
    ) -> Result<ProjectTree> {
        let root_dir = settings.root_dir().to_path_buf();
        let root_name = root_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "root".to_string());

        let mut tree = ProjectTree::new(root_name, root_dir.clone());
        tree.set_system_config(system_config.clone());

        let root = tree.root_id();
        for include in settings.include() {
            let dir = root_dir.join(include);
            if !self.fs.is_dir(&dir) {
                warn!(dir = ?dir, "included project directory does not exist");
            }
            let name = Path::new(include)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| include.clone());
            tree.add_project(root, name, format!(":{include}"), dir);
        }

        let shared_properties = Self::project_properties(params, properties, environment);
        let ids: Vec<ProjectId> = tree.projects().map(|project| project.id).collect();
        for id in ids {
            let dir = tree.project(id).dir.clone();
            let build_file = self.read_build_file(&dir, &params.build_file_name, imports)?;
            let project = tree.project_mut(id);
            project.build_file = build_file;
            project.properties = shared_properties.clone();
        }

        let current = tree.project_nearest_dir(&params.current_dir);
        tree.set_current(current);

        debug!(
            projects = tree.len(),
            current = %tree.current_project().path,
            "project hierarchy loaded"
        );
        Ok(tree)
    }
}
