#![allow(dead_code)]

use std::path::{Path, PathBuf};

use gantry::params::BuildParams;
use gantry::project::{ProjectId, ProjectTree, Task};

/// Builder for [`BuildParams`] to simplify test setup.
pub struct BuildParamsBuilder {
    params: BuildParams,
}

impl BuildParamsBuilder {
    pub fn new(current_dir: impl AsRef<Path>) -> Self {
        Self {
            params: BuildParams::new(current_dir.as_ref(), PathBuf::from("/gantry-home")),
        }
    }

    pub fn tasks(mut self, names: &[&str]) -> Self {
        self.params.task_names = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn search_upwards(mut self, val: bool) -> Self {
        self.params.search_upwards = val;
        self
    }

    pub fn gantry_home(mut self, dir: impl AsRef<Path>) -> Self {
        self.params.gantry_home_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn system_prop(mut self, key: &str, value: &str) -> Self {
        self.params
            .system_properties
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn project_prop(mut self, key: &str, value: &str) -> Self {
        self.params
            .project_properties
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn build_file_name(mut self, name: &str) -> Self {
        self.params.build_file_name = name.to_string();
        self
    }

    pub fn build(self) -> BuildParams {
        self.params
    }
}

/// Builder for already-configured [`ProjectTree`]s.
///
/// Fake projects loaders hand these out directly, bypassing the configurer,
/// so orchestrator tests control exactly which tasks resolve.
pub struct ProjectTreeBuilder {
    tree: ProjectTree,
}

impl ProjectTreeBuilder {
    pub fn new(root_dir: impl AsRef<Path>) -> Self {
        let dir = root_dir.as_ref().to_path_buf();
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "root".to_string());
        Self {
            tree: ProjectTree::new(name, dir),
        }
    }

    /// Add a task to the root project.
    pub fn task(self, name: &str) -> Self {
        let root = self.tree.root_id();
        self.task_in(root, name)
    }

    /// Add a task to a specific project.
    pub fn task_in(mut self, project: ProjectId, name: &str) -> Self {
        self.tree.project_mut(project).tasks.insert(
            name.to_string(),
            Task {
                name: name.to_string(),
                project,
                cmd: None,
                after: Vec::new(),
                description: None,
                restructures: false,
            },
        );
        self
    }

    /// Add a child project under the root, returning the builder and its id.
    pub fn subproject(mut self, name: &str) -> (Self, ProjectId) {
        let root = self.tree.root_id();
        let dir = self.tree.root_project().dir.join(name);
        let id = self
            .tree
            .add_project(root, name.to_string(), format!(":{name}"), dir);
        (self, id)
    }

    pub fn default_tasks(mut self, names: &[&str]) -> Self {
        let current = self.tree.current_id();
        self.tree.project_mut(current).default_tasks =
            names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build(self) -> ProjectTree {
        self.tree
    }
}
