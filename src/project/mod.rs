// src/project/mod.rs

//! In-memory project hierarchy.
//!
//! A [`ProjectTree`] is the result of one `ProjectsLoader::load` call: the
//! root project, its descendants, and a distinguished "current" project (the
//! one nearest the invocation directory). A reload after a structural change
//! produces a whole new tree; nothing holds references into an old one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::project::build_file::BuildFile;

pub mod build_file;
pub mod loader;

pub use loader::{DefaultProjectsLoader, ProjectsLoader};

/// Index of a project within its [`ProjectTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectId(pub usize);

/// A configured task. Materialized by the build configurer from the owning
/// project's build file.
#[derive(Debug, Clone)]
pub struct Task {
    pub name: String,
    pub project: ProjectId,
    pub cmd: Option<String>,
    /// Same-project tasks that must run first.
    pub after: Vec<String>,
    pub description: Option<String>,
    /// Whether executing this task may change the project/task graph on
    /// disk, requiring a reload before the next task set.
    pub restructures: bool,
}

/// Reference to a task within a [`ProjectTree`]. One requested task name
/// resolves to a set of these (same-named tasks can exist in several
/// projects of the hierarchy).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskRef {
    pub project: ProjectId,
    pub name: String,
}

/// One project in the hierarchy.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Display path: `:` for the root, `:<include-entry>` for children.
    pub path: String,
    pub dir: PathBuf,
    pub parent: Option<ProjectId>,
    pub children: Vec<ProjectId>,
    pub properties: BTreeMap<String, String>,
    pub default_tasks: Vec<String>,
    pub tasks: BTreeMap<String, Task>,
    /// Parsed build file, if the project has one. Consumed by the
    /// configurer when materializing tasks.
    pub build_file: Option<BuildFile>,
}

impl Project {
    fn new(id: ProjectId, name: String, path: String, dir: PathBuf, parent: Option<ProjectId>) -> Self {
        Self {
            id,
            name,
            path,
            dir,
            parent,
            children: Vec::new(),
            properties: BTreeMap::new(),
            default_tasks: Vec::new(),
            tasks: BTreeMap::new(),
            build_file: None,
        }
    }
}

/// The project hierarchy produced by one load.
#[derive(Debug)]
pub struct ProjectTree {
    projects: Vec<Project>,
    root: ProjectId,
    current: ProjectId,
    /// Snapshot of the process-wide configuration registry at load time,
    /// exposed to task commands by the executer.
    system_config: BTreeMap<String, String>,
}

impl ProjectTree {
    /// Start a tree with a root project at `dir`.
    pub fn new(name: impl Into<String>, dir: PathBuf) -> Self {
        let root = ProjectId(0);
        Self {
            projects: vec![Project::new(root, name.into(), ":".to_string(), dir, None)],
            root,
            current: root,
            system_config: BTreeMap::new(),
        }
    }

    /// Add a child project under `parent`, returning its id.
    pub fn add_project(
        &mut self,
        parent: ProjectId,
        name: impl Into<String>,
        path: impl Into<String>,
        dir: PathBuf,
    ) -> ProjectId {
        let id = ProjectId(self.projects.len());
        self.projects
            .push(Project::new(id, name.into(), path.into(), dir, Some(parent)));
        self.projects[parent.0].children.push(id);
        id
    }

    pub fn root_id(&self) -> ProjectId {
        self.root
    }

    pub fn current_id(&self) -> ProjectId {
        self.current
    }

    pub fn set_current(&mut self, id: ProjectId) {
        self.current = id;
    }

    pub fn root_project(&self) -> &Project {
        &self.projects[self.root.0]
    }

    pub fn current_project(&self) -> &Project {
        &self.projects[self.current.0]
    }

    pub fn project(&self, id: ProjectId) -> &Project {
        &self.projects[id.0]
    }

    pub fn project_mut(&mut self, id: ProjectId) -> &mut Project {
        &mut self.projects[id.0]
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn system_config(&self) -> &BTreeMap<String, String> {
        &self.system_config
    }

    pub fn set_system_config(&mut self, config: BTreeMap<String, String>) {
        self.system_config = config;
    }

    /// Ids of `start` and all its descendants, breadth-first. Children keep
    /// their insertion order (the settings file's include order), so the
    /// walk is deterministic.
    pub fn subtree(&self, start: ProjectId) -> Vec<ProjectId> {
        let mut order = vec![start];
        let mut index = 0;
        while index < order.len() {
            let id = order[index];
            order.extend(self.projects[id.0].children.iter().copied());
            index += 1;
        }
        order
    }

    /// Resolve a task name within the subtree rooted at `start` (the current
    /// project, for a build). Deterministic: the same tree and name always
    /// yield the same refs in the same order. An empty result is the
    /// caller's unknown-task condition.
    pub fn tasks_by_name(&self, start: ProjectId, name: &str) -> Vec<TaskRef> {
        self.subtree(start)
            .into_iter()
            .filter(|id| self.projects[id.0].tasks.contains_key(name))
            .map(|project| TaskRef {
                project,
                name: name.to_string(),
            })
            .collect()
    }

    /// The project whose directory is nearest to (an ancestor of, or equal
    /// to) `dir`. Falls back to the root when nothing matches.
    pub fn project_nearest_dir(&self, dir: &Path) -> ProjectId {
        self.projects
            .iter()
            .filter(|project| dir.starts_with(&project.dir))
            .max_by_key(|project| project.dir.components().count())
            .map(|project| project.id)
            .unwrap_or(self.root)
    }
}
