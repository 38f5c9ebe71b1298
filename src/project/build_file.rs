// src/project/build_file.rs

//! Per-project build file model (`Gantry.toml`).
//!
//! ```toml
//! default_tasks = ["check"]
//! import = ["common"]
//!
//! [task.check]
//! cmd = "cargo check"
//! after = ["fmt"]
//! description = "Type-check everything"
//! ```
//!
//! Deserialization produces a [`RawBuildFile`]; semantic validation (unknown
//! `after` references, cycles) happens in the `TryFrom` conversion to
//! [`BuildFile`], after any imported task tables have been merged in.

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use serde::Deserialize;

use crate::errors::{GantryError, Result};

/// Build file as read from TOML, before validation.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawBuildFile {
    /// Tasks run when the invocation names none.
    #[serde(default)]
    pub default_tasks: Vec<String>,

    /// Names of shared task definition files to merge, resolved against the
    /// build's import roots. Project-local tasks win over imported ones.
    #[serde(default)]
    pub import: Vec<String>,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// Shell command to execute. Tasks without a command act as pure
    /// aggregation points for their dependencies.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Tasks in the same project that must run before this one.
    #[serde(default)]
    pub after: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Marks a task whose command may rewrite build files on disk (e.g. a
    /// generator that adds subprojects). Executing it forces a project
    /// reload before the next task set runs.
    #[serde(default)]
    pub restructures: bool,
}

/// Validated build file.
#[derive(Debug, Clone)]
pub struct BuildFile {
    pub default_tasks: Vec<String>,
    pub task: BTreeMap<String, TaskConfig>,
}

impl BuildFile {
    /// Construct without validation. Callers must have run the checks in
    /// [`TryFrom`] themselves.
    pub fn new_unchecked(default_tasks: Vec<String>, task: BTreeMap<String, TaskConfig>) -> Self {
        Self {
            default_tasks,
            task,
        }
    }
}

impl TryFrom<RawBuildFile> for BuildFile {
    type Error = GantryError;

    fn try_from(raw: RawBuildFile) -> std::result::Result<Self, Self::Error> {
        validate_task_dependencies(&raw)?;
        validate_task_graph(&raw)?;
        Ok(BuildFile::new_unchecked(raw.default_tasks, raw.task))
    }
}

fn validate_task_dependencies(raw: &RawBuildFile) -> Result<()> {
    for (name, task) in raw.task.iter() {
        for dep in task.after.iter() {
            if !raw.task.contains_key(dep) {
                return Err(GantryError::ConfigError(format!(
                    "task '{}' has unknown dependency '{}' in `after`",
                    name, dep
                )));
            }
            if dep == name {
                return Err(GantryError::ConfigError(format!(
                    "task '{}' cannot depend on itself in `after`",
                    name
                )));
            }
        }
    }
    Ok(())
}

fn validate_task_graph(raw: &RawBuildFile) -> Result<()> {
    // Edge direction: dep -> task, so a topological sort fails iff the
    // declared dependencies contain a cycle.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in raw.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in raw.task.iter() {
        for dep in task.after.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(GantryError::TaskCycle(format!(
                "cycle in `after` dependencies involving task '{}'",
                node
            )))
        }
    }
}
