// src/configure.rs

//! Build configuration: turning parsed build files into configured projects.

use tracing::{debug, info};

use crate::errors::Result;
use crate::project::{ProjectId, ProjectTree, Task};

/// Applies build configuration across a loaded hierarchy.
pub trait BuildConfigurer {
    /// Configure every project: materialize tasks from its build file and
    /// set its default task list. Runs again after every reload.
    fn process(&mut self, tree: &mut ProjectTree) -> Result<()>;

    /// Configure the hierarchy for task listing instead of execution.
    ///
    /// `recursive = false` limits the reported scope to the current
    /// project; the hierarchy is still fully configured either way.
    fn task_list(&mut self, tree: &mut ProjectTree, recursive: bool, current: ProjectId)
    -> Result<()>;
}

/// Default configurer.
#[derive(Debug, Default)]
pub struct DefaultBuildConfigurer;

impl DefaultBuildConfigurer {
    pub fn new() -> Self {
        Self
    }

    fn configure_project(tree: &mut ProjectTree, id: ProjectId) {
        let project = tree.project_mut(id);
        project.tasks.clear();

        let Some(build_file) = project.build_file.clone() else {
            project.default_tasks.clear();
            return;
        };

        for (name, config) in &build_file.task {
            project.tasks.insert(
                name.clone(),
                Task {
                    name: name.clone(),
                    project: id,
                    cmd: config.cmd.clone(),
                    after: config.after.clone(),
                    description: config.description.clone(),
                    restructures: config.restructures,
                },
            );
        }
        project.default_tasks = build_file.default_tasks.clone();

        debug!(
            project = %project.path,
            tasks = project.tasks.len(),
            "project configured"
        );
    }
}

impl BuildConfigurer for DefaultBuildConfigurer {
    fn process(&mut self, tree: &mut ProjectTree) -> Result<()> {
        // Parents before children, so conventions established higher up are
        // visible below if this ever grows inheritance.
        for id in tree.subtree(tree.root_id()) {
            Self::configure_project(tree, id);
        }
        Ok(())
    }

    fn task_list(
        &mut self,
        tree: &mut ProjectTree,
        recursive: bool,
        current: ProjectId,
    ) -> Result<()> {
        self.process(tree)?;

        let scope = if recursive {
            tree.subtree(tree.root_id())
        } else {
            vec![current]
        };

        for id in scope {
            let project = tree.project(id);
            let marker = if id == current { " (current)" } else { "" };
            info!(project = %format!("{}{}", project.path, marker), "tasks:");
            for task in project.tasks.values() {
                match &task.description {
                    Some(description) => info!("  {} - {}", task.name, description),
                    None => info!("  {}", task.name),
                }
            }
            if !project.default_tasks.is_empty() {
                info!("  default tasks: {:?}", project.default_tasks);
            }
        }
        Ok(())
    }
}
