// src/exec/executer.rs

//! Default task execution: dependency closure, topological order, one shell
//! process per task, strictly sequential.

use std::collections::HashSet;
use std::process::Command;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, info};

use crate::errors::{GantryError, Result};
use crate::exec::BuildExecuter;
use crate::project::{ProjectTree, Task, TaskRef};

/// Environment prefix under which the process-wide configuration snapshot is
/// exposed to task commands.
const SYS_ENV_PREFIX: &str = "GANTRY_SYS_";

#[derive(Debug, Default)]
pub struct DefaultBuildExecuter;

impl DefaultBuildExecuter {
    pub fn new() -> Self {
        Self
    }

    /// Expand the task set with its same-project dependency closure and
    /// return the tasks in execution order.
    fn plan(task_set: &[TaskRef], tree: &ProjectTree) -> Result<Vec<Task>> {
        let mut selected: Vec<TaskRef> = Vec::new();
        let mut seen: HashSet<TaskRef> = HashSet::new();
        let mut pending: Vec<TaskRef> = task_set.to_vec();
        let mut index = 0;

        while index < pending.len() {
            let task_ref = pending[index].clone();
            index += 1;
            if !seen.insert(task_ref.clone()) {
                continue;
            }
            let project = tree.project(task_ref.project);
            let Some(task) = project.tasks.get(&task_ref.name) else {
                return Err(GantryError::ConfigError(format!(
                    "task '{}' disappeared from project '{}' between resolution and execution",
                    task_ref.name, project.path
                )));
            };
            for dep in &task.after {
                pending.push(TaskRef {
                    project: task_ref.project,
                    name: dep.clone(),
                });
            }
            selected.push(task_ref);
        }

        // Edge direction dep -> task; build-file validation already rules
        // out cycles, the sort just produces the order.
        let mut graph: DiGraphMap<(usize, &str), ()> = DiGraphMap::new();
        for task_ref in &selected {
            graph.add_node((task_ref.project.0, task_ref.name.as_str()));
        }
        for task_ref in &selected {
            let task = &tree.project(task_ref.project).tasks[&task_ref.name];
            for dep in &task.after {
                graph.add_edge(
                    (task_ref.project.0, dep.as_str()),
                    (task_ref.project.0, task_ref.name.as_str()),
                    (),
                );
            }
        }

        let order = toposort(&graph, None).map_err(|cycle| {
            GantryError::TaskCycle(format!(
                "cycle in task graph involving '{}'",
                cycle.node_id().1
            ))
        })?;

        Ok(order
            .into_iter()
            .map(|(project, name)| {
                tree.project(crate::project::ProjectId(project)).tasks[name].clone()
            })
            .collect())
    }

    fn run_task(task: &Task, tree: &ProjectTree) -> Result<()> {
        let project = tree.project(task.project);
        let label = format!("{}:{}", project.path.trim_end_matches(':'), task.name);

        let Some(cmd) = &task.cmd else {
            debug!(task = %label, "task has no command; nothing to run");
            return Ok(());
        };

        info!(task = %label, cmd = %cmd, "starting task process");

        // Build a shell command appropriate for the platform.
        let mut command = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(cmd);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(cmd);
            c
        };
        command.current_dir(&project.dir);
        for (key, value) in tree.system_config() {
            command.env(format!("{SYS_ENV_PREFIX}{key}"), value);
        }

        let status = command.status()?;
        let code = status.code().unwrap_or(-1);
        info!(task = %label, exit_code = code, "task process exited");

        if !status.success() {
            return Err(GantryError::TaskFailed { task: label, code });
        }
        Ok(())
    }
}

impl BuildExecuter for DefaultBuildExecuter {
    fn execute(&mut self, task_set: &[TaskRef], tree: &mut ProjectTree) -> Result<bool> {
        let planned = Self::plan(task_set, tree)?;
        debug!(tasks = planned.len(), "execution plan ready");

        for task in &planned {
            Self::run_task(task, tree)?;
        }

        Ok(planned.iter().any(|task| task.restructures))
    }
}
