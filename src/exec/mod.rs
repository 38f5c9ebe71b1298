// src/exec/mod.rs

//! Task execution layer.
//!
//! The orchestrator only knows the [`BuildExecuter`] seam: "run this task
//! set against this hierarchy, tell me whether the graph must be rebuilt."
//! The default implementation lives in [`executer`]; tests substitute a
//! recording fake.

pub mod executer;

pub use executer::DefaultBuildExecuter;

use crate::errors::Result;
use crate::project::{ProjectTree, TaskRef};

/// Executes one resolved task set.
pub trait BuildExecuter {
    /// Run every task in `task_set` (plus dependencies) against the tree.
    ///
    /// Returns `true` when execution may have altered the project/task
    /// graph on disk, in which case the caller must reload and reconfigure
    /// before executing anything further.
    fn execute(&mut self, task_set: &[TaskRef], tree: &mut ProjectTree) -> Result<bool>;
}
