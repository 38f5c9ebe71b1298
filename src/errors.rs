// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GantryError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task '{name}' not found in project '{project}'")]
    UnknownTask { name: String, project: String },

    #[error("Task '{task}' failed with exit code {code}")]
    TaskFailed { task: String, code: i32 },

    #[error("Cycle detected in task graph: {0}")]
    TaskCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, GantryError>;
