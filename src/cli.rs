// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `gantry`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gantry",
    version,
    about = "Project-based build tool: configure a project hierarchy and run tasks.",
    long_about = None
)]
pub struct CliArgs {
    /// Tasks to run, in order. When omitted, the current project's default
    /// tasks run instead.
    #[arg(value_name = "TASK")]
    pub tasks: Vec<String>,

    /// Directory to start the build from.
    #[arg(long, short = 'p', value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Gantry home directory (user properties, shared imports).
    ///
    /// Default: `GANTRY_HOME`, or `~/.gantry`.
    #[arg(long, value_name = "DIR")]
    pub gantry_home: Option<PathBuf>,

    /// Don't search parent directories for the settings file.
    #[arg(long, short = 'u')]
    pub no_search_upward: bool,

    /// Treat the invocation directory as a standalone single project.
    #[arg(long)]
    pub single_project: bool,

    /// List the tasks of the configured hierarchy instead of executing.
    #[arg(long, short = 't')]
    pub task_list: bool,

    /// Name of the per-project build file.
    #[arg(long, value_name = "NAME")]
    pub build_file: Option<String>,

    /// System property override (key=value), published process-wide.
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    pub system_prop: Vec<String>,

    /// Project property override (key=value), applied to every project.
    #[arg(short = 'P', value_name = "KEY=VALUE")]
    pub project_prop: Vec<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GANTRY_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
