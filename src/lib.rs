// src/lib.rs

pub mod build;
pub mod cli;
pub mod configure;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod params;
pub mod project;
pub mod properties;
pub mod settings;
pub mod sysconfig;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use tracing::debug;

use crate::build::Build;
use crate::cli::CliArgs;
use crate::params::{BuildParams, DEFAULT_BUILD_FILE_NAME};

/// High-level entry point used by `main.rs`.
///
/// This turns parsed CLI arguments into [`BuildParams`], wires the default
/// collaborators, and dispatches to the matching lifecycle entry point.
pub fn run(args: CliArgs) -> Result<()> {
    let params = params_from_args(&args)?;
    debug!(?params, "build parameters resolved");

    let mut build = Build::with_defaults();

    let result = match (args.task_list, args.single_project) {
        (true, false) => build.task_list(&params),
        (true, true) => build.task_list_single_project(&params),
        (false, false) => build.run(&params),
        (false, true) => build.run_single_project(&params),
    }?;

    debug!(success = result.is_success(), "build finished");
    Ok(())
}

fn params_from_args(args: &CliArgs) -> Result<BuildParams> {
    let current_dir = if args.project_dir.is_absolute() {
        args.project_dir.clone()
    } else {
        std::env::current_dir()?.join(&args.project_dir)
    };

    let gantry_home = resolve_gantry_home(args)?;

    Ok(BuildParams {
        task_names: args.tasks.clone(),
        current_dir,
        search_upwards: !args.no_search_upward,
        gantry_home_dir: gantry_home,
        system_properties: parse_property_args(&args.system_prop)?,
        project_properties: parse_property_args(&args.project_prop)?,
        build_file_name: args
            .build_file
            .clone()
            .unwrap_or_else(|| DEFAULT_BUILD_FILE_NAME.to_string()),
        import_dirs: Vec::new(),
    })
}

fn resolve_gantry_home(args: &CliArgs) -> Result<PathBuf> {
    if let Some(home) = &args.gantry_home {
        return Ok(home.clone());
    }
    if let Ok(home) = std::env::var("GANTRY_HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir()
        .map(|home| home.join(".gantry"))
        .ok_or_else(|| anyhow!("cannot determine a home directory; pass --gantry-home"))
}

fn parse_property_args(args: &[String]) -> Result<BTreeMap<String, String>> {
    let mut properties = BTreeMap::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid property '{arg}' (expected KEY=VALUE)"))?;
        properties.insert(key.to_string(), value.to_string());
    }
    Ok(properties)
}
