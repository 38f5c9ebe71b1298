// tests/projects_loading.rs

//! Project hierarchy construction and configuration against the mock
//! filesystem: includes, imports, current-project detection, properties.

mod common;
use crate::common::init_tracing;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gantry::configure::{BuildConfigurer, DefaultBuildConfigurer};
use gantry::errors::GantryError;
use gantry::fs::mock::MockFileSystem;
use gantry::params::BuildParams;
use gantry::project::{DefaultProjectsLoader, ProjectTree, ProjectsLoader};
use gantry::settings::{Settings, SettingsProvenance};
use gantry_test_utils::builders::BuildParamsBuilder;

fn multi_project_settings() -> Settings {
    Settings::new(
        PathBuf::from("/work"),
        vec!["core".to_string(), "cli".to_string()],
        vec![PathBuf::from("/work/imports")],
        SettingsProvenance::Discovered,
    )
}

fn load(
    fs: MockFileSystem,
    settings: &Settings,
    params: &BuildParams,
    properties: BTreeMap<String, String>,
    environment: BTreeMap<String, String>,
) -> Result<ProjectTree, GantryError> {
    let mut loader = DefaultProjectsLoader::new(Arc::new(fs));
    loader.load(
        settings,
        &settings.import_roots(),
        params,
        &properties,
        &BTreeMap::new(),
        &environment,
    )
}

#[test]
fn loads_root_and_included_projects_and_picks_the_current_one() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("/work/Gantry.toml", "[task.assemble]\ncmd = \"echo root\"\n");
    fs.add_file("/work/core/Gantry.toml", "[task.compile]\ncmd = \"echo core\"\n");
    fs.add_file("/work/cli/Gantry.toml", "[task.compile]\ncmd = \"echo cli\"\n");

    let settings = multi_project_settings();
    let params = BuildParamsBuilder::new("/work/core").build();
    let mut tree = load(fs, &settings, &params, BTreeMap::new(), BTreeMap::new())
        .expect("load should succeed");

    assert_eq!(tree.len(), 3);
    assert_eq!(tree.root_project().dir, Path::new("/work"));
    assert_eq!(tree.current_project().path, ":core");

    DefaultBuildConfigurer::new()
        .process(&mut tree)
        .expect("configure should succeed");

    assert!(tree.root_project().tasks.contains_key("assemble"));
    assert!(tree.current_project().tasks.contains_key("compile"));

    // Same-named tasks across sibling projects resolve into one set from
    // the root, in deterministic include order.
    let refs = tree.tasks_by_name(tree.root_id(), "compile");
    assert_eq!(refs.len(), 2);
    assert_eq!(tree.project(refs[0].project).path, ":core");
    assert_eq!(tree.project(refs[1].project).path, ":cli");
}

#[test]
fn imported_task_tables_are_merged_and_local_tasks_win() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file(
        "/work/Gantry.toml",
        r#"
import = ["common"]

[task.fmt]
cmd = "echo local-fmt"
"#,
    );
    fs.add_file(
        "/work/imports/common.toml",
        r#"
[task.fmt]
cmd = "echo imported-fmt"

[task.lint]
cmd = "echo lint"
"#,
    );

    let settings = Settings::new(
        PathBuf::from("/work"),
        Vec::new(),
        vec![PathBuf::from("/work/imports")],
        SettingsProvenance::Discovered,
    );
    let params = BuildParamsBuilder::new("/work").build();
    let mut tree = load(fs, &settings, &params, BTreeMap::new(), BTreeMap::new())
        .expect("load should succeed");
    DefaultBuildConfigurer::new()
        .process(&mut tree)
        .expect("configure should succeed");

    let tasks = &tree.root_project().tasks;
    assert_eq!(
        tasks.get("fmt").and_then(|task| task.cmd.as_deref()),
        Some("echo local-fmt")
    );
    assert!(tasks.contains_key("lint"));
}

#[test]
fn unresolvable_import_is_a_configuration_error() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("/work/Gantry.toml", "import = [\"nope\"]\n");

    let settings = multi_project_settings();
    let params = BuildParamsBuilder::new("/work").build();
    let err = load(fs, &settings, &params, BTreeMap::new(), BTreeMap::new())
        .expect_err("missing import must fail");

    assert!(matches!(err, GantryError::ConfigError(_)));
}

#[test]
fn project_properties_layer_files_env_then_overrides() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("/work/Gantry.toml", "[task.noop]\n");

    let mut properties = BTreeMap::new();
    properties.insert("from_file".to_string(), "file".to_string());
    properties.insert("shared".to_string(), "file".to_string());
    properties.insert("sys.hidden".to_string(), "x".to_string());

    let mut environment = BTreeMap::new();
    environment.insert("GANTRY_PROP_shared".to_string(), "env".to_string());

    let settings = Settings::single_project(PathBuf::from("/work"), SettingsProvenance::Basic);
    let params = BuildParamsBuilder::new("/work")
        .project_prop("shared", "cli")
        .project_prop("cli_only", "c")
        .build();
    let tree = load(fs, &settings, &params, properties, environment).expect("load should succeed");

    let project_properties = &tree.root_project().properties;
    assert_eq!(project_properties.get("from_file").map(String::as_str), Some("file"));
    // -P beats the environment, which beats the files.
    assert_eq!(project_properties.get("shared").map(String::as_str), Some("cli"));
    assert_eq!(project_properties.get("cli_only").map(String::as_str), Some("c"));
    // Prefixed entries belong to the process-wide channel, not projects.
    assert!(!project_properties.contains_key("sys.hidden"));
}

#[test]
fn unknown_after_reference_is_rejected() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file(
        "/work/Gantry.toml",
        "[task.build]\ncmd = \"echo b\"\nafter = [\"nope\"]\n",
    );

    let settings = Settings::single_project(PathBuf::from("/work"), SettingsProvenance::Basic);
    let params = BuildParamsBuilder::new("/work").build();
    let err = load(fs, &settings, &params, BTreeMap::new(), BTreeMap::new())
        .expect_err("unknown dependency must fail");

    assert!(matches!(err, GantryError::ConfigError(_)));
}

#[test]
fn dependency_cycles_are_rejected() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file(
        "/work/Gantry.toml",
        r#"
[task.a]
after = ["b"]

[task.b]
after = ["a"]
"#,
    );

    let settings = Settings::single_project(PathBuf::from("/work"), SettingsProvenance::Basic);
    let params = BuildParamsBuilder::new("/work").build();
    let err = load(fs, &settings, &params, BTreeMap::new(), BTreeMap::new())
        .expect_err("cycle must fail");

    assert!(matches!(err, GantryError::TaskCycle(_)));
}

#[test]
fn custom_build_file_name_is_honored() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("/work/custom.toml", "[task.only]\n");

    let settings = Settings::single_project(PathBuf::from("/work"), SettingsProvenance::Basic);
    let params = BuildParamsBuilder::new("/work")
        .build_file_name("custom.toml")
        .build();
    let mut tree = load(fs, &settings, &params, BTreeMap::new(), BTreeMap::new())
        .expect("load should succeed");
    DefaultBuildConfigurer::new()
        .process(&mut tree)
        .expect("configure should succeed");

    assert!(tree.root_project().tasks.contains_key("only"));
}

#[test]
fn default_tasks_come_from_the_build_file() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file(
        "/work/Gantry.toml",
        "default_tasks = [\"check\"]\n\n[task.check]\ncmd = \"echo c\"\n",
    );

    let settings = Settings::single_project(PathBuf::from("/work"), SettingsProvenance::Basic);
    let params = BuildParamsBuilder::new("/work").build();
    let mut tree = load(fs, &settings, &params, BTreeMap::new(), BTreeMap::new())
        .expect("load should succeed");
    DefaultBuildConfigurer::new()
        .process(&mut tree)
        .expect("configure should succeed");

    assert_eq!(tree.current_project().default_tasks, ["check"]);
}
