// tests/task_resolution.rs

//! Task-name resolution over the project hierarchy.

mod common;
use crate::common::init_tracing;

use std::path::Path;

use gantry_test_utils::builders::ProjectTreeBuilder;

#[test]
fn resolution_covers_the_current_project_and_its_descendants() {
    init_tracing();

    let (builder, core) = ProjectTreeBuilder::new("/work").subproject("core");
    let (builder, cli) = builder.subproject("cli");
    let tree = builder
        .task("compile")
        .task_in(core, "compile")
        .task_in(cli, "compile")
        .build();

    let refs = tree.tasks_by_name(tree.root_id(), "compile");
    assert_eq!(refs.len(), 3);
    // Deterministic order: root first, then children in include order.
    assert_eq!(tree.project(refs[0].project).path, ":");
    assert_eq!(tree.project(refs[1].project).path, ":core");
    assert_eq!(tree.project(refs[2].project).path, ":cli");
}

#[test]
fn resolution_from_a_child_does_not_see_the_root() {
    init_tracing();

    let (builder, core) = ProjectTreeBuilder::new("/work").subproject("core");
    let tree = builder.task("assemble").task_in(core, "compile").build();

    assert!(tree.tasks_by_name(core, "assemble").is_empty());
    assert_eq!(tree.tasks_by_name(core, "compile").len(), 1);
}

#[test]
fn resolution_is_stable_across_calls() {
    init_tracing();

    let (builder, core) = ProjectTreeBuilder::new("/work").subproject("core");
    let tree = builder.task("t").task_in(core, "t").build();

    let first = tree.tasks_by_name(tree.root_id(), "t");
    let second = tree.tasks_by_name(tree.root_id(), "t");
    assert_eq!(first, second);
}

#[test]
fn nearest_project_dir_picks_the_deepest_match() {
    init_tracing();

    let (builder, core) = ProjectTreeBuilder::new("/work").subproject("core");
    let tree = builder.build();

    assert_eq!(tree.project_nearest_dir(Path::new("/work/core/src")), core);
    assert_eq!(tree.project_nearest_dir(Path::new("/work")), tree.root_id());
    // Outside the hierarchy falls back to the root.
    assert_eq!(tree.project_nearest_dir(Path::new("/elsewhere")), tree.root_id());
}
