// tests/build_listeners.rs

//! Listener registry and notification behavior: exactly one notification
//! per lifecycle call, in registration order, success or failure.

mod common;
use crate::common::init_tracing;

use std::path::PathBuf;

use gantry::build::Build;
use gantry::errors::GantryError;
use gantry_test_utils::builders::{BuildParamsBuilder, ProjectTreeBuilder};
use gantry_test_utils::fakes::{
    CallLog, ExecOutcome, FakeBuildConfigurer, FakeBuildExecuter, FakePropertiesLoader,
    FakeProjectsLoader, FakeSettingsFinder, FakeSettingsProcessor, RecordingListener, new_call_log,
};

const ROOT: &str = "/work/demo";

fn harness(calls: &CallLog, outcomes: &[ExecOutcome]) -> Build {
    Build::new(
        Box::new(FakeSettingsFinder::new(ROOT, calls.clone())),
        Box::new(FakePropertiesLoader::empty(calls.clone())),
        Box::new(FakeSettingsProcessor::new(ROOT, calls.clone())),
        Box::new(FakeProjectsLoader::new(calls.clone(), || {
            ProjectTreeBuilder::new(ROOT).task("a").build()
        })),
        Box::new(FakeBuildConfigurer::new(calls.clone())),
        Box::new(FakeBuildExecuter::new(outcomes, calls.clone())),
    )
}

#[test]
fn fresh_orchestrator_has_no_listeners() {
    init_tracing();

    let build = harness(&new_call_log(), &[]);
    assert!(build.build_listeners().is_empty());
}

#[test]
fn listeners_are_appended_in_registration_order() {
    init_tracing();

    let events = RecordingListener::shared_events();
    let mut build = harness(&new_call_log(), &[]);
    build.add_build_listener(Box::new(RecordingListener::new("first", events.clone())));
    build.add_build_listener(Box::new(RecordingListener::new("second", events.clone())));

    assert_eq!(build.build_listeners().len(), 2);
}

#[test]
fn success_notifies_every_listener_once_in_order() {
    init_tracing();

    let events = RecordingListener::shared_events();
    let mut build = harness(&new_call_log(), &[ExecOutcome::Unchanged]);
    build.add_build_listener(Box::new(RecordingListener::new("first", events.clone())));
    build.add_build_listener(Box::new(RecordingListener::new("second", events.clone())));

    let params = BuildParamsBuilder::new(ROOT).tasks(&["a"]).build();
    build.run(&params).expect("build should succeed");

    let seen = events.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].label, "first");
    assert_eq!(seen[1].label, "second");
    for event in &seen {
        assert_eq!(event.root_dir, PathBuf::from(ROOT));
        assert_eq!(event.failure, None);
    }
}

#[test]
fn failure_is_delivered_to_listeners_then_returned_to_the_caller() {
    init_tracing();

    let events = RecordingListener::shared_events();
    let mut build = harness(&new_call_log(), &[ExecOutcome::Fail(2)]);
    build.add_build_listener(Box::new(RecordingListener::new("only", events.clone())));

    let params = BuildParamsBuilder::new(ROOT).tasks(&["a"]).build();
    let err = build.run(&params).expect_err("failure must propagate");

    let seen = events.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    // The listener observed the same failure the caller received.
    assert_eq!(seen[0].failure.as_deref(), Some(err.to_string().as_str()));
}

#[test]
fn unknown_task_failure_also_reaches_listeners() {
    init_tracing();

    let events = RecordingListener::shared_events();
    let mut build = harness(&new_call_log(), &[]);
    build.add_build_listener(Box::new(RecordingListener::new("only", events.clone())));

    let params = BuildParamsBuilder::new(ROOT).tasks(&["missing"]).build();
    let err = build.run(&params).expect_err("unknown task must fail");

    assert!(matches!(err, GantryError::UnknownTask { .. }));
    let seen = events.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].failure.is_some());
}

#[test]
fn settings_processing_failure_notifies_no_listener() {
    init_tracing();

    let calls = new_call_log();
    let events = RecordingListener::shared_events();
    let mut build = Build::new(
        Box::new(FakeSettingsFinder::new(ROOT, calls.clone())),
        Box::new(FakePropertiesLoader::empty(calls.clone())),
        Box::new(FakeSettingsProcessor::failing(ROOT, "broken settings", calls.clone())),
        Box::new(FakeProjectsLoader::new(calls.clone(), || {
            ProjectTreeBuilder::new(ROOT).build()
        })),
        Box::new(FakeBuildConfigurer::new(calls.clone())),
        Box::new(FakeBuildExecuter::new(&[], calls.clone())),
    );
    build.add_build_listener(Box::new(RecordingListener::new("only", events.clone())));

    let params = BuildParamsBuilder::new(ROOT).tasks(&["a"]).build();
    let err = build.run(&params).expect_err("settings failure must propagate");

    assert!(matches!(err, GantryError::ConfigError(_)));
    // No Settings value exists, so nothing was reported.
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn task_list_notifies_listeners_like_a_run() {
    init_tracing();

    let events = RecordingListener::shared_events();
    let mut build = harness(&new_call_log(), &[]);
    build.add_build_listener(Box::new(RecordingListener::new("only", events.clone())));

    let params = BuildParamsBuilder::new(ROOT).build();
    build.task_list(&params).expect("task list should succeed");

    let seen = events.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].failure, None);
}
