// tests/properties_layering.rs

//! Property layering: home file < settings-root file < environment.

mod common;
use crate::common::init_tracing;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use gantry::fs::mock::MockFileSystem;
use gantry::properties::{DefaultPropertiesLoader, PropertiesLoader};
use gantry_test_utils::builders::BuildParamsBuilder;

fn env(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn settings_root_file_overrides_home_file() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file(
        "/home/gantry/Gantry-properties.toml",
        "shared = \"from-home\"\nhome_only = \"h\"\n",
    );
    fs.add_file(
        "/work/Gantry-properties.toml",
        "shared = \"from-root\"\nroot_only = \"r\"\n",
    );

    let mut loader = DefaultPropertiesLoader::with_environment(Arc::new(fs), BTreeMap::new());
    let params = BuildParamsBuilder::new("/work")
        .gantry_home("/home/gantry")
        .build();
    loader
        .load_properties(Path::new("/work"), &params)
        .expect("loading should succeed");

    let properties = loader.properties();
    assert_eq!(properties.get("shared").map(String::as_str), Some("from-root"));
    assert_eq!(properties.get("home_only").map(String::as_str), Some("h"));
    assert_eq!(properties.get("root_only").map(String::as_str), Some("r"));
}

#[test]
fn environment_variables_override_both_files() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("/work/Gantry-properties.toml", "shared = \"from-root\"\n");

    let mut loader = DefaultPropertiesLoader::with_environment(
        Arc::new(fs),
        env(&[("GANTRY_PROP_shared", "from-env"), ("UNRELATED", "x")]),
    );
    let params = BuildParamsBuilder::new("/work").build();
    loader
        .load_properties(Path::new("/work"), &params)
        .expect("loading should succeed");

    let properties = loader.properties();
    assert_eq!(properties.get("shared").map(String::as_str), Some("from-env"));
    assert!(!properties.contains_key("UNRELATED"));
}

#[test]
fn missing_files_yield_an_empty_mapping() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_dir("/work");

    let mut loader = DefaultPropertiesLoader::with_environment(Arc::new(fs), BTreeMap::new());
    let params = BuildParamsBuilder::new("/work").build();
    loader
        .load_properties(Path::new("/work"), &params)
        .expect("loading should succeed");

    assert!(loader.properties().is_empty());
}

#[test]
fn non_string_values_are_a_parse_error() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("/work/Gantry-properties.toml", "count = 3\n");

    let mut loader = DefaultPropertiesLoader::with_environment(Arc::new(fs), BTreeMap::new());
    let params = BuildParamsBuilder::new("/work").build();

    assert!(loader.load_properties(Path::new("/work"), &params).is_err());
}
