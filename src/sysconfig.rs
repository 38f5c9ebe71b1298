// src/sysconfig.rs

//! Process-wide configuration registry.
//!
//! Property entries whose key carries the [`SYSTEM_PROP_PREFIX`] are made
//! visible to the whole process through this registry (with the prefix
//! stripped), alongside any `-D` overrides from the invocation. This is a
//! deliberate, one-way side effect: entries are set, never cleared, and
//! survive for the lifetime of the process. The only writer is the
//! orchestrator's publication step at the start of a build
//! ([`publish_system_properties`]); nothing else in the crate mutates it.
//!
//! Concurrent builds in one process share this registry. The `Mutex` makes
//! individual operations atomic; there is no broader coordination.

use std::collections::BTreeMap;
use std::sync::{Mutex, OnceLock};

/// Property keys starting with this prefix (plus `.`) are published to the
/// registry with the prefix stripped: `sys.prop1 = "v"` becomes `prop1 = "v"`.
pub const SYSTEM_PROP_PREFIX: &str = "sys";

fn registry() -> &'static Mutex<BTreeMap<String, String>> {
    static REGISTRY: OnceLock<Mutex<BTreeMap<String, String>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(BTreeMap::new()))
}

/// Publish every `sys.`-prefixed entry of `properties` (prefix stripped) and
/// every entry of `overrides` verbatim. Additive only: existing keys are
/// overwritten, nothing is removed.
pub fn publish_system_properties(
    properties: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) {
    let prefix = format!("{SYSTEM_PROP_PREFIX}.");
    let mut registry = registry().lock().unwrap();
    for (key, value) in properties {
        if let Some(stripped) = key.strip_prefix(&prefix) {
            registry.insert(stripped.to_string(), value.clone());
        }
    }
    for (key, value) in overrides {
        registry.insert(key.clone(), value.clone());
    }
}

/// Look up a single registry entry.
pub fn get(key: &str) -> Option<String> {
    registry().lock().unwrap().get(key).cloned()
}

/// Copy of the whole registry, as threaded into `ProjectsLoader::load`.
pub fn snapshot() -> BTreeMap<String, String> {
    registry().lock().unwrap().clone()
}
