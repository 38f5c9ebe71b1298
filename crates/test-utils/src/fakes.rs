//! Recording fake collaborators for orchestrator tests.
//!
//! Each fake appends to a shared [`CallLog`] so tests can assert the exact
//! sequence of collaborator calls a lifecycle entry point makes, in the
//! ordered-expectation style, without a mocking framework.

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use gantry::build::{BuildListener, BuildResult};
use gantry::configure::BuildConfigurer;
use gantry::errors::{GantryError, Result};
use gantry::exec::BuildExecuter;
use gantry::params::BuildParams;
use gantry::project::loader::ProjectsLoader;
use gantry::project::{ProjectId, ProjectTree, TaskRef};
use gantry::properties::PropertiesLoader;
use gantry::settings::{ImportRoots, Settings, SettingsFinder, SettingsProcessor, SettingsProvenance};

/// Shared, ordered record of collaborator calls.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn log_entries(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn record(log: &CallLog, entry: impl Into<String>) {
    log.lock().unwrap().push(entry.into());
}

/// Settings finder that reports a fixed settings dir.
pub struct FakeSettingsFinder {
    settings_dir: PathBuf,
    calls: CallLog,
}

impl FakeSettingsFinder {
    pub fn new(settings_dir: impl AsRef<Path>, calls: CallLog) -> Self {
        Self {
            settings_dir: settings_dir.as_ref().to_path_buf(),
            calls,
        }
    }
}

impl SettingsFinder for FakeSettingsFinder {
    fn find(&mut self, _params: &BuildParams) -> Result<()> {
        record(&self.calls, "finder.find");
        Ok(())
    }

    fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }

    fn settings_file(&self) -> Option<&Path> {
        None
    }
}

/// Properties loader that returns a fixed mapping and records the root dir
/// it was asked to load from.
pub struct FakePropertiesLoader {
    properties: BTreeMap<String, String>,
    pub loaded_roots: Arc<Mutex<Vec<PathBuf>>>,
    calls: CallLog,
}

impl FakePropertiesLoader {
    pub fn new(properties: BTreeMap<String, String>, calls: CallLog) -> Self {
        Self {
            properties,
            loaded_roots: Arc::new(Mutex::new(Vec::new())),
            calls,
        }
    }

    pub fn empty(calls: CallLog) -> Self {
        Self::new(BTreeMap::new(), calls)
    }
}

impl PropertiesLoader for FakePropertiesLoader {
    fn load_properties(&mut self, settings_root: &Path, _params: &BuildParams) -> Result<()> {
        record(&self.calls, "properties.load");
        self.loaded_roots
            .lock()
            .unwrap()
            .push(settings_root.to_path_buf());
        Ok(())
    }

    fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}

/// Settings processor producing settings rooted at a fixed dir, optionally
/// failing instead.
pub struct FakeSettingsProcessor {
    root_dir: PathBuf,
    fail_with: Option<String>,
    calls: CallLog,
}

impl FakeSettingsProcessor {
    pub fn new(root_dir: impl AsRef<Path>, calls: CallLog) -> Self {
        Self {
            root_dir: root_dir.as_ref().to_path_buf(),
            fail_with: None,
            calls,
        }
    }

    /// Make both processing modes fail with a configuration error.
    pub fn failing(root_dir: impl AsRef<Path>, message: &str, calls: CallLog) -> Self {
        Self {
            root_dir: root_dir.as_ref().to_path_buf(),
            fail_with: Some(message.to_string()),
            calls,
        }
    }

    fn settings(&self, provenance: SettingsProvenance) -> Result<Settings> {
        match &self.fail_with {
            Some(message) => Err(GantryError::ConfigError(message.clone())),
            None => Ok(Settings::new(
                self.root_dir.clone(),
                Vec::new(),
                Vec::new(),
                provenance,
            )),
        }
    }
}

impl SettingsProcessor for FakeSettingsProcessor {
    fn process(
        &mut self,
        finder: &mut dyn SettingsFinder,
        params: &BuildParams,
    ) -> Result<Settings> {
        record(&self.calls, "settings.process");
        finder.find(params)?;
        self.settings(SettingsProvenance::Discovered)
    }

    fn basic_settings(
        &mut self,
        finder: &mut dyn SettingsFinder,
        params: &BuildParams,
    ) -> Result<Settings> {
        record(&self.calls, "settings.basic");
        finder.find(params)?;
        self.settings(SettingsProvenance::Basic)
    }
}

/// Projects loader producing a fresh tree from a factory on every call.
pub struct FakeProjectsLoader {
    factory: Box<dyn Fn() -> ProjectTree + Send>,
    pub search_upwards_seen: Arc<Mutex<Vec<bool>>>,
    calls: CallLog,
}

impl FakeProjectsLoader {
    pub fn new(calls: CallLog, factory: impl Fn() -> ProjectTree + Send + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            search_upwards_seen: Arc::new(Mutex::new(Vec::new())),
            calls,
        }
    }
}

impl ProjectsLoader for FakeProjectsLoader {
    fn load(
        &mut self,
        _settings: &Settings,
        _imports: &ImportRoots,
        params: &BuildParams,
        _properties: &BTreeMap<String, String>,
        _system_config: &BTreeMap<String, String>,
        _environment: &BTreeMap<String, String>,
    ) -> Result<ProjectTree> {
        record(&self.calls, "projects.load");
        self.search_upwards_seen
            .lock()
            .unwrap()
            .push(params.search_upwards);
        Ok((self.factory)())
    }
}

/// Configurer that only records its calls; the fake loader already hands
/// out configured trees.
pub struct FakeBuildConfigurer {
    calls: CallLog,
}

impl FakeBuildConfigurer {
    pub fn new(calls: CallLog) -> Self {
        Self { calls }
    }
}

impl BuildConfigurer for FakeBuildConfigurer {
    fn process(&mut self, _tree: &mut ProjectTree) -> Result<()> {
        record(&self.calls, "configurer.process");
        Ok(())
    }

    fn task_list(
        &mut self,
        _tree: &mut ProjectTree,
        recursive: bool,
        _current: ProjectId,
    ) -> Result<()> {
        record(&self.calls, format!("configurer.task_list:recursive={recursive}"));
        Ok(())
    }
}

/// Scripted outcome for one `execute` call.
#[derive(Debug, Clone, Copy)]
pub enum ExecOutcome {
    /// Execution succeeded, graph unchanged.
    Unchanged,
    /// Execution succeeded and changed the graph: reload expected.
    Changed,
    /// Execution failed with this exit code.
    Fail(i32),
}

/// Executer that records each task set and plays back scripted outcomes in
/// order. Once the script is exhausted, further calls report `Unchanged`.
pub struct FakeBuildExecuter {
    outcomes: VecDeque<ExecOutcome>,
    calls: CallLog,
}

impl FakeBuildExecuter {
    pub fn new(outcomes: &[ExecOutcome], calls: CallLog) -> Self {
        Self {
            outcomes: outcomes.iter().copied().collect(),
            calls,
        }
    }
}

impl BuildExecuter for FakeBuildExecuter {
    fn execute(&mut self, task_set: &[TaskRef], _tree: &mut ProjectTree) -> Result<bool> {
        let name = task_set
            .first()
            .map(|task| task.name.as_str())
            .unwrap_or("<empty>");
        record(&self.calls, format!("executer.execute:{name}"));

        match self.outcomes.pop_front().unwrap_or(ExecOutcome::Unchanged) {
            ExecOutcome::Unchanged => Ok(false),
            ExecOutcome::Changed => Ok(true),
            ExecOutcome::Fail(code) => Err(GantryError::TaskFailed {
                task: name.to_string(),
                code,
            }),
        }
    }
}

/// What a listener observed in one `build_finished` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerEvent {
    pub label: String,
    pub root_dir: PathBuf,
    pub failure: Option<String>,
}

/// Listener recording every notification into a shared vec, labelled so
/// registration order is observable across listeners.
pub struct RecordingListener {
    label: String,
    events: Arc<Mutex<Vec<ListenerEvent>>>,
}

impl RecordingListener {
    pub fn new(label: &str, events: Arc<Mutex<Vec<ListenerEvent>>>) -> Self {
        Self {
            label: label.to_string(),
            events,
        }
    }

    pub fn shared_events() -> Arc<Mutex<Vec<ListenerEvent>>> {
        Arc::new(Mutex::new(Vec::new()))
    }
}

impl BuildListener for RecordingListener {
    fn build_finished(&mut self, result: &BuildResult) {
        self.events.lock().unwrap().push(ListenerEvent {
            label: self.label.clone(),
            root_dir: result.settings.root_dir().to_path_buf(),
            failure: result.failure.as_ref().map(|failure| failure.to_string()),
        });
    }
}
