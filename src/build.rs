// src/build.rs

//! Build lifecycle orchestration.
//!
//! [`Build`] owns one invocation end to end: settings discovery and
//! processing, property loading, project loading, configuration, task-name
//! resolution, and execution. Every phase is a synchronous call into a
//! constructor-injected collaborator; the orchestrator recovers from
//! nothing, it only sequences, reports, and propagates.
//!
//! The one non-linear part is the reload cycle: executing a task set can
//! change the project/task graph on disk (generators that add subprojects
//! or task declarations). When the executer reports that, the next task set
//! must run against the *new* structure, so the orchestrator reloads and
//! reconfigures before continuing instead of configuring once up front.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::configure::{BuildConfigurer, DefaultBuildConfigurer};
use crate::errors::{GantryError, Result};
use crate::exec::{BuildExecuter, DefaultBuildExecuter};
use crate::fs::{FileSystem, RealFileSystem};
use crate::params::BuildParams;
use crate::project::loader::{DefaultProjectsLoader, ProjectsLoader};
use crate::properties::{DefaultPropertiesLoader, PropertiesLoader};
use crate::settings::{
    DefaultSettingsFinder, DefaultSettingsProcessor, Settings, SettingsFinder, SettingsProcessor,
};
use crate::sysconfig;

/// Outcome of one orchestrator call: the settings the build ran against,
/// paired with its failure if it had one. Handed to every registered
/// listener exactly once per call, before the caller sees anything.
#[derive(Debug)]
pub struct BuildResult {
    pub settings: Settings,
    pub failure: Option<GantryError>,
}

impl BuildResult {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Observer notified exactly once per orchestrator call, success or not.
pub trait BuildListener {
    fn build_finished(&mut self, result: &BuildResult);
}

/// The build lifecycle orchestrator.
pub struct Build {
    settings_finder: Box<dyn SettingsFinder>,
    properties_loader: Box<dyn PropertiesLoader>,
    settings_processor: Box<dyn SettingsProcessor>,
    projects_loader: Box<dyn ProjectsLoader>,
    configurer: Box<dyn BuildConfigurer>,
    executer: Box<dyn BuildExecuter>,
    listeners: Vec<Box<dyn BuildListener>>,
}

impl Build {
    /// Construct with explicit collaborators. Tests inject recording fakes
    /// here; production code usually goes through [`Build::with_defaults`].
    pub fn new(
        settings_finder: Box<dyn SettingsFinder>,
        properties_loader: Box<dyn PropertiesLoader>,
        settings_processor: Box<dyn SettingsProcessor>,
        projects_loader: Box<dyn ProjectsLoader>,
        configurer: Box<dyn BuildConfigurer>,
        executer: Box<dyn BuildExecuter>,
    ) -> Self {
        Self {
            settings_finder,
            properties_loader,
            settings_processor,
            projects_loader,
            configurer,
            executer,
            listeners: Vec::new(),
        }
    }

    /// Default collaborators against the real filesystem.
    pub fn with_defaults() -> Self {
        Self::with_filesystem(Arc::new(RealFileSystem))
    }

    /// Default collaborators reading through the given filesystem seam.
    pub fn with_filesystem(fs: Arc<dyn FileSystem>) -> Self {
        Self::new(
            Box::new(DefaultSettingsFinder::new(fs.clone())),
            Box::new(DefaultPropertiesLoader::new(fs.clone())),
            Box::new(DefaultSettingsProcessor::new(fs.clone())),
            Box::new(DefaultProjectsLoader::new(fs)),
            Box::new(DefaultBuildConfigurer::new()),
            Box::new(DefaultBuildExecuter::new()),
        )
    }

    /// Register a listener. Append-only: no de-duplication, no removal.
    pub fn add_build_listener(&mut self, listener: Box<dyn BuildListener>) {
        self.listeners.push(listener);
    }

    /// Registered listeners, in registration order.
    pub fn build_listeners(&self) -> &[Box<dyn BuildListener>] {
        &self.listeners
    }

    /// Run a full, recursive (upward-searching) build.
    ///
    /// If settings processing itself fails there is no valid [`Settings`]
    /// to report, so the error returns immediately and no listener is
    /// notified. Every later failure is wrapped into a [`BuildResult`],
    /// delivered to the listeners, and then returned to the caller.
    pub fn run(&mut self, params: &BuildParams) -> Result<BuildResult> {
        let settings = self
            .settings_processor
            .process(&mut *self.settings_finder, params)?;
        let outcome = self.execute_build(&settings, params);
        self.finish(settings, outcome)
    }

    /// Run a single-project build rooted at the invocation directory.
    ///
    /// Used for embedded invocations: settings come from basic processing
    /// and the upward-search flag is forced off regardless of what the
    /// caller's parameters say.
    pub fn run_single_project(&mut self, params: &BuildParams) -> Result<BuildResult> {
        let params = params.with_search_upwards(false);
        let settings = self
            .settings_processor
            .basic_settings(&mut *self.settings_finder, &params)?;
        let outcome = self.execute_build(&settings, &params);
        self.finish(settings, outcome)
    }

    /// Configure the hierarchy for task listing; no execution, no reloads.
    pub fn task_list(&mut self, params: &BuildParams) -> Result<BuildResult> {
        let settings = self
            .settings_processor
            .process(&mut *self.settings_finder, params)?;
        let outcome = self.configure_task_list(&settings, params, true);
        self.finish(settings, outcome)
    }

    /// Single-project variant of [`Build::task_list`].
    pub fn task_list_single_project(&mut self, params: &BuildParams) -> Result<BuildResult> {
        let params = params.with_search_upwards(false);
        let settings = self
            .settings_processor
            .basic_settings(&mut *self.settings_finder, &params)?;
        let outcome = self.configure_task_list(&settings, &params, false);
        self.finish(settings, outcome)
    }

    /// Steps 2-7 of a build: everything between settings processing and
    /// result construction.
    fn execute_build(&mut self, settings: &Settings, params: &BuildParams) -> Result<()> {
        let (properties, system_config, environment) = self.load_properties(params)?;
        let imports = settings.import_roots();

        let mut tree = self.projects_loader.load(
            settings,
            &imports,
            params,
            &properties,
            &system_config,
            &environment,
        )?;
        self.configurer.process(&mut tree)?;

        let task_names = if params.task_names.is_empty() {
            let defaults = tree.current_project().default_tasks.clone();
            debug!(
                project = %tree.current_project().path,
                tasks = ?defaults,
                "no task names requested; using current project's default tasks"
            );
            defaults
        } else {
            params.task_names.clone()
        };

        if task_names.is_empty() {
            warn!("nothing to do: no task names requested and no default tasks configured");
            return Ok(());
        }

        for name in &task_names {
            let task_set = tree.tasks_by_name(tree.current_id(), name);
            if task_set.is_empty() {
                return Err(GantryError::UnknownTask {
                    name: name.clone(),
                    project: tree.current_project().path.clone(),
                });
            }

            info!(task = %name, matches = task_set.len(), "executing task set");
            let changed = self.executer.execute(&task_set, &mut tree)?;

            if changed {
                info!(task = %name, "task graph changed; reloading and reconfiguring");
                tree = self.projects_loader.load(
                    settings,
                    &imports,
                    params,
                    &properties,
                    &system_config,
                    &environment,
                )?;
                self.configurer.process(&mut tree)?;
            }
        }
        Ok(())
    }

    /// Task-list counterpart of [`Build::execute_build`].
    fn configure_task_list(
        &mut self,
        settings: &Settings,
        params: &BuildParams,
        recursive: bool,
    ) -> Result<()> {
        let (properties, system_config, environment) = self.load_properties(params)?;
        let imports = settings.import_roots();

        let mut tree = self.projects_loader.load(
            settings,
            &imports,
            params,
            &properties,
            &system_config,
            &environment,
        )?;
        let current = tree.current_id();
        self.configurer.task_list(&mut tree, recursive, current)
    }

    /// Load the layered properties and publish the process-wide entries.
    ///
    /// Publication is the single deliberate global mutation in the crate:
    /// `sys.`-prefixed properties (stripped) plus the invocation's `-D`
    /// overrides land in [`sysconfig`] and are never rolled back.
    fn load_properties(
        &mut self,
        params: &BuildParams,
    ) -> Result<(
        BTreeMap<String, String>,
        BTreeMap<String, String>,
        BTreeMap<String, String>,
    )> {
        self.properties_loader
            .load_properties(self.settings_finder.settings_dir(), params)?;
        let properties = self.properties_loader.properties().clone();

        sysconfig::publish_system_properties(&properties, &params.system_properties);

        let system_config = sysconfig::snapshot();
        let environment: BTreeMap<String, String> = std::env::vars().collect();
        Ok((properties, system_config, environment))
    }

    /// Wrap the outcome into a [`BuildResult`], notify every listener in
    /// registration order, then hand the result (or its failure) to the
    /// caller.
    fn finish(&mut self, settings: Settings, outcome: Result<()>) -> Result<BuildResult> {
        let mut result = BuildResult {
            settings,
            failure: outcome.err(),
        };

        for listener in &mut self.listeners {
            listener.build_finished(&result);
        }

        match result.failure.take() {
            Some(failure) => Err(failure),
            None => Ok(result),
        }
    }
}
