//! Local state store.
//!
//! [`LocalStore`] is the authoritative in-memory model of settings,
//! projects, collections, environments and transient selection state. All
//! mutations are synchronous and run to completion. A mutation that breaks
//! an invariant leaves the state untouched and returns
//! [`Outcome::Rejected`]; duplicate names and malformed settings are also
//! surfaced to the user through the [`Notifier`] port.
//!
//! The store has no internal synchronization. Share it as a
//! [`SharedStore`] so every mutation goes through a single lock.

mod collections;
mod environments;
mod projects;
mod selection;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use courier_domain::{
    Collection, DomainError, DomainResult, Environment, LocalSettings, Project,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::ports::{Clock, Notification, Notifier};

pub use collections::{MoveRequest, SaveRequestAs};
pub use selection::Selection;

/// The store shared between the UI, the services and the orchestrator.
pub type SharedStore = Arc<Mutex<LocalStore>>;

/// Result of a local mutation.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The mutation was applied.
    Applied,
    /// The mutation was refused and the state is unchanged.
    Rejected(DomainError),
}

impl Outcome {
    /// Returns true if the mutation was applied.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    /// Returns the rejection reason, if any.
    #[must_use]
    pub const fn rejection(&self) -> Option<&DomainError> {
        match self {
            Self::Applied => None,
            Self::Rejected(error) => Some(error),
        }
    }
}

/// The persistent part of the local state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalState {
    /// Local settings, including the selected project.
    #[serde(default)]
    pub settings: LocalSettings,

    /// Collections used when no project is selected.
    #[serde(default)]
    pub collections: Vec<Collection>,

    /// Environments used when no project is selected.
    #[serde(default)]
    pub environments: Vec<Environment>,

    /// Projects, newest first.
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Default for LocalState {
    fn default() -> Self {
        Self {
            settings: LocalSettings::default(),
            collections: vec![Collection::new("My Collection")],
            environments: vec![Environment::new("My Environment Variables")],
            projects: vec![Project::new("My Project")],
        }
    }
}

/// The in-memory data model and its mutation operations.
pub struct LocalStore {
    state: LocalState,
    selection: Selection,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl LocalStore {
    /// Creates a store over an existing state.
    #[must_use]
    pub fn new(state: LocalState, clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state,
            selection: Selection::default(),
            clock,
            notifier,
        }
    }

    /// Wraps the store for sharing across tasks.
    #[must_use]
    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    /// Returns the persistent state.
    #[must_use]
    pub const fn state(&self) -> &LocalState {
        &self.state
    }

    /// Returns the transient selection state.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Returns all projects.
    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.state.projects
    }

    /// Returns the selected project, if one is selected and still exists.
    #[must_use]
    pub fn current_project(&self) -> Option<&Project> {
        self.current_project_index()
            .and_then(|index| self.state.projects.get(index))
    }

    /// Returns the id stored as current project, even if it dangles.
    #[must_use]
    pub fn current_project_id(&self) -> Option<&str> {
        self.state.settings.current_project.as_deref()
    }

    /// The collections the UI works on: the current project's collections,
    /// or the default set when no project is selected.
    #[must_use]
    pub fn active_collections(&self) -> &[Collection] {
        self.current_project()
            .map_or(&self.state.collections, |project| &project.collections)
    }

    /// The environments the UI works on, chosen like [`Self::active_collections`].
    #[must_use]
    pub fn active_environments(&self) -> &[Environment] {
        self.current_project()
            .map_or(&self.state.environments, |project| &project.environments)
    }

    /// Applies a documented setting.
    pub fn apply_setting(&mut self, key: &str, value: Value) -> Outcome {
        let result = self.state.settings.apply(key, value).map(|_| ());
        self.settle(result)
    }

    /// Selects a project by id, or clears the selection.
    pub fn set_current_project(&mut self, id: Option<String>) -> Outcome {
        if let Some(id) = &id {
            if !self.state.projects.iter().any(|project| &project.id == id) {
                return self.settle(Err(DomainError::ProjectNotFound(id.clone())));
            }
        }
        self.state.settings.current_project = id;
        Outcome::Applied
    }

    /// Clears the current project without checking that it exists.
    pub fn clear_current_project(&mut self) {
        self.state.settings.current_project = None;
    }

    fn current_project_index(&self) -> Option<usize> {
        let id = self.state.settings.current_project.as_deref()?;
        self.state.projects.iter().position(|project| project.id == id)
    }

    fn active_collections_mut(&mut self) -> &mut Vec<Collection> {
        match self.current_project_index() {
            Some(index) => &mut self.state.projects[index].collections,
            None => &mut self.state.collections,
        }
    }

    fn active_environments_mut(&mut self) -> &mut Vec<Environment> {
        match self.current_project_index() {
            Some(index) => &mut self.state.projects[index].environments,
            None => &mut self.state.environments,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    /// Turns a mutation result into an [`Outcome`], notifying the user
    /// about rejections they can act on.
    fn settle(&self, result: DomainResult<()>) -> Outcome {
        match result {
            Ok(()) => Outcome::Applied,
            Err(error) => {
                tracing::warn!(%error, "local mutation rejected");
                if let DomainError::DuplicateName { kind, .. } = &error {
                    self.notify(Notification::info(format!("Duplicate {kind}")));
                } else if error.is_user_facing() {
                    self.notify(Notification::info(error.to_string()));
                }
                Outcome::Rejected(error)
            }
        }
    }
}

/// Checks `index` against `len`.
const fn check_index(what: &'static str, index: usize, len: usize) -> DomainResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(DomainError::index(what, index, len))
    }
}
