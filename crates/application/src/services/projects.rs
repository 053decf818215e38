//! Project use cases.

use std::sync::Arc;

use courier_domain::{Project, SyncFlag};

use crate::store::{Outcome, SharedStore};
use crate::sync::{SyncClient, SyncResult};

/// Project operations that keep the remote copy in step.
pub struct ProjectsService {
    client: Arc<SyncClient>,
    store: SharedStore,
}

impl ProjectsService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: Arc<SyncClient>, store: SharedStore) -> Self {
        Self { client, store }
    }

    /// Pushes every local project when project sync is enabled.
    ///
    /// # Errors
    /// Returns the failed remote write.
    pub async fn sync_projects(&self) -> SyncResult<()> {
        if !self.client.sync_enabled(SyncFlag::Projects).await {
            return Ok(());
        }
        let projects = self.store.lock().await.projects().to_vec();
        self.client.write_projects(&projects).await?;
        self.store.lock().await.clear_project_markers();
        Ok(())
    }

    /// Pushes the selected project when project sync is enabled.
    ///
    /// # Errors
    /// Returns the failed remote write.
    pub async fn sync_current_project(&self) -> SyncResult<()> {
        let Some(project) = self.current_project().await else {
            return Ok(());
        };
        if self.client.sync_enabled(SyncFlag::Projects).await {
            self.client.write_project(&project).await?;
        }
        Ok(())
    }

    /// Adds a project locally, then syncs.
    ///
    /// # Errors
    /// Returns the failed remote write; the project stays added.
    pub async fn add_project(&self, project: Project) -> SyncResult<Outcome> {
        let outcome = self.store.lock().await.add_project(project);
        self.sync_if_applied(outcome).await
    }

    /// Renames a project locally, then syncs.
    ///
    /// # Errors
    /// Returns the failed remote write; the rename is kept.
    pub async fn edit_project(&self, index: usize, name: &str) -> SyncResult<Outcome> {
        let outcome = self.store.lock().await.edit_project(index, name);
        self.sync_if_applied(outcome).await
    }

    /// Removes a project locally, then syncs, which prunes it remotely.
    ///
    /// # Errors
    /// Returns the failed remote write; the project stays removed.
    pub async fn delete_project(&self, index: usize) -> SyncResult<Outcome> {
        let outcome = self.store.lock().await.remove_project(index);
        self.sync_if_applied(outcome).await
    }

    /// Selects a project locally and routes collection writes to it.
    pub async fn set_current_project(&self, id: Option<String>) -> Outcome {
        let (outcome, project) = {
            let mut store = self.store.lock().await;
            let outcome = store.set_current_project(id);
            (outcome, store.current_project().cloned())
        };
        if outcome.is_applied() {
            self.client.set_current_project(project).await;
        }
        outcome
    }

    /// Returns the selected project.
    ///
    /// A selection pointing at a project that no longer exists is cleared
    /// once the remote store has delivered projects.
    pub async fn current_project(&self) -> Option<Project> {
        let remote_has_projects = !self.client.snapshot().await.projects.is_empty();
        let mut store = self.store.lock().await;
        let project = store.current_project().cloned();
        if project.is_none() && store.current_project_id().is_some() && remote_has_projects {
            tracing::info!("clearing selection of a project that no longer exists");
            store.clear_current_project();
        }
        project
    }

    async fn sync_if_applied(&self, outcome: Outcome) -> SyncResult<Outcome> {
        if outcome.is_applied() {
            self.sync_projects().await?;
        }
        Ok(outcome)
    }
}
