//! First-sync orchestration.
//!
//! Decides once per session whether the local projects seed the remote
//! store or the remote projects replace the local ones. The decision is
//! keyed off the first settings snapshot; snapshots of the two channels may
//! arrive in either order, so a projects snapshot seen before the decision
//! is kept and applied if the decision is to pull.

use std::sync::Arc;

use courier_domain::{Project, SYNC_INITIALIZED, Setting, SyncFlag};
use tokio::sync::broadcast::{self, error::RecvError};

use super::client::SyncClient;
use super::error::SyncResult;
use super::events::SyncEvent;
use crate::store::SharedStore;

/// With fewer remote settings than this, and no `syncInitialized` marker,
/// the user is treated as syncing for the first time.
pub const FIRST_SYNC_THRESHOLD: usize = 4;

/// Phase of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Waiting for the first settings snapshot.
    Uninitialized,
    /// Pushing local projects and enabling the sync flags.
    Seeding,
    /// Local projects were pushed. Terminal.
    Seeded,
    /// Waiting for a projects snapshot to replace the local projects.
    Pulling,
    /// Local projects were replaced by the remote ones. Terminal.
    Synced,
}

impl SyncPhase {
    /// Returns true once no further event changes the phase.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Seeded | Self::Synced)
    }
}

/// What to do with the first settings snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    /// Push local state and enable sync.
    Seed,
    /// Replace local projects with the remote ones.
    Pull,
}

impl SyncDecision {
    /// Decides from a settings snapshot.
    ///
    /// An explicit `syncInitialized` setting wins. Without it, fewer than
    /// [`FIRST_SYNC_THRESHOLD`] settings means a first sync.
    #[must_use]
    pub fn for_settings(settings: &[Setting]) -> Self {
        if let Some(marker) = settings.iter().find(|setting| setting.name == SYNC_INITIALIZED) {
            return if marker.is_enabled() {
                Self::Pull
            } else {
                Self::Seed
            };
        }
        if settings.len() < FIRST_SYNC_THRESHOLD {
            Self::Seed
        } else {
            Self::Pull
        }
    }
}

/// Drives the one-shot seed-or-pull decision of a session.
pub struct SyncOrchestrator {
    client: Arc<SyncClient>,
    store: SharedStore,
    phase: SyncPhase,
    early_projects: Option<Vec<Project>>,
}

impl SyncOrchestrator {
    /// Creates an orchestrator in [`SyncPhase::Uninitialized`].
    #[must_use]
    pub const fn new(client: Arc<SyncClient>, store: SharedStore) -> Self {
        Self {
            client,
            store,
            phase: SyncPhase::Uninitialized,
            early_projects: None,
        }
    }

    /// The current phase.
    #[must_use]
    pub const fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Consumes events until a terminal phase is reached or the channel
    /// closes, and returns the final phase.
    ///
    /// Subscribe to the client's events before signing in, or the first
    /// snapshots may be missed.
    ///
    /// # Errors
    /// Returns the first failed remote write while seeding.
    pub async fn run(mut self, mut events: broadcast::Receiver<SyncEvent>) -> SyncResult<SyncPhase> {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if self.handle(event).await?.is_terminal() {
                        return Ok(self.phase);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "sync orchestrator lagged behind events");
                }
                Err(RecvError::Closed) => return Ok(self.phase),
            }
        }
    }

    /// Applies one event and returns the resulting phase.
    ///
    /// # Errors
    /// Returns the first failed remote write while seeding.
    pub async fn handle(&mut self, event: SyncEvent) -> SyncResult<SyncPhase> {
        match (self.phase, event) {
            (SyncPhase::Uninitialized, SyncEvent::SettingsLoaded(settings)) => {
                match SyncDecision::for_settings(&settings) {
                    SyncDecision::Seed => self.seed().await?,
                    SyncDecision::Pull => {
                        self.phase = SyncPhase::Pulling;
                        tracing::info!("loading projects from remote");
                        if let Some(projects) = self.early_projects.take() {
                            self.pull(projects).await;
                        }
                    }
                }
            }
            (SyncPhase::Uninitialized, SyncEvent::ProjectsLoaded(projects)) => {
                self.early_projects = Some(projects);
            }
            (SyncPhase::Pulling, SyncEvent::ProjectsLoaded(projects)) => self.pull(projects).await,
            _ => {}
        }
        Ok(self.phase)
    }

    async fn seed(&mut self) -> SyncResult<()> {
        self.phase = SyncPhase::Seeding;
        tracing::info!("first sync, seeding remote projects");

        let projects = self.store.lock().await.projects().to_vec();
        self.client.write_projects(&projects).await?;
        for flag in SyncFlag::ALL {
            self.client.write_setting(flag.setting_name(), true).await?;
        }
        self.client.write_setting(SYNC_INITIALIZED, true).await?;

        self.phase = SyncPhase::Seeded;
        tracing::info!(projects = projects.len(), "remote seeded");
        Ok(())
    }

    async fn pull(&mut self, projects: Vec<Project>) {
        let count = projects.len();
        self.store.lock().await.replace_projects(projects);
        self.phase = SyncPhase::Synced;
        tracing::info!(projects = count, "local projects replaced from remote");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::test_support::{empty_state, store_with};
    use crate::sync::test_support::client_with;
    use courier_domain::AuthProviderKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn settings(count: usize) -> Vec<Setting> {
        (0..count).map(|i| Setting::new(format!("s{i}"), true)).collect()
    }

    fn project(id: &str, name: &str) -> Project {
        let mut project = Project::new(name);
        project.id = id.to_string();
        project
    }

    fn shared_with(projects: Vec<Project>) -> SharedStore {
        let mut state = empty_state();
        state.projects = projects;
        store_with(state).0.into_shared()
    }

    #[test]
    fn decision_heuristic() {
        assert_eq!(SyncDecision::for_settings(&settings(2)), SyncDecision::Seed);
        assert_eq!(SyncDecision::for_settings(&settings(4)), SyncDecision::Pull);
        assert_eq!(
            SyncDecision::for_settings(&[Setting::new(SYNC_INITIALIZED, true)]),
            SyncDecision::Pull
        );
        let mut many = settings(6);
        many.push(Setting::new(SYNC_INITIALIZED, false));
        assert_eq!(SyncDecision::for_settings(&many), SyncDecision::Seed);
    }

    #[tokio::test]
    async fn few_settings_seed_and_never_pull() {
        let (client, remote, _) = client_with();
        client.sign_in(AuthProviderKind::Google).await.unwrap();
        let local = shared_with(vec![project("p1", "Local")]);
        let mut orchestrator = SyncOrchestrator::new(client, local.clone());

        let phase = orchestrator
            .handle(SyncEvent::SettingsLoaded(settings(2)))
            .await
            .unwrap();
        assert_eq!(phase, SyncPhase::Seeded);
        assert!(remote.get("users/u1/projects", "p1").is_some());
        for flag in SyncFlag::ALL {
            let setting = remote.get("users/u1/settings", flag.setting_name()).unwrap();
            assert_eq!(setting["value"], json!(true));
        }
        assert_eq!(
            remote.get("users/u1/settings", SYNC_INITIALIZED).unwrap()["value"],
            json!(true)
        );

        let phase = orchestrator
            .handle(SyncEvent::ProjectsLoaded(vec![project("p9", "Remote")]))
            .await
            .unwrap();
        assert_eq!(phase, SyncPhase::Seeded);
        assert_eq!(local.lock().await.projects()[0].name, "Local");
    }

    #[tokio::test]
    async fn many_settings_pull_projects() {
        let (client, remote, _) = client_with();
        client.sign_in(AuthProviderKind::Google).await.unwrap();
        let local = shared_with(vec![project("p1", "Local")]);
        let mut orchestrator = SyncOrchestrator::new(client, local.clone());

        let phase = orchestrator
            .handle(SyncEvent::SettingsLoaded(settings(5)))
            .await
            .unwrap();
        assert_eq!(phase, SyncPhase::Pulling);

        let incoming = vec![project("r1", "Remote A"), project("r2", "Remote B")];
        let phase = orchestrator
            .handle(SyncEvent::ProjectsLoaded(incoming.clone()))
            .await
            .unwrap();
        assert_eq!(phase, SyncPhase::Synced);
        assert_eq!(local.lock().await.projects(), incoming.as_slice());
        assert!(remote.writes().iter().all(|write| write.starts_with("set users/u1")));
    }

    #[tokio::test]
    async fn early_projects_snapshot_is_applied_on_pull() {
        let (client, _, _) = client_with();
        let local = shared_with(Vec::new());
        let mut orchestrator = SyncOrchestrator::new(client, local.clone());

        orchestrator
            .handle(SyncEvent::ProjectsLoaded(vec![project("r1", "Remote")]))
            .await
            .unwrap();
        let phase = orchestrator
            .handle(SyncEvent::SettingsLoaded(settings(5)))
            .await
            .unwrap();
        assert_eq!(phase, SyncPhase::Synced);
        assert_eq!(local.lock().await.projects()[0].id, "r1");
    }

    #[tokio::test]
    async fn run_stops_at_terminal_phase() {
        let (client, _, _) = client_with();
        let local = shared_with(Vec::new());
        let orchestrator = SyncOrchestrator::new(client, local.clone());

        let (sender, receiver) = broadcast::channel(8);
        sender.send(SyncEvent::SettingsLoaded(settings(4))).unwrap();
        sender
            .send(SyncEvent::ProjectsLoaded(vec![project("r1", "Remote")]))
            .unwrap();

        let phase = orchestrator.run(receiver).await.unwrap();
        assert_eq!(phase, SyncPhase::Synced);
        assert_eq!(local.lock().await.projects().len(), 1);
    }

    #[tokio::test]
    async fn seeding_fails_without_user() {
        let (client, _, _) = client_with();
        let local = shared_with(Vec::new());
        let mut orchestrator = SyncOrchestrator::new(client, local);

        let result = orchestrator.handle(SyncEvent::SettingsLoaded(Vec::new())).await;
        assert!(matches!(result, Err(crate::sync::SyncError::NotSignedIn)));
        assert_eq!(orchestrator.phase(), SyncPhase::Seeding);
    }
}
