//! Courier - Main Entry Point
//!
//! Loads the saved local state, signs the configured user in, runs one
//! first-sync session against the in-process document store and saves the
//! state back.

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use courier_application::ports::StateRepository;
use courier_application::{LocalStore, SyncClient, SyncOrchestrator};
use courier_domain::AuthProviderKind;
use courier_infrastructure::{
    FileStateRepository, LocalIdentityProvider, MemoryDocumentStore, SystemClock, TracingNotifier,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::AppConfig;

const SESSION_TIMEOUT: Duration = Duration::from_secs(30);
const FALLBACK_STATE_FILE: &str = "courier-state.json";

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let config = AppConfig::from_env();

    let state_path = config
        .state_path
        .or_else(FileStateRepository::default_location)
        .unwrap_or_else(|| PathBuf::from(FALLBACK_STATE_FILE));
    let repository = FileStateRepository::new(state_path);
    let state = repository.load().await?.unwrap_or_default();
    tracing::info!(path = %repository.path().display(), projects = state.projects.len(), "local state ready");

    let clock = Arc::new(SystemClock::new());
    let store = LocalStore::new(state, clock.clone(), Arc::new(TracingNotifier)).into_shared();

    let identity = Arc::new(LocalIdentityProvider::new(config.user));
    let client = Arc::new(SyncClient::new(
        Arc::new(MemoryDocumentStore::new()),
        identity,
        clock,
    ));

    let events = client.subscribe_events();
    let session = tokio::spawn(SyncOrchestrator::new(Arc::clone(&client), Arc::clone(&store)).run(events));
    client.sign_in(AuthProviderKind::Google).await?;

    match tokio::time::timeout(SESSION_TIMEOUT, session).await {
        Ok(joined) => {
            let phase = joined??;
            tracing::info!(?phase, "sync session finished");
        }
        Err(_) => tracing::warn!("sync session did not settle in time"),
    }

    repository.save(store.lock().await.state()).await?;
    client.shutdown().await;
    Ok(())
}
