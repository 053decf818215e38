//! Events published by the sync client.

use courier_domain::{Project, Setting};

/// A snapshot delivered by one of the live subscriptions.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The settings subscription delivered a snapshot.
    SettingsLoaded(Vec<Setting>),
    /// The projects subscription delivered a snapshot, newest first.
    ProjectsLoaded(Vec<Project>),
}
