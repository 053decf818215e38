//! Where things live in the remote store.

use courier_domain::Project;

use crate::ports::{CollectionRef, DocumentRef};

/// Id of the single document holding the synced collections or environments.
pub const SYNC_DOCUMENT: &str = "sync";

/// The per-user namespace: `users/{uid}` and its sub-collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNamespace {
    user: DocumentRef,
}

impl UserNamespace {
    /// The namespace of `uid`.
    #[must_use]
    pub fn new(uid: &str) -> Self {
        Self {
            user: CollectionRef::root("users").doc(uid),
        }
    }

    /// The profile document.
    #[must_use]
    pub const fn profile(&self) -> &DocumentRef {
        &self.user
    }

    /// Activity feed entries.
    #[must_use]
    pub fn feeds(&self) -> CollectionRef {
        self.user.collection("feeds")
    }

    /// Remote settings, one document per setting name.
    #[must_use]
    pub fn settings(&self) -> CollectionRef {
        self.user.collection("settings")
    }

    /// Request history entries.
    #[must_use]
    pub fn history(&self) -> CollectionRef {
        self.user.collection("history")
    }

    /// Top-level collections slot.
    #[must_use]
    pub fn collections(&self) -> CollectionRef {
        self.user.collection("collections")
    }

    /// Top-level environments slot.
    #[must_use]
    pub fn environments(&self) -> CollectionRef {
        self.user.collection("environments")
    }

    /// Projects, one document per project id.
    #[must_use]
    pub fn projects(&self) -> CollectionRef {
        self.user.collection("projects")
    }
}

/// Where synced collections and environments are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionsLocation {
    /// The `sync` document of the top-level slot.
    TopLevel,
    /// Nested in the document of the given project.
    UnderProject(String),
}

impl CollectionsLocation {
    /// Resolves the location for the selected project.
    #[must_use]
    pub fn resolve(current_project: Option<&Project>) -> Self {
        current_project.map_or(Self::TopLevel, |project| {
            Self::UnderProject(project.id.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_paths() {
        let ns = UserNamespace::new("u1");
        assert_eq!(ns.profile().to_string(), "users/u1");
        assert_eq!(ns.projects().path(), "users/u1/projects");
        assert_eq!(ns.settings().doc("syncProjects").to_string(), "users/u1/settings/syncProjects");
    }

    #[test]
    fn location_follows_project() {
        assert_eq!(CollectionsLocation::resolve(None), CollectionsLocation::TopLevel);
        let mut project = Project::new("P");
        project.id = "p1".to_string();
        assert_eq!(
            CollectionsLocation::resolve(Some(&project)),
            CollectionsLocation::UnderProject("p1".to_string())
        );
    }
}
