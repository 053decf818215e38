//! Project mutations.

use courier_domain::{
    DomainError, DomainResult, EntityKind, Project, generate_id, is_duplicate_name,
    is_duplicate_name_except,
};

use super::{LocalStore, Outcome, check_index};

impl LocalStore {
    /// Adds a project at the front of the list and marks it as pending.
    ///
    /// A project without id gets a fresh one.
    pub fn add_project(&mut self, mut project: Project) -> Outcome {
        let result = if is_duplicate_name(&self.state.projects, &project.name) {
            Err(duplicate(&project.name))
        } else {
            if project.id.is_empty() {
                project.id = generate_id();
            }
            project.adding = Some(true);
            project.updated_at = Some(self.now());
            tracing::debug!(id = %project.id, name = %project.name, "project added");
            self.state.projects.insert(0, project);
            Ok(())
        };
        self.settle(result)
    }

    /// Renames the project at `index`.
    pub fn edit_project(&mut self, index: usize, name: &str) -> Outcome {
        let result = self.try_edit_project(index, name);
        self.settle(result)
    }

    fn try_edit_project(&mut self, index: usize, name: &str) -> DomainResult<()> {
        check_index("project", index, self.state.projects.len())?;
        if is_duplicate_name_except(&self.state.projects, name, index) {
            return Err(duplicate(name));
        }
        let now = self.now();
        let project = &mut self.state.projects[index];
        project.name = name.to_string();
        project.editing = Some(true);
        project.updated_at = Some(now);
        Ok(())
    }

    /// Removes the project at `index`, clearing the selection if it pointed there.
    pub fn remove_project(&mut self, index: usize) -> Outcome {
        if let Err(error) = check_index("project", index, self.state.projects.len()) {
            return self.settle(Err(error));
        }
        let removed = self.state.projects.remove(index);
        if self.current_project_id() == Some(removed.id.as_str()) {
            self.clear_current_project();
        }
        tracing::debug!(id = %removed.id, "project removed");
        Outcome::Applied
    }

    /// Replaces every project, e.g. with a remote snapshot.
    pub fn replace_projects(&mut self, projects: Vec<Project>) {
        self.state.projects = projects;
    }

    /// Clears the pending-change markers once projects reached the remote.
    pub fn clear_project_markers(&mut self) {
        for project in &mut self.state.projects {
            project.adding = None;
            project.editing = None;
        }
    }
}

fn duplicate(name: &str) -> DomainError {
    DomainError::DuplicateName {
        kind: EntityKind::Project,
        name: name.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::test_support::{empty_state, fixed_now, store_with};
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_project_goes_first_and_is_marked() {
        let (mut store, _) = store_with(empty_state());
        assert!(store.add_project(Project::new("First")).is_applied());
        assert!(store.add_project(Project::new("Second")).is_applied());

        let names: Vec<_> = store.projects().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Second", "First"]);
        let newest = &store.projects()[0];
        assert_eq!(newest.adding, Some(true));
        assert_eq!(newest.updated_at, Some(fixed_now()));
    }

    #[test]
    fn add_project_generates_missing_id() {
        let (mut store, _) = store_with(empty_state());
        let mut project = Project::new("No id");
        project.id.clear();
        assert!(store.add_project(project).is_applied());
        assert!(!store.projects()[0].id.is_empty());
    }

    #[test]
    fn duplicate_project_is_rejected_and_notified() {
        let (mut store, notifier) = store_with(empty_state());
        assert!(store.add_project(Project::new("Foo")).is_applied());

        let outcome = store.add_project(Project::new("foo"));
        assert_eq!(
            outcome,
            Outcome::Rejected(DomainError::DuplicateName {
                kind: EntityKind::Project,
                name: "foo".to_string(),
            })
        );
        assert_eq!(store.projects().len(), 1);
        assert_eq!(notifier.messages(), vec!["Duplicate project".to_string()]);
    }

    #[test]
    fn edit_project_allows_renaming_itself() {
        let (mut store, _) = store_with(empty_state());
        assert!(store.add_project(Project::new("Foo")).is_applied());
        assert!(store.add_project(Project::new("Bar")).is_applied());

        assert!(store.edit_project(1, "FOO").is_applied());
        assert_eq!(store.projects()[1].name, "FOO");
        assert_eq!(store.projects()[1].editing, Some(true));

        let outcome = store.edit_project(0, "foo");
        assert!(!outcome.is_applied());
        assert_eq!(store.projects()[0].name, "Bar");
    }

    #[test]
    fn edit_project_out_of_range() {
        let (mut store, notifier) = store_with(empty_state());
        let outcome = store.edit_project(3, "X");
        assert_eq!(outcome.rejection(), Some(&DomainError::index("project", 3, 0)));
        assert!(notifier.messages().is_empty());
    }

    #[test]
    fn removing_current_project_clears_selection() {
        let (mut store, _) = store_with(empty_state());
        assert!(store.add_project(Project::new("Foo")).is_applied());
        let id = store.projects()[0].id.clone();
        assert!(store.set_current_project(Some(id)).is_applied());

        assert!(store.remove_project(0).is_applied());
        assert!(store.projects().is_empty());
        assert!(store.current_project_id().is_none());
    }

    #[test]
    fn clear_markers_resets_pending_flags() {
        let (mut store, _) = store_with(empty_state());
        assert!(store.add_project(Project::new("Foo")).is_applied());
        store.clear_project_markers();
        assert!(!store.projects()[0].is_dirty());
    }
}
