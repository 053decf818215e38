//! Collection, folder and request mutations.
//!
//! Folders are addressed by name within one collection tree. The lookup is
//! depth-first pre-order, so folder names are kept unique per collection.
//! Requests are addressed by `(collection index, folder name, position)`
//! where a missing folder name means the collection root.

use courier_domain::{
    Collection, DomainError, DomainResult, EntityKind, Folder, FolderPath, Request,
    find_folder_mut, is_duplicate_name, is_duplicate_name_except, locate_folder,
};

use super::{LocalStore, Outcome, check_index};

/// Arguments of [`LocalStore::save_request_as`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequestAs {
    /// The request to store.
    pub request: Request,
    /// Target collection.
    pub collection_index: usize,
    /// Target folder, or the collection root.
    pub folder: Option<String>,
    /// Position to overwrite; `None` appends.
    pub request_index: Option<usize>,
}

/// Arguments of [`LocalStore::move_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    /// Source collection.
    pub from_collection: usize,
    /// Source folder, or the collection root.
    pub from_folder: Option<String>,
    /// Position of the request in the source folder.
    pub request_index: usize,
    /// Destination collection.
    pub to_collection: usize,
    /// Destination folder, or the collection root.
    pub to_folder: Option<String>,
}

impl LocalStore {
    /// Replaces the active collections.
    pub fn replace_collections(&mut self, collections: Vec<Collection>) {
        *self.active_collections_mut() = collections;
    }

    /// Appends imported collections.
    ///
    /// The whole batch is rejected if any name collides with an existing
    /// collection.
    pub fn import_collections(&mut self, imported: Vec<Collection>) -> Outcome {
        let collision = imported
            .iter()
            .find(|collection| is_duplicate_name(self.active_collections(), &collection.name))
            .map(|collection| duplicate(EntityKind::Collection, &collection.name));
        if let Some(error) = collision {
            return self.settle(Err(error));
        }
        tracing::debug!(count = imported.len(), "collections imported");
        self.active_collections_mut().extend(imported);
        Outcome::Applied
    }

    /// Appends a collection.
    pub fn add_collection(&mut self, collection: Collection) -> Outcome {
        if is_duplicate_name(self.active_collections(), &collection.name) {
            return self.settle(Err(duplicate(EntityKind::Collection, &collection.name)));
        }
        self.active_collections_mut().push(collection);
        Outcome::Applied
    }

    /// Replaces the collection at `index`.
    pub fn edit_collection(&mut self, index: usize, collection: Collection) -> Outcome {
        let result = self.try_edit_collection(index, collection);
        self.settle(result)
    }

    fn try_edit_collection(&mut self, index: usize, collection: Collection) -> DomainResult<()> {
        let collections = self.active_collections_mut();
        check_index("collection", index, collections.len())?;
        if is_duplicate_name_except(collections, &collection.name, index) {
            return Err(duplicate(EntityKind::Collection, &collection.name));
        }
        collections[index] = collection;
        Ok(())
    }

    /// Removes the collection at `index`.
    pub fn remove_collection(&mut self, index: usize) -> Outcome {
        let collections = self.active_collections_mut();
        let result = check_index("collection", index, collections.len()).map(|()| {
            collections.remove(index);
        });
        self.settle(result)
    }

    /// Adds an empty folder named `name` under `parent`.
    ///
    /// `parent` is a folder name or the collection's own name.
    pub fn add_folder(&mut self, collection_index: usize, parent: &str, name: &str) -> Outcome {
        let result = self.try_add_folder(collection_index, parent, name);
        self.settle(result)
    }

    fn try_add_folder(&mut self, collection_index: usize, parent: &str, name: &str) -> DomainResult<()> {
        let collection = self.collection_mut(collection_index)?;
        if locate_folder(collection, name).is_some() {
            return Err(duplicate(EntityKind::Folder, name));
        }
        let parent = find_folder_mut(parent, collection)
            .ok_or_else(|| DomainError::FolderNotFound(parent.to_string()))?;
        parent.folders.push(Folder::new(name));
        Ok(())
    }

    /// Replaces the folder named `folder_name` in place.
    pub fn edit_folder(&mut self, collection_index: usize, folder_name: &str, folder: Folder) -> Outcome {
        let result = self.try_edit_folder(collection_index, folder_name, folder);
        self.settle(result)
    }

    fn try_edit_folder(
        &mut self,
        collection_index: usize,
        folder_name: &str,
        folder: Folder,
    ) -> DomainResult<()> {
        let collection = self.collection_mut(collection_index)?;
        let not_found = || DomainError::FolderNotFound(folder_name.to_string());
        let path = locate_folder(collection, folder_name)
            .filter(|path| !path.is_root())
            .ok_or_else(not_found)?;
        if let Some(existing) = locate_folder(collection, &folder.name) {
            if existing != path {
                return Err(duplicate(EntityKind::Folder, &folder.name));
            }
        }
        let slot = collection.at_mut(&path).ok_or_else(not_found)?;
        *slot = folder;
        Ok(())
    }

    /// Removes the folder named `folder_name` with everything inside it.
    pub fn remove_folder(&mut self, collection_index: usize, folder_name: &str) -> Outcome {
        let result = self.try_remove_folder(collection_index, folder_name);
        self.settle(result)
    }

    fn try_remove_folder(&mut self, collection_index: usize, folder_name: &str) -> DomainResult<()> {
        let collection = self.collection_mut(collection_index)?;
        let not_found = || DomainError::FolderNotFound(folder_name.to_string());
        let path = locate_folder(collection, folder_name)
            .filter(|path| !path.is_root())
            .ok_or_else(not_found)?;
        let (Some(parent_path), Some(position)) = (path.parent(), path.last()) else {
            return Err(not_found());
        };
        let parent = collection.at_mut(&parent_path).ok_or_else(not_found)?;
        parent.folders.remove(position);
        Ok(())
    }

    /// Replaces the request at `request_index`.
    pub fn edit_request(
        &mut self,
        collection_index: usize,
        folder: Option<&str>,
        request_index: usize,
        request: Request,
    ) -> Outcome {
        let result = self.folder_mut(collection_index, folder).and_then(|folder| {
            check_index("request", request_index, folder.requests.len())?;
            folder.requests[request_index] = request;
            Ok(())
        });
        self.settle(result)
    }

    /// Stores a request at an explicit position or appends it.
    ///
    /// A position equal to the folder length appends.
    pub fn save_request_as(&mut self, save: SaveRequestAs) -> Outcome {
        let SaveRequestAs {
            request,
            collection_index,
            folder,
            request_index,
        } = save;
        let result = self
            .folder_mut(collection_index, folder.as_deref())
            .and_then(|folder| {
                let len = folder.requests.len();
                match request_index {
                    Some(index) if index < len => folder.requests[index] = request,
                    Some(index) if index > len => {
                        return Err(DomainError::index("request", index, len));
                    }
                    _ => folder.requests.push(request),
                }
                Ok(())
            });
        self.settle(result)
    }

    /// Removes the request at `request_index`.
    pub fn remove_request(
        &mut self,
        collection_index: usize,
        folder: Option<&str>,
        request_index: usize,
    ) -> Outcome {
        let result = self.folder_mut(collection_index, folder).and_then(|folder| {
            check_index("request", request_index, folder.requests.len())?;
            folder.requests.remove(request_index);
            Ok(())
        });
        self.settle(result)
    }

    /// Moves a request to the end of another folder.
    ///
    /// The destination is resolved before the source is touched, so a
    /// missing destination leaves the request where it was.
    pub fn move_request(&mut self, request: MoveRequest) -> Outcome {
        let result = self.try_move_request(&request);
        self.settle(result)
    }

    fn try_move_request(&mut self, movement: &MoveRequest) -> DomainResult<()> {
        let destination = {
            let collections = self.active_collections();
            let len = collections.len();
            let collection = collections
                .get(movement.to_collection)
                .ok_or(DomainError::index("collection", movement.to_collection, len))?;
            match movement.to_folder.as_deref() {
                None => FolderPath::root(),
                Some(name) => locate_folder(collection, name)
                    .ok_or_else(|| DomainError::FolderNotFound(name.to_string()))?,
            }
        };

        let source = self.folder_mut(movement.from_collection, movement.from_folder.as_deref())?;
        check_index("request", movement.request_index, source.requests.len())?;
        let request = source.requests.remove(movement.request_index);

        // Removing a request never reshapes the folder tree, so the
        // destination path is still valid here.
        let target = self
            .collection_mut(movement.to_collection)?
            .at_mut(&destination)
            .ok_or_else(|| DomainError::FolderNotFound(String::new()))?;
        target.requests.push(request);
        Ok(())
    }

    fn collection_mut(&mut self, index: usize) -> DomainResult<&mut Collection> {
        let collections = self.active_collections_mut();
        let len = collections.len();
        collections
            .get_mut(index)
            .ok_or(DomainError::index("collection", index, len))
    }

    fn folder_mut(&mut self, collection_index: usize, folder: Option<&str>) -> DomainResult<&mut Folder> {
        let collection = self.collection_mut(collection_index)?;
        match folder {
            None => Ok(collection),
            Some(name) => find_folder_mut(name, collection)
                .ok_or_else(|| DomainError::FolderNotFound(name.to_string())),
        }
    }
}

fn duplicate(kind: EntityKind, name: &str) -> DomainError {
    DomainError::DuplicateName {
        kind,
        name: name.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::test_support::{empty_state, store_with};
    use super::*;
    use crate::store::LocalState;
    use pretty_assertions::assert_eq;

    fn state() -> LocalState {
        let mut state = empty_state();
        state.collections = vec![
            Collection::new("A")
                .with_request(Request::new("ping"))
                .with_request(Request::new("pong"))
                .with_folder(Folder::new("Users").with_folder(Folder::new("Admins"))),
            Collection::new("B"),
        ];
        state
    }

    fn names(folder: &Folder) -> Vec<&str> {
        folder.requests.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn import_rejects_whole_batch_on_collision() {
        let (mut store, notifier) = store_with(state());
        let outcome = store.import_collections(vec![Collection::new("C"), Collection::new("b")]);
        assert!(!outcome.is_applied());
        assert_eq!(store.active_collections().len(), 2);
        assert_eq!(notifier.messages(), vec!["Duplicate collection".to_string()]);

        assert!(store
            .import_collections(vec![Collection::new("C"), Collection::new("D")])
            .is_applied());
        assert_eq!(store.active_collections().len(), 4);
    }

    #[test]
    fn add_and_edit_collection_check_names() {
        let (mut store, _) = store_with(state());
        assert!(!store.add_collection(Collection::new("a")).is_applied());
        assert!(store.add_collection(Collection::new("C")).is_applied());

        assert!(store.edit_collection(0, Collection::new("a")).is_applied());
        assert!(!store.edit_collection(0, Collection::new("B")).is_applied());
        assert_eq!(store.active_collections()[0].name, "a");
    }

    #[test]
    fn remove_collection_out_of_range_is_rejected() {
        let (mut store, _) = store_with(state());
        assert!(!store.remove_collection(5).is_applied());
        assert!(store.remove_collection(1).is_applied());
        assert_eq!(store.active_collections().len(), 1);
    }

    #[test]
    fn add_folder_under_nested_parent() {
        let (mut store, _) = store_with(state());
        assert!(store.add_folder(0, "Admins", "Owners").is_applied());
        assert!(store.add_folder(0, "A", "Groups").is_applied());

        let collection = &store.active_collections()[0];
        assert_eq!(collection.folders[0].folders[0].folders[0].name, "Owners");
        assert_eq!(collection.folders[1].name, "Groups");
    }

    #[test]
    fn add_folder_rejects_name_already_in_tree() {
        let (mut store, notifier) = store_with(state());
        let outcome = store.add_folder(0, "A", "Admins");
        assert!(!outcome.is_applied());
        assert_eq!(notifier.messages(), vec!["Duplicate folder".to_string()]);
    }

    #[test]
    fn add_folder_missing_parent() {
        let (mut store, _) = store_with(state());
        let outcome = store.add_folder(0, "Nope", "New");
        assert_eq!(
            outcome.rejection(),
            Some(&DomainError::FolderNotFound("Nope".to_string()))
        );
    }

    #[test]
    fn edit_and_remove_folder() {
        let (mut store, _) = store_with(state());
        assert!(store
            .edit_folder(0, "Admins", Folder::new("Root users"))
            .is_applied());
        assert_eq!(
            store.active_collections()[0].folders[0].folders[0].name,
            "Root users"
        );

        assert!(!store.edit_folder(0, "Users", Folder::new("Root users")).is_applied());
        assert!(!store.edit_folder(0, "A", Folder::new("Renamed")).is_applied());

        assert!(store.remove_folder(0, "Users").is_applied());
        assert!(store.active_collections()[0].folders.is_empty());
    }

    #[test]
    fn edit_save_and_remove_requests() {
        let (mut store, _) = store_with(state());
        assert!(store
            .edit_request(0, None, 1, Request::new("pong v2"))
            .is_applied());
        assert!(store
            .save_request_as(SaveRequestAs {
                request: Request::new("list"),
                collection_index: 0,
                folder: Some("Users".to_string()),
                request_index: None,
            })
            .is_applied());
        assert!(!store
            .save_request_as(SaveRequestAs {
                request: Request::new("far"),
                collection_index: 0,
                folder: None,
                request_index: Some(7),
            })
            .is_applied());
        assert!(store.remove_request(0, None, 0).is_applied());

        let collection = &store.active_collections()[0];
        assert_eq!(names(collection), vec!["pong v2"]);
        assert_eq!(names(&collection.folders[0]), vec!["list"]);
    }

    #[test]
    fn move_request_between_collections() {
        let (mut store, _) = store_with(state());
        let outcome = store.move_request(MoveRequest {
            from_collection: 0,
            from_folder: None,
            request_index: 0,
            to_collection: 1,
            to_folder: None,
        });
        assert!(outcome.is_applied());
        assert_eq!(names(&store.active_collections()[0]), vec!["pong"]);
        assert_eq!(names(&store.active_collections()[1]), vec!["ping"]);
    }

    #[test]
    fn move_request_into_nested_folder_of_same_collection() {
        let (mut store, _) = store_with(state());
        let outcome = store.move_request(MoveRequest {
            from_collection: 0,
            from_folder: Some("A".to_string()),
            request_index: 1,
            to_collection: 0,
            to_folder: Some("Admins".to_string()),
        });
        assert!(outcome.is_applied());
        let collection = &store.active_collections()[0];
        assert_eq!(names(collection), vec!["ping"]);
        assert_eq!(names(&collection.folders[0].folders[0]), vec!["pong"]);
    }

    #[test]
    fn move_request_to_missing_folder_keeps_source() {
        let (mut store, _) = store_with(state());
        let outcome = store.move_request(MoveRequest {
            from_collection: 0,
            from_folder: None,
            request_index: 0,
            to_collection: 1,
            to_folder: Some("Nowhere".to_string()),
        });
        assert_eq!(
            outcome.rejection(),
            Some(&DomainError::FolderNotFound("Nowhere".to_string()))
        );
        assert_eq!(names(&store.active_collections()[0]), vec!["ping", "pong"]);
        assert!(store.active_collections()[1].requests.is_empty());
    }

    #[test]
    fn mutations_target_current_project() {
        let mut state = state();
        let project = courier_domain::Project::new("P");
        let id = project.id.clone();
        state.projects.push(project);
        let (mut store, _) = store_with(state);
        assert!(store.set_current_project(Some(id)).is_applied());

        assert!(store.add_collection(Collection::new("A")).is_applied());
        assert_eq!(store.active_collections().len(), 1);
        assert_eq!(store.state().collections.len(), 2);
    }
}
