//! Pure lookups over collection trees.
//!
//! Lookups are split in two steps: [`locate_folder`] walks the tree and
//! returns a [`FolderPath`], and [`Folder::at`]/[`Folder::at_mut`] resolve a
//! path to a node. Mutations always act on a resolved path, never while
//! searching.
//!
//! Folder names are matched exactly and the search is depth-first pre-order,
//! so when several folders share a name the first one reached wins. This is
//! intentional: folder names are expected to be unique within a traversal.

use crate::error::{DomainError, DomainResult};
use crate::project::{Folder, Request};

/// Anything that carries a user-visible name.
pub trait Named {
    /// Returns the name.
    fn name(&self) -> &str;
}

/// Returns true if some sibling has `candidate` as name, ignoring case.
#[must_use]
pub fn is_duplicate_name<T: Named>(siblings: &[T], candidate: &str) -> bool {
    let candidate = candidate.to_lowercase();
    siblings
        .iter()
        .any(|sibling| sibling.name().to_lowercase() == candidate)
}

/// Same as [`is_duplicate_name`], ignoring the sibling at position `skip`.
///
/// Used when editing an entity in place: the entity itself never counts as
/// a duplicate of its own new name.
#[must_use]
pub fn is_duplicate_name_except<T: Named>(siblings: &[T], candidate: &str, skip: usize) -> bool {
    let candidate = candidate.to_lowercase();
    siblings
        .iter()
        .enumerate()
        .any(|(index, sibling)| index != skip && sibling.name().to_lowercase() == candidate)
}

/// Position of a folder inside a tree: child indices walked from the root.
///
/// The empty path addresses the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FolderPath(Vec<usize>);

impl FolderPath {
    /// The path of the root.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Builds a path from child indices.
    #[must_use]
    pub const fn from_indices(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Returns true if the path addresses the root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the child indices.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Returns the path of the containing folder, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0
            .split_last()
            .map(|(_, parent)| Self(parent.to_vec()))
    }

    /// Returns the index of this folder within its parent, or `None` at the root.
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Returns the path of the `index`-th child of this folder.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }
}

impl Folder {
    /// Resolves a path relative to this folder.
    #[must_use]
    pub fn at(&self, path: &FolderPath) -> Option<&Self> {
        path.0
            .iter()
            .try_fold(self, |folder, &index| folder.folders.get(index))
    }

    /// Resolves a path relative to this folder, mutably.
    pub fn at_mut(&mut self, path: &FolderPath) -> Option<&mut Self> {
        path.0
            .iter()
            .try_fold(self, |folder, &index| folder.folders.get_mut(index))
    }
}

/// Finds the first folder named `target`, depth-first pre-order, starting at
/// `root` itself.
#[must_use]
pub fn locate_folder(root: &Folder, target: &str) -> Option<FolderPath> {
    fn walk(folder: &Folder, target: &str, path: &mut Vec<usize>) -> bool {
        if folder.name == target {
            return true;
        }
        for (index, child) in folder.folders.iter().enumerate() {
            path.push(index);
            if walk(child, target, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    walk(root, target, &mut path).then(|| FolderPath(path))
}

/// Returns the folder named `target`, or `root` itself when it matches.
#[must_use]
pub fn find_folder<'a>(target: &str, root: &'a Folder) -> Option<&'a Folder> {
    locate_folder(root, target).and_then(|path| root.at(&path))
}

/// Mutable counterpart of [`find_folder`].
pub fn find_folder_mut<'a>(target: &str, root: &'a mut Folder) -> Option<&'a mut Folder> {
    let path = locate_folder(root, target)?;
    root.at_mut(&path)
}

/// Returns the folder containing the folder named `target`.
///
/// Yields `None` both when nothing matches and when `root` itself is the
/// match, since the root has no parent.
#[must_use]
pub fn find_parent_folder<'a>(target: &str, root: &'a Folder) -> Option<&'a Folder> {
    let parent = locate_folder(root, target)?.parent()?;
    root.at(&parent)
}

/// Mutable counterpart of [`find_parent_folder`].
pub fn find_parent_folder_mut<'a>(target: &str, root: &'a mut Folder) -> Option<&'a mut Folder> {
    let parent = locate_folder(root, target)?.parent()?;
    root.at_mut(&parent)
}

/// Removes and returns the request at `index` of the folder named
/// `folder_name`.
///
/// Returns `Ok(None)` when no folder matches and leaves the tree untouched.
///
/// # Errors
/// Returns [`DomainError::IndexOutOfRange`] when the folder exists but has no
/// request at `index`.
pub fn take_request(
    folder_name: &str,
    root: &mut Folder,
    index: usize,
) -> DomainResult<Option<Request>> {
    let Some(folder) = find_folder_mut(folder_name, root) else {
        return Ok(None);
    };
    let len = folder.requests.len();
    if index >= len {
        return Err(DomainError::index("request", index, len));
    }
    Ok(Some(folder.requests.remove(index)))
}
