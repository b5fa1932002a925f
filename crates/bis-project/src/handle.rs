//! Shared project store handle.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::store::ProjectStore;

/// Cheaply clonable handle to one open project store.
///
/// The handle is passed explicitly to every collaborator that touches the
/// project (operators, serializers, the shell) so that no component holds
/// ambient store state. Identity of the underlying store is observable
/// via [`ProjectHandle::ptr_eq`], which is what the serializer's
/// cross-wiring contract check compares.
///
/// A serialization pass owns the store exclusively for its duration; the
/// lock exists so the handle is `Send + Sync`, not to coordinate
/// concurrent passes. A poisoned lock is recovered by adopting the inner
/// value.
#[derive(Debug, Clone)]
pub struct ProjectHandle(Arc<RwLock<ProjectStore>>);

impl ProjectHandle {
    /// Wrap a store in a shared handle.
    pub fn new(store: ProjectStore) -> Self {
        Self(Arc::new(RwLock::new(store)))
    }

    /// Whether two handles refer to the same open store.
    pub fn ptr_eq(&self, other: &ProjectHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Shared read access to the store.
    pub fn read(&self) -> RwLockReadGuard<'_, ProjectStore> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive write access to the store.
    pub fn write(&self) -> RwLockWriteGuard<'_, ProjectStore> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move the store out of the handle, cloning if it is still shared.
    pub fn into_store(self) -> ProjectStore {
        match Arc::try_unwrap(self.0) {
            Ok(lock) => lock.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => shared.read().unwrap_or_else(PoisonError::into_inner).clone(),
        }
    }
}

impl From<ProjectStore> for ProjectHandle {
    fn from(store: ProjectStore) -> Self {
        Self::new(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_identity() {
        let handle = ProjectHandle::new(ProjectStore::new());
        let clone = handle.clone();
        assert!(handle.ptr_eq(&clone));
    }

    #[test]
    fn test_distinct_handles_differ() {
        let a = ProjectHandle::new(ProjectStore::new());
        let b = ProjectHandle::new(ProjectStore::new());
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_writes_are_visible_through_clones() {
        let handle = ProjectHandle::new(ProjectStore::new());
        let clone = handle.clone();
        handle
            .write()
            .write_text(&ProjectStore::root(), "note", "hi")
            .unwrap();
        assert_eq!(
            clone.read().read_text(&ProjectStore::root(), "note").unwrap(),
            "hi"
        );
    }
}
