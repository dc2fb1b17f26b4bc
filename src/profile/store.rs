//! Shared profile storage.
//!
//! Profiles are keyed by page id and created lazily on first reference.
//! The store is read and written from the UI-originating context under a
//! map-level lock; the worker copies the active page's profile at
//! configuration time, so in-flight hardware operations never observe
//! concurrent edits.

use super::{normalize_page_id, CaptureProfile};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Thread-safe map from page id to [`CaptureProfile`].
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    inner: Arc<Mutex<HashMap<String, CaptureProfile>>>,
}

impl ProfileStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the page's profile, creating it if absent.
    pub fn get(&self, page_id: &str) -> CaptureProfile {
        let page_id = normalize_page_id(Some(page_id));
        let mut map = self.inner.lock().expect("profile store poisoned");
        map.entry(page_id).or_default().clone()
    }

    /// Mutates the page's profile in place, creating it if absent.
    ///
    /// Returns a copy of the profile after the edit.
    pub fn update<F>(&self, page_id: &str, edit: F) -> CaptureProfile
    where
        F: FnOnce(&mut CaptureProfile),
    {
        let page_id = normalize_page_id(Some(page_id));
        let mut map = self.inner.lock().expect("profile store poisoned");
        let profile = map.entry(page_id).or_default();
        edit(profile);
        profile.clone()
    }

    /// Removes a page's profile on explicit disposal.
    pub fn remove(&self, page_id: &str) {
        let page_id = normalize_page_id(Some(page_id));
        let mut map = self.inner.lock().expect("profile store poisoned");
        map.remove(&page_id);
    }

    /// Number of stored profiles.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("profile store poisoned").len()
    }

    /// Whether any page has a profile yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_creation() {
        let store = ProfileStore::new();
        assert!(store.is_empty());

        let profile = store.get("scan");
        assert!(profile.auto_exposure);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_empty_page_id_maps_to_default() {
        let store = ProfileStore::new();
        store.update("", |p| p.hdr = true);
        assert!(store.get("default").hdr);
    }

    #[test]
    fn test_update_is_isolated_per_page() {
        let store = ProfileStore::new();
        store.update("a", |p| p.set_zoom(3.0));
        store.update("b", |p| p.set_zoom(2.0));

        assert_eq!(store.get("a").zoom, 3.0);
        assert_eq!(store.get("b").zoom, 2.0);
    }

    #[test]
    fn test_remove_resets_to_defaults() {
        let store = ProfileStore::new();
        store.update("scan", |p| p.hdr = true);
        store.remove("scan");
        assert!(!store.get("scan").hdr);
    }

    #[test]
    fn test_returned_copy_is_a_snapshot() {
        let store = ProfileStore::new();
        let snapshot = store.get("scan");
        store.update("scan", |p| p.set_zoom(4.0));
        assert_eq!(snapshot.zoom, 1.0);
    }
}
