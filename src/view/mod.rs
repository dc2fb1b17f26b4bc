//! View bindings.
//!
//! The embeddable preview widget lives outside this crate; what the
//! coordinator tracks is the binding from an opaque view id to its
//! surface state, facing hint and owning page. Surface availability
//! notifications arrive from the host and gate whether a session can
//! open against a view.

use crate::geometry::Size;
use crate::profile::CameraSelector;
use std::collections::HashMap;

/// Lifecycle state of a view's rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    /// Created but not yet backed by a texture.
    Pending,
    /// Backed by a texture of the given size.
    Ready(Size),
    /// Torn down by the host.
    Destroyed,
}

/// One registered preview view.
#[derive(Debug, Clone)]
pub struct ViewBinding {
    /// Opaque host-assigned view id.
    pub view_id: i64,
    /// Page the view renders for.
    pub page_id: String,
    /// Facing requested at creation.
    pub facing: CameraSelector,
    /// Current surface state.
    pub surface: SurfaceState,
}

impl ViewBinding {
    /// Whether the view can back a capture session right now.
    pub fn is_ready(&self) -> bool {
        matches!(self.surface, SurfaceState::Ready(_))
    }

    /// The surface size, when ready.
    pub fn surface_size(&self) -> Option<Size> {
        match self.surface {
            SurfaceState::Ready(size) => Some(size),
            _ => None,
        }
    }
}

/// Registry of view bindings keyed by view id.
#[derive(Debug, Default)]
pub struct ViewRegistry {
    views: HashMap<i64, ViewBinding>,
}

impl ViewRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a binding; a replaced binding loses its
    /// surface state.
    pub fn register(&mut self, view_id: i64, page_id: String, facing: CameraSelector) {
        if self.views.contains_key(&view_id) {
            tracing::debug!(view_id, "replacing existing view binding");
        }
        self.views.insert(
            view_id,
            ViewBinding {
                view_id,
                page_id,
                facing,
                surface: SurfaceState::Pending,
            },
        );
    }

    /// Marks a view's surface as available at the given size.
    pub fn surface_available(&mut self, view_id: i64, size: Size) {
        if let Some(view) = self.views.get_mut(&view_id) {
            view.surface = SurfaceState::Ready(size);
        }
    }

    /// Marks a view's surface as resized.
    pub fn surface_resized(&mut self, view_id: i64, size: Size) {
        if let Some(view) = self.views.get_mut(&view_id) {
            if view.is_ready() {
                view.surface = SurfaceState::Ready(size);
            }
        }
    }

    /// Marks a view's surface as destroyed.
    pub fn surface_destroyed(&mut self, view_id: i64) {
        if let Some(view) = self.views.get_mut(&view_id) {
            view.surface = SurfaceState::Destroyed;
        }
    }

    /// Moves an existing binding to a different page, keeping its
    /// surface state.
    pub fn rebind_page(&mut self, view_id: i64, page_id: String) {
        if let Some(view) = self.views.get_mut(&view_id) {
            view.page_id = page_id;
        }
    }

    /// Looks up a binding.
    pub fn get(&self, view_id: i64) -> Option<&ViewBinding> {
        self.views.get(&view_id)
    }

    /// Removes a binding.
    pub fn remove(&mut self, view_id: i64) -> Option<ViewBinding> {
        self.views.remove(&view_id)
    }

    /// Removes every binding owned by a page; returns the removed ids.
    pub fn remove_page(&mut self, page_id: &str) -> Vec<i64> {
        let ids: Vec<i64> = self
            .views
            .values()
            .filter(|v| v.page_id == page_id)
            .map(|v| v.view_id)
            .collect();
        for id in &ids {
            self.views.remove(id);
        }
        ids
    }

    /// First ready view bound to the given page.
    pub fn ready_view_for_page(&self, page_id: &str) -> Option<&ViewBinding> {
        self.views
            .values()
            .find(|v| v.page_id == page_id && v.is_ready())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_lifecycle() {
        let mut registry = ViewRegistry::new();
        registry.register(1, "default".into(), CameraSelector::Rear);
        assert!(!registry.get(1).unwrap().is_ready());

        registry.surface_available(1, Size::new(1080, 1920));
        assert_eq!(
            registry.get(1).unwrap().surface_size(),
            Some(Size::new(1080, 1920))
        );

        registry.surface_destroyed(1);
        assert!(!registry.get(1).unwrap().is_ready());
    }

    #[test]
    fn test_resize_requires_ready_surface() {
        let mut registry = ViewRegistry::new();
        registry.register(1, "default".into(), CameraSelector::Rear);
        registry.surface_resized(1, Size::new(720, 1280));
        assert!(!registry.get(1).unwrap().is_ready());
    }

    #[test]
    fn test_remove_page_drops_all_views() {
        let mut registry = ViewRegistry::new();
        registry.register(1, "scan".into(), CameraSelector::Rear);
        registry.register(2, "scan".into(), CameraSelector::Front);
        registry.register(3, "other".into(), CameraSelector::Rear);

        let mut removed = registry.remove_page("scan");
        removed.sort_unstable();
        assert_eq!(removed, vec![1, 2]);
        assert!(registry.get(3).is_some());
    }

    #[test]
    fn test_ready_view_for_page() {
        let mut registry = ViewRegistry::new();
        registry.register(1, "scan".into(), CameraSelector::Rear);
        assert!(registry.ready_view_for_page("scan").is_none());

        registry.surface_available(1, Size::new(1080, 1920));
        assert_eq!(registry.ready_view_for_page("scan").unwrap().view_id, 1);
    }
}
