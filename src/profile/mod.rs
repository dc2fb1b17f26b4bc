//! Per-page capture configuration profiles.
//!
//! Each logical UI page carries its own named configuration bundle. The
//! session coordinator reads the profile of the active page when building
//! capture requests; pages that are not active can be edited freely
//! without disturbing the live session.

mod store;

pub use store::ProfileStore;

use crate::geometry::MAX_ZOOM;
use serde::{Deserialize, Serialize};

/// Page id used when a command omits or blanks the page field.
pub const DEFAULT_PAGE: &str = "default";

/// Which physical camera a profile targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraSelector {
    /// World-facing camera.
    Rear,
    /// User-facing camera.
    Front,
}

impl CameraSelector {
    /// Maps the wire-level rear-camera flag onto a selector.
    pub fn from_rear_flag(use_rear: bool) -> Self {
        if use_rear {
            Self::Rear
        } else {
            Self::Front
        }
    }

    /// Whether this selector picks the rear camera.
    pub fn is_rear(&self) -> bool {
        matches!(self, Self::Rear)
    }
}

/// Saved camera configuration for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureProfile {
    /// Which camera to open.
    pub facing: CameraSelector,
    /// Digital zoom factor, >= 1.0, clamped to [`MAX_ZOOM`].
    pub zoom: f32,
    /// Automatic exposure; when true the fixed exposure time is ignored.
    pub auto_exposure: bool,
    /// Fixed exposure duration in nanoseconds (0 = unset).
    pub exposure_time_ns: i64,
    /// Still captures use the highest available resolution.
    pub high_resolution: bool,
    /// HDR scene mode.
    pub hdr: bool,
    /// Fixed ISO sensitivity (0 = auto).
    pub iso: i32,
}

impl Default for CaptureProfile {
    fn default() -> Self {
        Self {
            facing: CameraSelector::Rear,
            zoom: 1.0,
            auto_exposure: true,
            exposure_time_ns: 0,
            high_resolution: true,
            hdr: false,
            iso: 0,
        }
    }
}

impl CaptureProfile {
    /// Sets the zoom factor, clamping into the supported range.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(1.0, MAX_ZOOM);
    }

    /// Fixes the exposure time (nanoseconds) and disables auto-exposure.
    pub fn set_fixed_exposure_ns(&mut self, exposure_ns: i64) {
        self.exposure_time_ns = exposure_ns;
        self.auto_exposure = false;
    }

    /// Enables or disables auto-exposure; enabling clears the fixed time.
    pub fn set_auto_exposure(&mut self, enabled: bool) {
        self.auto_exposure = enabled;
        if enabled {
            self.exposure_time_ns = 0;
        }
    }

    /// Effective fixed exposure for request building.
    ///
    /// Auto-exposure masks any stored duration without erasing it.
    pub fn effective_exposure_ns(&self) -> i64 {
        if self.auto_exposure {
            0
        } else {
            self.exposure_time_ns
        }
    }
}

/// Normalizes a page id: empty or missing means [`DEFAULT_PAGE`].
pub fn normalize_page_id(page_id: Option<&str>) -> String {
    match page_id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => DEFAULT_PAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = CaptureProfile::default();
        assert!(profile.facing.is_rear());
        assert_eq!(profile.zoom, 1.0);
        assert!(profile.auto_exposure);
        assert!(profile.high_resolution);
        assert!(!profile.hdr);
        assert_eq!(profile.iso, 0);
    }

    #[test]
    fn test_zoom_clamps() {
        let mut profile = CaptureProfile::default();
        profile.set_zoom(0.2);
        assert_eq!(profile.zoom, 1.0);
        profile.set_zoom(5.5);
        assert_eq!(profile.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_auto_exposure_masks_fixed_time() {
        let mut profile = CaptureProfile::default();
        profile.set_fixed_exposure_ns(8_000_000);
        assert!(!profile.auto_exposure);
        assert_eq!(profile.effective_exposure_ns(), 8_000_000);

        profile.auto_exposure = true;
        assert_eq!(profile.effective_exposure_ns(), 0);
    }

    #[test]
    fn test_enabling_auto_exposure_clears_time() {
        let mut profile = CaptureProfile::default();
        profile.set_fixed_exposure_ns(8_000_000);
        profile.set_auto_exposure(true);
        assert_eq!(profile.exposure_time_ns, 0);
    }

    #[test]
    fn test_normalize_page_id() {
        assert_eq!(normalize_page_id(None), "default");
        assert_eq!(normalize_page_id(Some("")), "default");
        assert_eq!(normalize_page_id(Some("scan")), "scan");
    }
}
