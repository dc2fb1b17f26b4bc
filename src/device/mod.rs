//! Camera device resolution.
//!
//! Resolves a logical facing selector to a concrete camera id and fetches
//! its static characteristics. When no camera matches the requested
//! facing, the first enumerated camera is used as a fallback so a
//! single-camera device still opens something usable.

use crate::error::CameraError;
use crate::hal::{CameraHal, DeviceCharacteristics, Facing};
use crate::profile::CameraSelector;

/// Resolves selectors against whatever the HAL enumerates.
pub struct DeviceRegistry;

impl DeviceRegistry {
    /// Picks a camera id for the selector.
    ///
    /// Returns the first camera whose facing matches, the first
    /// enumerated camera otherwise, or [`CameraError::NoCameraAvailable`]
    /// when enumeration is empty.
    pub fn resolve(hal: &mut dyn CameraHal, selector: CameraSelector) -> Result<String, CameraError> {
        let cameras = hal.enumerate()?;

        let wanted = match selector {
            CameraSelector::Rear => Facing::Back,
            CameraSelector::Front => Facing::Front,
        };

        if let Some(found) = cameras.iter().find(|c| c.facing == wanted) {
            return Ok(found.id.clone());
        }

        cameras
            .first()
            .map(|c| c.id.clone())
            .ok_or(CameraError::NoCameraAvailable)
    }

    /// Fetches the static characteristics snapshot for a camera.
    pub fn characteristics(
        hal: &mut dyn CameraHal,
        id: &str,
    ) -> Result<DeviceCharacteristics, CameraError> {
        hal.characteristics(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{CameraDescriptor, MockHal};

    #[test]
    fn test_resolve_rear_camera() {
        let mut hal = MockHal::new();
        let id = DeviceRegistry::resolve(&mut hal, CameraSelector::Rear).unwrap();
        assert_eq!(id, "0");
    }

    #[test]
    fn test_resolve_front_camera() {
        let mut hal = MockHal::new();
        let id = DeviceRegistry::resolve(&mut hal, CameraSelector::Front).unwrap();
        assert_eq!(id, "1");
    }

    #[test]
    fn test_missing_facing_falls_back_to_first() {
        let mut hal = MockHal::with_cameras(vec![CameraDescriptor {
            id: "0".into(),
            facing: Facing::Back,
        }]);
        let id = DeviceRegistry::resolve(&mut hal, CameraSelector::Front).unwrap();
        assert_eq!(id, "0");
    }

    #[test]
    fn test_empty_enumeration_fails() {
        let mut hal = MockHal::without_cameras();
        assert!(matches!(
            DeviceRegistry::resolve(&mut hal, CameraSelector::Rear),
            Err(CameraError::NoCameraAvailable)
        ));
    }

    #[test]
    fn test_characteristics_for_unknown_id() {
        let mut hal = MockHal::new();
        assert!(matches!(
            DeviceRegistry::characteristics(&mut hal, "99"),
            Err(CameraError::AccessDenied(_))
        ));
    }
}
