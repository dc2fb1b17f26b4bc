//! Touch-to-focus metering geometry.
//!
//! Maps a touch point in view coordinates onto the sensor active array and
//! builds the metering rectangle that biases autofocus and auto-exposure
//! toward the touched region.

use super::{Rect, Size};

/// Maximum metering weight.
pub const METERING_WEIGHT_MAX: i32 = 1000;

/// A weighted sensor-relative metering rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeteringRegion {
    /// Sensor-space rectangle of the region.
    pub rect: Rect,
    /// Relative metering weight.
    pub weight: i32,
}

/// Autofocus state reported by the hardware after a focus trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfState {
    /// No focus sequence running.
    Inactive,
    /// Continuous focus is scanning.
    PassiveScan,
    /// Continuous focus converged.
    PassiveFocused,
    /// Continuous focus gave up.
    PassiveUnfocused,
    /// A triggered sweep is running.
    ActiveScan,
    /// Triggered sweep converged and locked.
    FocusedLocked,
    /// Triggered sweep failed and locked.
    NotFocusedLocked,
}

impl AfState {
    /// Whether this state ends a focus sequence.
    ///
    /// Only a terminal state lets the coordinator fold the metering
    /// region back into the repeating request; scanning states keep the
    /// region pending.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::FocusedLocked
                | Self::NotFocusedLocked
                | Self::PassiveFocused
                | Self::PassiveUnfocused
        )
    }
}

impl std::fmt::Display for AfState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Inactive => "inactive",
            Self::PassiveScan => "passive scan",
            Self::PassiveFocused => "passive focused",
            Self::PassiveUnfocused => "passive unfocused",
            Self::ActiveScan => "active scan",
            Self::FocusedLocked => "focused locked",
            Self::NotFocusedLocked => "not focused locked",
        };
        f.write_str(name)
    }
}

/// Computes the metering region for a touch at `(x, y)` in view space.
///
/// The touch point maps to sensor space by the linear ratio
/// `touch / view_size * sensor_size`. The region is a square of side
/// `min(sensor.w, sensor.h) / 10` centered on the mapped point, clamped
/// to the sensor bounds, at maximum weight.
pub fn compute_focus_region(sensor: Rect, view: Size, x: f32, y: f32) -> MeteringRegion {
    let touch_x = (x / view.width as f32 * sensor.width() as f32) as i32;
    let touch_y = (y / view.height as f32 * sensor.height() as f32) as i32;

    let side = sensor.width().min(sensor.height()) / 10;
    let half = side / 2;

    let rect = Rect::new(
        (touch_x - half).max(0),
        (touch_y - half).max(0),
        (touch_x + half).min(sensor.width()),
        (touch_y + half).min(sensor.height()),
    );

    MeteringRegion {
        rect,
        weight: METERING_WEIGHT_MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENSOR: Rect = Rect::of_size(4000, 3000);
    const VIEW: Size = Size::new(1080, 1920);

    #[test]
    fn test_center_touch_maps_to_sensor_center() {
        let region = compute_focus_region(SENSOR, VIEW, 540.0, 960.0);
        assert_eq!(region.rect.center_x(), 2000);
        assert_eq!(region.rect.center_y(), 1500);
        assert_eq!(region.weight, METERING_WEIGHT_MAX);
    }

    #[test]
    fn test_region_side_is_tenth_of_min_dimension() {
        let region = compute_focus_region(SENSOR, VIEW, 540.0, 960.0);
        // min(4000, 3000) / 10 on each axis when nothing is clipped
        assert_eq!(region.rect.width(), 300);
        assert_eq!(region.rect.height(), 300);
    }

    #[test]
    fn test_corner_touch_clamps_to_bounds() {
        let region = compute_focus_region(SENSOR, VIEW, 0.0, 0.0);
        assert_eq!(region.rect.left, 0);
        assert_eq!(region.rect.top, 0);
        assert!(region.rect.right <= SENSOR.width());
        assert!(region.rect.bottom <= SENSOR.height());
    }

    #[test]
    fn test_terminal_states() {
        assert!(AfState::FocusedLocked.is_terminal());
        assert!(AfState::NotFocusedLocked.is_terminal());
        assert!(AfState::PassiveFocused.is_terminal());
        assert!(AfState::PassiveUnfocused.is_terminal());
        assert!(!AfState::ActiveScan.is_terminal());
        assert!(!AfState::PassiveScan.is_terminal());
        assert!(!AfState::Inactive.is_terminal());
    }
}
