//! Zoom crop-region computation.

use super::Rect;

/// Maximum supported digital zoom factor.
pub const MAX_ZOOM: f32 = 5.0;

/// Computes the sensor crop region for a zoom factor.
///
/// The factor is clamped to `[1.0, MAX_ZOOM]` and the result is a
/// rectangle of `sensor.size / zoom` centered on the sensor. A factor of
/// exactly 1.0 reproduces the full active array.
pub fn compute_zoom_rect(sensor: Rect, zoom: f32) -> Rect {
    let zoom = zoom.clamp(1.0, MAX_ZOOM);

    let center_x = sensor.center_x();
    let center_y = sensor.center_y();
    let delta_x = (0.5 * sensor.width() as f32 / zoom) as i32;
    let delta_y = (0.5 * sensor.height() as f32 / zoom) as i32;

    Rect::new(
        center_x - delta_x,
        center_y - delta_y,
        center_x + delta_x,
        center_y + delta_y,
    )
}
