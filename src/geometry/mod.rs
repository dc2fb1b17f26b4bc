//! Sensor-relative geometry.
//!
//! Pure computations over sensor coordinates: crop rectangles for zoom and
//! metering rectangles for touch-driven autofocus. Nothing here touches
//! hardware; the session coordinator feeds the results into capture
//! requests.

mod focus;
mod zoom;

pub use focus::{compute_focus_region, AfState, MeteringRegion, METERING_WEIGHT_MAX};
pub use zoom::{compute_zoom_rect, MAX_ZOOM};

use serde::{Deserialize, Serialize};

/// A pixel size (width x height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// A size from width and height.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel area, widened to avoid overflow on large sensors.
    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Width-to-height aspect ratio.
    #[inline]
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An axis-aligned rectangle in sensor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge, inclusive.
    pub left: i32,
    /// Top edge, inclusive.
    pub top: i32,
    /// Right edge, exclusive.
    pub right: i32,
    /// Bottom edge, exclusive.
    pub bottom: i32,
}

impl Rect {
    /// A rectangle from its four edges.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// A rectangle spanning `(0, 0)` to `(width, height)`.
    pub const fn of_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    /// Width of the rectangle.
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    #[inline]
    /// Height of the rectangle.
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    #[inline]
    /// Horizontal center.
    pub fn center_x(&self) -> i32 {
        self.left + self.width() / 2
    }

    #[inline]
    /// Vertical center.
    pub fn center_y(&self) -> i32 {
        self.top + self.height() / 2
    }
}
