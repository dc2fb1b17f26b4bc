//! Resolution selection.
//!
//! Pure functions choosing preview and still-capture resolutions from a
//! device's supported-size list. The preview choice is the median-area
//! entry: it avoids both the smallest and the largest extreme, balancing
//! quality and performance without device-specific tuning.

use crate::error::CameraError;
use crate::geometry::Size;

const ASPECT_TOLERANCE: f64 = 0.1;

/// Selects the preview resolution: median entry by pixel area.
pub fn select_preview_size(supported: &[Size]) -> Result<Size, CameraError> {
    if supported.is_empty() {
        return Err(CameraError::NoSizesAvailable);
    }

    let mut sorted = supported.to_vec();
    sorted.sort_by_key(Size::area);
    Ok(sorted[sorted.len() / 2])
}

/// Selects the still-capture resolution.
///
/// In high-resolution mode this is the maximum-area entry (ties broken by
/// first encountered); otherwise it matches the preview choice.
pub fn select_capture_size(supported: &[Size], high_resolution: bool) -> Result<Size, CameraError> {
    if !high_resolution {
        return select_preview_size(supported);
    }

    let mut best = *supported.first().ok_or(CameraError::NoSizesAvailable)?;
    for &size in supported {
        if size.area() > best.area() {
            best = size;
        }
    }
    Ok(best)
}

/// Selects the entry closest to a target size at a compatible aspect ratio.
///
/// Entries whose aspect ratio differs from the target's by more than 0.1
/// are filtered out; among survivors the choice minimizes
/// `|w - target_w| + |h - target_h|`. If the aspect filter removes
/// everything, the distance metric is minimized over the full list.
pub fn select_by_aspect(
    supported: &[Size],
    target_w: u32,
    target_h: u32,
) -> Result<Size, CameraError> {
    if supported.is_empty() {
        return Err(CameraError::NoSizesAvailable);
    }

    let target_ratio = f64::from(target_w) / f64::from(target_h);
    let distance = |size: &Size| {
        (f64::from(size.width) - f64::from(target_w)).abs()
            + (f64::from(size.height) - f64::from(target_h)).abs()
    };

    let matching = supported
        .iter()
        .filter(|size| (size.aspect() - target_ratio).abs() <= ASPECT_TOLERANCE)
        .min_by(|a, b| distance(a).total_cmp(&distance(b)));

    match matching {
        Some(&size) => Ok(size),
        None => supported
            .iter()
            .min_by(|a, b| distance(a).total_cmp(&distance(b)))
            .copied()
            .ok_or(CameraError::NoSizesAvailable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sizes(raw: &[(u32, u32)]) -> Vec<Size> {
        raw.iter().map(|&(w, h)| Size::new(w, h)).collect()
    }

    #[test]
    fn test_empty_list_fails() {
        assert!(matches!(
            select_preview_size(&[]),
            Err(CameraError::NoSizesAvailable)
        ));
        assert!(matches!(
            select_capture_size(&[], true),
            Err(CameraError::NoSizesAvailable)
        ));
        assert!(matches!(
            select_by_aspect(&[], 1920, 1080),
            Err(CameraError::NoSizesAvailable)
        ));
    }

    #[test]
    fn test_preview_is_median_by_area() {
        let supported = sizes(&[(4000, 3000), (640, 480), (1920, 1080)]);
        let chosen = select_preview_size(&supported).unwrap();
        assert_eq!(chosen, Size::new(1920, 1080));
    }

    #[test]
    fn test_capture_high_resolution_is_max_area() {
        let supported = sizes(&[(1920, 1080), (4000, 3000), (640, 480)]);
        let chosen = select_capture_size(&supported, true).unwrap();
        assert_eq!(chosen, Size::new(4000, 3000));
    }

    #[test]
    fn test_capture_max_area_tie_keeps_first() {
        // 4000x3000 and 3000x4000 have equal area; first wins.
        let supported = sizes(&[(4000, 3000), (3000, 4000), (640, 480)]);
        let chosen = select_capture_size(&supported, true).unwrap();
        assert_eq!(chosen, Size::new(4000, 3000));
    }

    #[test]
    fn test_capture_standard_matches_preview() {
        let supported = sizes(&[(4000, 3000), (640, 480), (1920, 1080)]);
        assert_eq!(
            select_capture_size(&supported, false).unwrap(),
            select_preview_size(&supported).unwrap()
        );
    }

    #[test]
    fn test_aspect_filter_prefers_matching_ratio() {
        let supported = sizes(&[(1920, 1080), (1440, 1080), (1280, 720)]);
        // 16:9 target; 1440x1080 is 4:3 and must lose to 1280x720.
        let chosen = select_by_aspect(&supported, 1280, 720).unwrap();
        assert_eq!(chosen, Size::new(1280, 720));
    }

    #[test]
    fn test_aspect_fallback_when_no_ratio_matches() {
        // All entries are 4:3; a 16:9 target falls back to pure distance.
        let supported = sizes(&[(4000, 3000), (640, 480)]);
        let chosen = select_by_aspect(&supported, 800, 450).unwrap();
        assert_eq!(chosen, Size::new(640, 480));
    }

    proptest! {
        #[test]
        fn prop_preview_returns_member(raw in prop::collection::vec((1u32..8192, 1u32..8192), 1..32)) {
            let supported = sizes(&raw);
            let chosen = select_preview_size(&supported).unwrap();
            prop_assert!(supported.contains(&chosen));
        }

        #[test]
        fn prop_capture_returns_member(
            raw in prop::collection::vec((1u32..8192, 1u32..8192), 1..32),
            high_res in any::<bool>(),
        ) {
            let supported = sizes(&raw);
            let chosen = select_capture_size(&supported, high_res).unwrap();
            prop_assert!(supported.contains(&chosen));
        }

        #[test]
        fn prop_high_resolution_dominates(raw in prop::collection::vec((1u32..8192, 1u32..8192), 1..32)) {
            let supported = sizes(&raw);
            let chosen = select_capture_size(&supported, true).unwrap();
            prop_assert!(supported.iter().all(|s| s.area() <= chosen.area()));
        }
    }
}
