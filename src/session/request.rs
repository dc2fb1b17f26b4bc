//! Capture request construction.
//!
//! Requests are derived from the active profile: exposure mode, fixed
//! exposure time and ISO, HDR scene mode and the zoom crop region all
//! come from the profile snapshot; autofocus fields depend on whether the
//! request drives the preview stream, a still capture or a focus trigger.

use crate::geometry::{compute_zoom_rect, MeteringRegion, Rect};
use crate::hal::{AfMode, AfTrigger, CaptureRequest, ExposureMode, RequestTemplate, SurfaceKind};
use crate::profile::CaptureProfile;

fn exposure_mode(profile: &CaptureProfile) -> ExposureMode {
    if profile.auto_exposure {
        ExposureMode::On
    } else {
        ExposureMode::Off
    }
}

fn fixed_iso(profile: &CaptureProfile) -> i32 {
    // ISO is honored only alongside a fixed exposure.
    if !profile.auto_exposure && profile.iso > 0 {
        profile.iso
    } else {
        0
    }
}

/// Builds the repeating preview request.
///
/// Continuous autofocus with an idle trigger; any metering regions kept
/// from a completed focus sequence ride along.
pub fn build_preview_request(
    profile: &CaptureProfile,
    sensor: Rect,
    regions: &[MeteringRegion],
) -> CaptureRequest {
    CaptureRequest {
        template: RequestTemplate::Preview,
        targets: vec![SurfaceKind::Preview],
        exposure: exposure_mode(profile),
        exposure_time_ns: profile.effective_exposure_ns(),
        iso: fixed_iso(profile),
        hdr: profile.hdr,
        crop_region: Some(compute_zoom_rect(sensor, profile.zoom)),
        af_mode: AfMode::ContinuousPicture,
        af_trigger: AfTrigger::Idle,
        af_regions: regions.to_vec(),
        ae_regions: regions.to_vec(),
    }
}

/// Builds a one-shot still capture request.
///
/// Inherits exposure, ISO, HDR and zoom from the profile; the crop
/// region is attached only when zoom is actually engaged.
pub fn build_still_request(profile: &CaptureProfile, sensor: Rect) -> CaptureRequest {
    let crop = if profile.zoom > 1.0 {
        Some(compute_zoom_rect(sensor, profile.zoom))
    } else {
        None
    };

    CaptureRequest {
        template: RequestTemplate::StillCapture,
        targets: vec![SurfaceKind::Still, SurfaceKind::Preview],
        exposure: exposure_mode(profile),
        exposure_time_ns: profile.effective_exposure_ns(),
        iso: fixed_iso(profile),
        hdr: profile.hdr,
        crop_region: crop,
        af_mode: AfMode::ContinuousPicture,
        af_trigger: AfTrigger::Idle,
        af_regions: vec![],
        ae_regions: vec![],
    }
}

/// Builds a one-shot autofocus trigger request for a metering region.
pub fn build_focus_request(
    profile: &CaptureProfile,
    sensor: Rect,
    region: MeteringRegion,
) -> CaptureRequest {
    CaptureRequest {
        template: RequestTemplate::Preview,
        targets: vec![SurfaceKind::Preview, SurfaceKind::Still],
        exposure: exposure_mode(profile),
        exposure_time_ns: profile.effective_exposure_ns(),
        iso: fixed_iso(profile),
        hdr: profile.hdr,
        crop_region: Some(compute_zoom_rect(sensor, profile.zoom)),
        af_mode: AfMode::Auto,
        af_trigger: AfTrigger::Start,
        af_regions: vec![region],
        ae_regions: vec![region],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::METERING_WEIGHT_MAX;

    const SENSOR: Rect = Rect::of_size(4000, 3000);

    #[test]
    fn test_preview_request_auto_exposure() {
        let profile = CaptureProfile::default();
        let request = build_preview_request(&profile, SENSOR, &[]);

        assert_eq!(request.exposure, ExposureMode::On);
        assert_eq!(request.exposure_time_ns, 0);
        assert_eq!(request.iso, 0);
        assert_eq!(request.af_mode, AfMode::ContinuousPicture);
        assert_eq!(request.af_trigger, AfTrigger::Idle);
        assert_eq!(request.crop_region, Some(SENSOR));
    }

    #[test]
    fn test_preview_request_fixed_exposure_and_iso() {
        let mut profile = CaptureProfile::default();
        profile.set_fixed_exposure_ns(16_000_000);
        profile.iso = 400;

        let request = build_preview_request(&profile, SENSOR, &[]);
        assert_eq!(request.exposure, ExposureMode::Off);
        assert_eq!(request.exposure_time_ns, 16_000_000);
        assert_eq!(request.iso, 400);
    }

    #[test]
    fn test_iso_ignored_under_auto_exposure() {
        let mut profile = CaptureProfile::default();
        profile.iso = 800;
        let request = build_preview_request(&profile, SENSOR, &[]);
        assert_eq!(request.iso, 0);
    }

    #[test]
    fn test_still_request_omits_crop_at_unity_zoom() {
        let profile = CaptureProfile::default();
        let request = build_still_request(&profile, SENSOR);
        assert!(request.crop_region.is_none());
        assert_eq!(request.template, RequestTemplate::StillCapture);
    }

    #[test]
    fn test_still_request_crops_when_zoomed() {
        let mut profile = CaptureProfile::default();
        profile.set_zoom(2.0);
        let request = build_still_request(&profile, SENSOR);
        let crop = request.crop_region.unwrap();
        assert_eq!(crop.width(), 2000);
        assert_eq!(crop.height(), 1500);
    }

    #[test]
    fn test_focus_request_targets_region() {
        let profile = CaptureProfile::default();
        let region = MeteringRegion {
            rect: Rect::new(100, 100, 400, 400),
            weight: METERING_WEIGHT_MAX,
        };
        let request = build_focus_request(&profile, SENSOR, region);

        assert_eq!(request.af_mode, AfMode::Auto);
        assert_eq!(request.af_trigger, AfTrigger::Start);
        assert_eq!(request.af_regions, vec![region]);
        assert_eq!(request.ae_regions, vec![region]);
    }

    #[test]
    fn test_hdr_flag_propagates() {
        let mut profile = CaptureProfile::default();
        profile.hdr = true;
        assert!(build_preview_request(&profile, SENSOR, &[]).hdr);
        assert!(build_still_request(&profile, SENSOR).hdr);
    }
}
