//! End-to-end session flows through the public command surface.

use scope_camera::{
    config::CoordinatorConfig,
    geometry::Size,
    hal::{MockHal, MockHalHandle, SurfaceKind},
    service::{CameraService, ViewEvent},
    storage::{MemoryContentResolver, MemoryMediaStore},
    CommandReply, ReplyPayload,
};
use serde_json::{json, Value};
use std::sync::Arc;

struct Harness {
    service: CameraService,
    hal: MockHalHandle,
    store: Arc<MemoryMediaStore>,
}

fn harness() -> Harness {
    harness_with(MockHal::new())
}

fn harness_with(hal: MockHal) -> Harness {
    let handle = hal.handle();
    let store = Arc::new(MemoryMediaStore::new());
    let config = CoordinatorConfig {
        lock_timeout_ms: 200,
        capture_timeout_ms: 200,
        ..Default::default()
    };
    let service = CameraService::spawn(
        Box::new(hal),
        store.clone(),
        Arc::new(MemoryContentResolver::new()),
        config,
    );
    Harness {
        service,
        hal: handle,
        store,
    }
}

impl Harness {
    fn bind_view(&self, view_id: i64, page: &str) {
        self.service.view_event(ViewEvent::Register {
            view_id,
            page_id: Some(page.to_string()),
            use_rear_camera: true,
        });
        self.service.view_event(ViewEvent::SurfaceAvailable {
            view_id,
            size: Size::new(1080, 1920),
        });
    }

    fn call_ok(&self, method: &str, args: Value) -> CommandReply {
        let reply = self.service.call(method, args);
        assert!(reply.is_success(), "{method} failed: {reply:?}");
        reply
    }
}

#[test]
fn full_lifecycle_from_init_to_dispose() {
    let h = harness();
    h.bind_view(1, "slide_scan");
    h.call_ok("initCamera", json!({"pageId": "slide_scan", "useRearCamera": true}));

    let info = h.call_ok("getCameraInfo", json!({}));
    let info = info.value().unwrap();
    assert_eq!(info["previewWidth"], json!(1280));
    assert_eq!(info["photoWidth"], json!(4032));
    assert_eq!(info["isRearCamera"], json!(true));

    h.call_ok(
        "setZoomLevel",
        json!({"pageId": "slide_scan", "zoomLevel": 2.5}),
    );
    h.call_ok(
        "performManualFocus",
        json!({"viewId": 1, "x": 540.0, "y": 960.0}),
    );

    let reply = h.call_ok(
        "takePicture",
        json!({
            "pageId": "slide_scan",
            "illuminationParams": {"type": "darkfield", "radius": 8},
        }),
    );
    match reply {
        CommandReply::Success(ReplyPayload::Value(Value::String(reference))) => {
            assert!(reference.contains("_darkfield_R8"), "bad name: {reference}");
        }
        other => panic!("unexpected reply: {other:?}"),
    }

    h.call_ok("disposeCamera", json!({"pageId": "slide_scan"}));
    assert!(!h.hal.device_open());
    assert_eq!(h.store.saved_names().len(), 1);
}

#[test]
fn per_page_parameters_stay_isolated() {
    let h = harness();
    h.bind_view(1, "page_a");
    h.call_ok("initCamera", json!({"pageId": "page_a"}));

    // Configure page_b while page_a owns the session.
    h.call_ok("setHDRMode", json!({"pageId": "page_b", "enabled": true}));
    h.call_ok(
        "setExposureTime",
        json!({"pageId": "page_b", "exposureTime": 50_000_000i64}),
    );

    // page_a's live preview is untouched by page_b's edits.
    let repeating = h.hal.repeating().unwrap();
    assert!(!repeating.hdr);
    assert_eq!(repeating.exposure_time_ns, 0);

    // A capture for page_b uses page_b's parameters, then page_a resumes.
    h.call_ok("takePicture", json!({"pageId": "page_b"}));
    let still = h.hal.still_history().pop().unwrap();
    assert!(still.hdr);
    assert_eq!(still.exposure_time_ns, 50_000_000);

    let resumed = h.hal.repeating().unwrap();
    assert!(!resumed.hdr);
}

#[test]
fn exposure_round_trip_through_requests() {
    let h = harness();
    h.bind_view(1, "exposure_page");
    h.call_ok("initCamera", json!({"pageId": "exposure_page"}));

    h.call_ok(
        "setExposureTime",
        json!({"pageId": "exposure_page", "exposureTime": 33_000_000i64}),
    );
    let repeating = h.hal.repeating().unwrap();
    assert_eq!(repeating.exposure_time_ns, 33_000_000);

    h.call_ok(
        "setAutoExposure",
        json!({"pageId": "exposure_page", "enabled": true}),
    );
    let repeating = h.hal.repeating().unwrap();
    assert_eq!(repeating.exposure_time_ns, 0);
}

#[test]
fn fixed_params_apply_only_when_requested() {
    let h = harness();
    h.bind_view(1, "params_page");
    h.call_ok("initCamera", json!({"pageId": "params_page"}));

    // Without the fixed flag the call is a no-op and reports false.
    let reply = h.call_ok(
        "setCameraParams",
        json!({"pageId": "params_page", "isoValue": 400}),
    );
    assert_eq!(reply.value(), Some(&json!(false)));

    let reply = h.call_ok(
        "setCameraParams",
        json!({
            "pageId": "params_page",
            "useFixedCameraParams": true,
            "isoValue": 400,
            "exposureTimeUs": 20_000i64,
        }),
    );
    assert_eq!(reply.value(), Some(&json!(true)));

    let repeating = h.hal.repeating().unwrap();
    assert_eq!(repeating.iso, 400);
    assert_eq!(repeating.exposure_time_ns, 20_000_000);
}

#[test]
fn resolution_toggle_rebuilds_still_surface() {
    let h = harness();
    h.bind_view(1, "res_page");
    h.call_ok("initCamera", json!({"pageId": "res_page"}));

    let still_size = |hal: &MockHalHandle| {
        hal.surfaces()
            .into_iter()
            .find(|s| s.kind == SurfaceKind::Still)
            .map(|s| s.size)
    };
    assert_eq!(still_size(&h.hal), Some(Size::new(4032, 3024)));

    h.call_ok(
        "setHighResolutionMode",
        json!({"pageId": "res_page", "enabled": false}),
    );
    assert_eq!(still_size(&h.hal), Some(Size::new(1920, 1080)));
}

#[test]
fn init_without_cameras_reports_no_camera() {
    let h = harness_with(MockHal::without_cameras());
    h.bind_view(1, "empty_page");
    let reply = h.service.call("initCamera", json!({"pageId": "empty_page"}));
    assert_eq!(reply.error_code(), Some("NO_CAMERA_AVAILABLE"));
    assert!(!h.hal.device_open());
}

#[test]
fn dispose_then_reinit_recovers() {
    let h = harness();
    h.bind_view(1, "cycle_page");
    h.call_ok("initCamera", json!({"pageId": "cycle_page"}));
    h.call_ok("disposeCamera", json!({"pageId": "cycle_page"}));
    assert!(!h.hal.device_open());

    // The view went with the page; bind a fresh one and start over.
    h.bind_view(2, "cycle_page");
    h.call_ok("initCamera", json!({"pageId": "cycle_page"}));
    assert!(h.hal.session_open());
}
