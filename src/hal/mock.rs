//! Mock hardware layer for tests and the demo binary.
//!
//! The mock answers every asynchronous operation with a scripted event
//! and records every submitted request, so tests can assert on the exact
//! request stream the coordinator produced. Failure injection flags cover
//! each callback-driven failure path of the real hardware.

use super::{
    CameraDescriptor, CameraHal, CapturedImage, CaptureRequest, DeviceCharacteristics, Facing,
    Frame, HalEvent, ImageFormat, StreamConfig, SurfaceKind, SurfaceSpec,
};
use crate::error::CameraError;
use crate::geometry::{AfState, Rect, Size};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct MockHalState {
    cameras: Vec<CameraDescriptor>,
    sensor_rect: Option<Rect>,
    events: VecDeque<HalEvent>,
    device_open: bool,
    session_open: bool,
    surfaces: Vec<SurfaceSpec>,
    repeating: Option<CaptureRequest>,
    repeating_history: Vec<CaptureRequest>,
    still_history: Vec<CaptureRequest>,
    focus_history: Vec<CaptureRequest>,
    preview_frame: Option<Frame>,
    opened_ids: Vec<String>,
    device_close_count: u32,
    session_close_count: u32,

    // Failure injection.
    fail_open_access: bool,
    disconnect_on_open: bool,
    error_on_open: Option<i32>,
    fail_configure: bool,
    fail_still_submit: bool,
    hang_still: bool,
    stale_repeating_once: bool,
    af_script: Vec<AfState>,
}

/// Scripted in-process stand-in for the platform camera stack.
pub struct MockHal {
    state: Arc<Mutex<MockHalState>>,
}

/// Inspection and injection handle shared with tests.
#[derive(Clone)]
pub struct MockHalHandle {
    state: Arc<Mutex<MockHalState>>,
}

impl Default for MockHal {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHal {
    /// A mock with one rear and one front camera and a 4000x3000 sensor.
    pub fn new() -> Self {
        let state = MockHalState {
            cameras: vec![
                CameraDescriptor {
                    id: "0".into(),
                    facing: Facing::Back,
                },
                CameraDescriptor {
                    id: "1".into(),
                    facing: Facing::Front,
                },
            ],
            sensor_rect: Some(Rect::of_size(4000, 3000)),
            af_script: vec![AfState::ActiveScan, AfState::FocusedLocked],
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// A mock that enumerates no cameras at all.
    pub fn without_cameras() -> Self {
        Self::with_cameras(Vec::new())
    }

    /// A mock enumerating exactly the given cameras.
    pub fn with_cameras(cameras: Vec<CameraDescriptor>) -> Self {
        let hal = Self::new();
        hal.state.lock().expect("mock poisoned").cameras = cameras;
        hal
    }

    /// Returns a handle for inspecting and scripting this mock.
    pub fn handle(&self) -> MockHalHandle {
        MockHalHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn default_streams() -> Vec<StreamConfig> {
        let jpeg = [
            Size::new(640, 480),
            Size::new(1920, 1080),
            Size::new(4032, 3024),
        ];
        let preview = [
            Size::new(640, 480),
            Size::new(1280, 720),
            Size::new(1920, 1080),
        ];
        jpeg.iter()
            .map(|&size| StreamConfig {
                format: ImageFormat::Jpeg,
                size,
            })
            .chain(preview.iter().map(|&size| StreamConfig {
                format: ImageFormat::PreviewTexture,
                size,
            }))
            .collect()
    }

    fn synthetic_jpeg(size: Size) -> CapturedImage {
        // JPEG SOI marker followed by filler proportional to the area.
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.extend(std::iter::repeat(0xAB).take((size.area() / 10_000) as usize));
        CapturedImage { bytes, size }
    }

    fn synthetic_preview(size: Size) -> Frame {
        let count = (size.width as usize) * (size.height as usize);
        let mut pixels = Vec::with_capacity(count * 3);
        for i in 0..count {
            let shade = (i % 256) as u8;
            pixels.extend_from_slice(&[shade, shade, shade]);
        }
        Frame::new(pixels, size.width, size.height)
    }
}

impl CameraHal for MockHal {
    fn enumerate(&mut self) -> Result<Vec<CameraDescriptor>, CameraError> {
        Ok(self.state.lock().expect("mock poisoned").cameras.clone())
    }

    fn characteristics(&mut self, id: &str) -> Result<DeviceCharacteristics, CameraError> {
        let state = self.state.lock().expect("mock poisoned");
        let known = state.cameras.iter().any(|c| c.id == id);
        if !known {
            return Err(CameraError::AccessDenied(format!("unknown camera {id}")));
        }
        Ok(DeviceCharacteristics {
            id: id.to_string(),
            sensor_rect: state.sensor_rect.unwrap_or(Rect::of_size(4000, 3000)),
            streams: Self::default_streams(),
        })
    }

    fn open_device(&mut self, id: &str) -> Result<(), CameraError> {
        let mut state = self.state.lock().expect("mock poisoned");
        if state.fail_open_access {
            return Err(CameraError::AccessDenied("injected".into()));
        }
        state.opened_ids.push(id.to_string());
        if state.disconnect_on_open {
            state.events.push_back(HalEvent::DeviceDisconnected);
        } else if let Some(code) = state.error_on_open {
            state.events.push_back(HalEvent::DeviceError { code });
        } else {
            state.device_open = true;
            state.events.push_back(HalEvent::DeviceOpened);
        }
        Ok(())
    }

    fn create_session(&mut self, surfaces: &[SurfaceSpec]) -> Result<(), CameraError> {
        let mut state = self.state.lock().expect("mock poisoned");
        if !state.device_open {
            return Err(CameraError::NoActiveCamera);
        }
        if state.fail_configure {
            state.events.push_back(HalEvent::SessionConfigureFailed {
                reason: "injected".into(),
            });
            return Ok(());
        }
        state.session_open = true;
        state.surfaces = surfaces.to_vec();
        if state.preview_frame.is_none() {
            if let Some(spec) = surfaces.iter().find(|s| s.kind == SurfaceKind::Preview) {
                state.preview_frame = Some(Self::synthetic_preview(spec.size));
            }
        }
        state.events.push_back(HalEvent::SessionConfigured);
        Ok(())
    }

    fn set_repeating(&mut self, request: &CaptureRequest) -> Result<(), CameraError> {
        let mut state = self.state.lock().expect("mock poisoned");
        if state.stale_repeating_once {
            state.stale_repeating_once = false;
            state.session_open = false;
            return Err(CameraError::PreviewUpdateFailed("session closed".into()));
        }
        if !state.session_open {
            return Err(CameraError::PreviewUpdateFailed("no session".into()));
        }
        state.repeating = Some(request.clone());
        state.repeating_history.push(request.clone());
        Ok(())
    }

    fn stop_repeating(&mut self) -> Result<(), CameraError> {
        let mut state = self.state.lock().expect("mock poisoned");
        state.repeating = None;
        Ok(())
    }

    fn submit_still(&mut self, request: &CaptureRequest) -> Result<(), CameraError> {
        let mut state = self.state.lock().expect("mock poisoned");
        if !state.device_open || !state.session_open {
            return Err(CameraError::NoActiveCamera);
        }
        if state.fail_still_submit {
            return Err(CameraError::CaptureError("injected".into()));
        }
        state.still_history.push(request.clone());
        if state.hang_still {
            return Ok(());
        }
        let size = state
            .surfaces
            .iter()
            .find(|s| s.kind == SurfaceKind::Still)
            .map(|s| s.size)
            .unwrap_or(Size::new(4032, 3024));
        state.events.push_back(HalEvent::StillCaptured {
            image: Self::synthetic_jpeg(size),
        });
        Ok(())
    }

    fn submit_focus(&mut self, request: &CaptureRequest) -> Result<(), CameraError> {
        let mut state = self.state.lock().expect("mock poisoned");
        if !state.session_open {
            return Err(CameraError::NoActiveCamera);
        }
        state.focus_history.push(request.clone());
        let script = state.af_script.clone();
        for af in script {
            state.events.push_back(HalEvent::AutofocusUpdate { state: af });
        }
        Ok(())
    }

    fn close_session(&mut self) {
        let mut state = self.state.lock().expect("mock poisoned");
        if state.session_open {
            state.session_close_count += 1;
        }
        state.session_open = false;
        state.repeating = None;
        state.preview_frame = None;
    }

    fn close_device(&mut self) {
        let mut state = self.state.lock().expect("mock poisoned");
        if state.device_open {
            state.device_close_count += 1;
        }
        state.device_open = false;
    }

    fn poll_event(&mut self, timeout: Duration) -> Option<HalEvent> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(event) = self.state.lock().expect("mock poisoned").events.pop_front() {
                return Some(event);
            }
            if Instant::now() >= deadline {
                return None;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn preview_snapshot(&mut self) -> Option<Frame> {
        let state = self.state.lock().expect("mock poisoned");
        if !state.session_open {
            return None;
        }
        state.preview_frame.clone()
    }
}

impl MockHalHandle {
    fn with<R>(&self, f: impl FnOnce(&mut MockHalState) -> R) -> R {
        f(&mut self.state.lock().expect("mock poisoned"))
    }

    /// Make `open_device` fail synchronously with an access error.
    pub fn set_fail_open_access(&self, on: bool) {
        self.with(|s| s.fail_open_access = on);
    }

    /// Answer the next open with a disconnect event.
    pub fn set_disconnect_on_open(&self, on: bool) {
        self.with(|s| s.disconnect_on_open = on);
    }

    /// Answer the next open with a device error event.
    pub fn set_error_on_open(&self, code: Option<i32>) {
        self.with(|s| s.error_on_open = code);
    }

    /// Answer session creation with a configure-failed event.
    pub fn set_fail_configure(&self, on: bool) {
        self.with(|s| s.fail_configure = on);
    }

    /// Reject still submissions synchronously.
    pub fn set_fail_still_submit(&self, on: bool) {
        self.with(|s| s.fail_still_submit = on);
    }

    /// Accept still submissions but never deliver an image.
    pub fn set_hang_still(&self, on: bool) {
        self.with(|s| s.hang_still = on);
    }

    /// Make the next repeating-request submission fail as a stale session.
    pub fn set_stale_repeating_once(&self) {
        self.with(|s| s.stale_repeating_once = true);
    }

    /// Replace the autofocus event script for focus triggers.
    pub fn set_af_script(&self, script: Vec<AfState>) {
        self.with(|s| s.af_script = script);
    }

    /// Install a specific preview frame for intensity sampling.
    pub fn set_preview_frame(&self, frame: Frame) {
        self.with(|s| s.preview_frame = Some(frame));
    }

    /// Queue an out-of-band hardware event.
    pub fn push_event(&self, event: HalEvent) {
        self.with(|s| s.events.push_back(event));
    }

    /// Whether a device handle is currently held.
    pub fn device_open(&self) -> bool {
        self.with(|s| s.device_open)
    }

    /// Whether a capture session is currently configured.
    pub fn session_open(&self) -> bool {
        self.with(|s| s.session_open)
    }

    /// Every camera id opened so far, in order.
    pub fn opened_ids(&self) -> Vec<String> {
        self.with(|s| s.opened_ids.clone())
    }

    /// How many times an open device was closed.
    pub fn device_close_count(&self) -> u32 {
        self.with(|s| s.device_close_count)
    }

    /// The installed repeating request, if the preview stream is live.
    pub fn repeating(&self) -> Option<CaptureRequest> {
        self.with(|s| s.repeating.clone())
    }

    /// Every repeating request ever installed.
    pub fn repeating_history(&self) -> Vec<CaptureRequest> {
        self.with(|s| s.repeating_history.clone())
    }

    /// Every still request ever submitted.
    pub fn still_history(&self) -> Vec<CaptureRequest> {
        self.with(|s| s.still_history.clone())
    }

    /// Every focus trigger ever submitted.
    pub fn focus_history(&self) -> Vec<CaptureRequest> {
        self.with(|s| s.focus_history.clone())
    }

    /// Surfaces of the most recently created session.
    pub fn surfaces(&self) -> Vec<SurfaceSpec> {
        self.with(|s| s.surfaces.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{AfMode, AfTrigger, ExposureMode, RequestTemplate};

    fn preview_request() -> CaptureRequest {
        CaptureRequest {
            template: RequestTemplate::Preview,
            targets: vec![SurfaceKind::Preview],
            exposure: ExposureMode::On,
            exposure_time_ns: 0,
            iso: 0,
            hdr: false,
            crop_region: None,
            af_mode: AfMode::ContinuousPicture,
            af_trigger: AfTrigger::Idle,
            af_regions: vec![],
            ae_regions: vec![],
        }
    }

    #[test]
    fn test_open_emits_opened_event() {
        let mut hal = MockHal::new();
        hal.open_device("0").unwrap();
        assert!(matches!(
            hal.poll_event(Duration::from_millis(10)),
            Some(HalEvent::DeviceOpened)
        ));
        assert!(hal.handle().device_open());
    }

    #[test]
    fn test_session_requires_open_device() {
        let mut hal = MockHal::new();
        let result = hal.create_session(&[]);
        assert!(matches!(result, Err(CameraError::NoActiveCamera)));
    }

    #[test]
    fn test_still_capture_round_trip() {
        let mut hal = MockHal::new();
        hal.open_device("0").unwrap();
        hal.poll_event(Duration::from_millis(10));
        hal.create_session(&[SurfaceSpec {
            kind: SurfaceKind::Still,
            format: ImageFormat::Jpeg,
            size: Size::new(1920, 1080),
        }])
        .unwrap();
        hal.poll_event(Duration::from_millis(10));

        let mut request = preview_request();
        request.template = RequestTemplate::StillCapture;
        hal.submit_still(&request).unwrap();

        match hal.poll_event(Duration::from_millis(10)) {
            Some(HalEvent::StillCaptured { image }) => {
                assert_eq!(image.size, Size::new(1920, 1080));
                assert_eq!(&image.bytes[..2], &[0xFF, 0xD8]);
            }
            other => panic!("expected still image, got {other:?}"),
        }
    }

    #[test]
    fn test_poll_times_out_when_idle() {
        let mut hal = MockHal::new();
        assert!(hal.poll_event(Duration::from_millis(5)).is_none());
    }
}
