//! Session coordination.
//!
//! The coordinator owns the single live camera device and capture session
//! and drives every lifecycle transition: open, configure, repeating
//! preview, one-shot still capture, focus sequencing and teardown. All
//! methods run on the session worker; hardware completion events are
//! pumped inline so each callback maps to exactly one transition.

use super::lock::DeviceLock;
use super::request::{build_focus_request, build_preview_request, build_still_request};
use super::router::{Annotation, CaptureRouter};
use super::state::{ActiveSession, SessionState};
use crate::config::CoordinatorConfig;
use crate::device::DeviceRegistry;
use crate::error::CameraError;
use crate::geometry::{compute_focus_region, MeteringRegion, Size};
use crate::hal::{CameraHal, HalEvent, ImageFormat, SurfaceKind, SurfaceSpec};
use crate::intensity::average_intensity;
use crate::profile::{CaptureProfile, ProfileStore, DEFAULT_PAGE};
use crate::selection::{select_capture_size, select_preview_size};
use crate::storage::MediaStore;
use crate::view::ViewRegistry;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Snapshot of the live session reported to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraInfo {
    /// Preview stream width.
    pub preview_width: u32,
    /// Preview stream height.
    pub preview_height: u32,
    /// Still capture width.
    pub photo_width: u32,
    /// Still capture height.
    pub photo_height: u32,
    /// Still image format name.
    pub photo_format: String,
    /// Whether full-sensor stills are configured.
    pub high_resolution_mode: bool,
    /// Whether the rear camera is live.
    pub is_rear_camera: bool,
    /// Whether HDR scene mode is on.
    pub hdr_mode: bool,
}

/// Owns the camera device, the capture session and all transitions.
pub struct SessionCoordinator {
    hal: Box<dyn CameraHal>,
    store: Arc<dyn MediaStore>,
    config: CoordinatorConfig,
    profiles: ProfileStore,
    views: ViewRegistry,
    lock: Arc<DeviceLock>,
    state: SessionState,
    active: Option<ActiveSession>,
    active_page: String,
    active_view: Option<i64>,
    router: CaptureRouter,
    /// Metering region from a completed focus sequence, kept in the
    /// repeating request until the next full configuration.
    focus_region: Option<MeteringRegion>,
    /// Region submitted to the hardware but not yet confirmed terminal.
    pending_focus: Option<MeteringRegion>,
}

impl SessionCoordinator {
    /// A coordinator over the given hardware and persistence backends.
    pub fn new(
        hal: Box<dyn CameraHal>,
        store: Arc<dyn MediaStore>,
        profiles: ProfileStore,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            hal,
            store,
            config,
            profiles,
            views: ViewRegistry::new(),
            lock: Arc::new(DeviceLock::new()),
            state: SessionState::Closed,
            active: None,
            active_page: DEFAULT_PAGE.to_string(),
            active_view: None,
            router: CaptureRouter::new(),
            focus_region: None,
            pending_focus: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The page whose profile drives the session.
    pub fn active_page(&self) -> &str {
        &self.active_page
    }

    /// Redirects the session to another page's profile.
    pub fn set_active_page(&mut self, page_id: String) {
        self.active_page = page_id;
    }

    /// The shared per-page profile store.
    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    /// Mutable access to the view bindings.
    pub fn views_mut(&mut self) -> &mut ViewRegistry {
        &mut self.views
    }

    /// The view bindings.
    pub fn views(&self) -> &ViewRegistry {
        &self.views
    }

    /// Opens the camera against a bound view.
    ///
    /// Preconditions fail fast without mutating coordinator state: the
    /// view must exist with a ready surface and a camera must resolve for
    /// the view's page profile. The open/close lock bounds the whole
    /// transition; contention surfaces as `DeviceBusy` with any prior
    /// session left untouched.
    pub fn open(&mut self, view_id: i64) -> Result<(), CameraError> {
        let view = self
            .views
            .get(view_id)
            .filter(|v| v.is_ready())
            .ok_or(CameraError::ViewNotReady(view_id))?;
        let page_id = view.page_id.clone();

        let profile = self.profiles.get(&page_id);
        let camera_id = DeviceRegistry::resolve(self.hal.as_mut(), profile.facing)?;

        let lock_timeout = self.config.lock_timeout();
        let lock = Arc::clone(&self.lock);
        let _guard = lock.acquire(lock_timeout)?;

        if self.active.is_some() {
            self.teardown();
        }

        self.active_page = page_id;
        self.active_view = Some(view_id);
        self.state = SessionState::Opening;
        tracing::info!(camera_id, view_id, page = %self.active_page, "opening camera");

        if let Err(e) = self.hal.open_device(&camera_id) {
            self.state = SessionState::Closed;
            return Err(e);
        }

        let deadline = Instant::now() + lock_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.hal.poll_event(remaining) {
                Some(HalEvent::DeviceOpened) => {
                    self.state = SessionState::Configuring;
                    return self.configure(&camera_id).inspect_err(|_| self.teardown());
                }
                Some(HalEvent::DeviceDisconnected) => {
                    self.teardown();
                    return Err(CameraError::AccessDenied("camera disconnected".into()));
                }
                Some(HalEvent::DeviceError { code }) => {
                    self.teardown();
                    return Err(CameraError::AccessDenied(format!("device error {code}")));
                }
                Some(other) => self.absorb_stray_event(other),
                None => {
                    self.teardown();
                    return Err(CameraError::AccessDenied("camera open timed out".into()));
                }
            }
        }
    }

    /// Configures the capture session for the active page's profile.
    ///
    /// Builds the preview and still surfaces sized per the profile's
    /// resolution mode, waits for the session to configure, then installs
    /// the repeating preview request.
    fn configure(&mut self, camera_id: &str) -> Result<(), CameraError> {
        self.state = SessionState::Configuring;
        let profile = self.profiles.get(&self.active_page);

        let characteristics = DeviceRegistry::characteristics(self.hal.as_mut(), camera_id)?;
        let preview_sizes = characteristics.sizes_for(ImageFormat::PreviewTexture);
        let jpeg_sizes = characteristics.sizes_for(ImageFormat::Jpeg);

        let preview_size = select_preview_size(&preview_sizes)?;
        let capture_size = select_capture_size(&jpeg_sizes, profile.high_resolution)?;
        tracing::debug!(
            preview = %preview_size,
            capture = %capture_size,
            high_resolution = profile.high_resolution,
            "configuring session"
        );

        let surfaces = [
            SurfaceSpec {
                kind: SurfaceKind::Preview,
                format: ImageFormat::PreviewTexture,
                size: preview_size,
            },
            SurfaceSpec {
                kind: SurfaceKind::Still,
                format: ImageFormat::Jpeg,
                size: capture_size,
            },
        ];
        self.hal.create_session(&surfaces)?;

        let deadline = Instant::now() + self.config.lock_timeout();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.hal.poll_event(remaining) {
                Some(HalEvent::SessionConfigured) => break,
                Some(HalEvent::SessionConfigureFailed { reason }) => {
                    self.hal.close_session();
                    self.state = SessionState::Closed;
                    return Err(CameraError::ConfigurationFailed(reason));
                }
                Some(other) => self.absorb_stray_event(other),
                None => {
                    self.hal.close_session();
                    self.state = SessionState::Closed;
                    return Err(CameraError::ConfigurationFailed(
                        "session configuration timed out".into(),
                    ));
                }
            }
        }

        let sensor = characteristics.sensor_rect;
        self.active = Some(ActiveSession {
            camera_id: camera_id.to_string(),
            characteristics,
            preview_size,
            capture_size,
            profile: profile.clone(),
        });

        let request = build_preview_request(&profile, sensor, &[]);
        if let Err(e) = self.hal.set_repeating(&request) {
            self.hal.close_session();
            self.active = None;
            self.state = SessionState::Closed;
            return Err(CameraError::ConfigurationFailed(e.to_string()));
        }
        self.state = SessionState::Previewing;
        Ok(())
    }

    /// Rebuilds and resubmits the repeating request from the latest
    /// profile values.
    ///
    /// Valid only while previewing. A stale session gets one automatic
    /// reconfiguration retry; a second failure surfaces
    /// `PreviewUpdateFailed` but leaves the coordinator usable.
    pub fn update_preview(&mut self) -> Result<(), CameraError> {
        if self.state != SessionState::Previewing {
            return Err(CameraError::PreviewUpdateFailed(format!(
                "not previewing (state: {})",
                self.state
            )));
        }
        let session = self.active.as_ref().ok_or(CameraError::NoActiveCamera)?;
        let camera_id = session.camera_id.clone();
        let sensor = session.characteristics.sensor_rect;

        let profile = self.profiles.get(&self.active_page);
        if let Some(active) = self.active.as_mut() {
            active.profile = profile.clone();
        }

        let regions: Vec<MeteringRegion> = self.focus_region.into_iter().collect();
        let request = build_preview_request(&profile, sensor, &regions);

        if let Err(first) = self.hal.set_repeating(&request) {
            tracing::warn!(error = %first, "repeating request rejected, reconfiguring once");
            self.hal.close_session();
            if let Err(e) = self.configure(&camera_id) {
                self.teardown();
                return Err(CameraError::PreviewUpdateFailed(e.to_string()));
            }
        }
        Ok(())
    }

    /// Takes a still photo and returns the persisted reference.
    ///
    /// Only valid while previewing; rejects while another capture is
    /// pending. The repeating request stops first and the preview is
    /// reconfigured after delivery, so no interleaved frames are
    /// attributed to the wrong request.
    pub fn capture(&mut self, annotation: Option<Annotation>) -> Result<String, CameraError> {
        if self.active.is_none() {
            return Err(CameraError::NoActiveCamera);
        }
        if self.state != SessionState::Previewing {
            return Err(CameraError::CaptureError(format!(
                "cannot capture while {}",
                self.state
            )));
        }
        self.router.begin(annotation)?;

        let session = match self.active.as_ref() {
            Some(session) => session,
            None => {
                let err = CameraError::NoActiveCamera;
                self.router.fail(&err);
                return Err(err);
            }
        };
        let camera_id = session.camera_id.clone();
        let sensor = session.characteristics.sensor_rect;
        let profile = session.profile.clone();

        if let Err(e) = self.hal.stop_repeating() {
            tracing::debug!(error = %e, "stop repeating before capture failed");
        }

        let request = build_still_request(&profile, sensor);
        if let Err(e) = self.hal.submit_still(&request) {
            let err = CameraError::CaptureError(e.to_string());
            self.router.fail(&err);
            // Still previewing; put the repeating request back.
            if let Err(resume) = self.update_preview() {
                tracing::warn!(error = %resume, "failed to resume preview after rejected still");
            }
            return Err(err);
        }

        self.state = SessionState::Capturing;
        let deadline = Instant::now() + self.config.capture_timeout();
        let outcome = loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.hal.poll_event(remaining) {
                Some(HalEvent::StillCaptured { image }) => {
                    break self.router.deliver(&image, &profile, self.store.as_ref());
                }
                Some(HalEvent::CaptureFailed { reason }) => {
                    let err = CameraError::CaptureError(reason);
                    self.router.fail(&err);
                    break Err(err);
                }
                Some(HalEvent::DeviceDisconnected) | Some(HalEvent::DeviceError { .. }) => {
                    let err = CameraError::CaptureError("device lost during capture".into());
                    self.router.fail(&err);
                    self.teardown();
                    return Err(err);
                }
                Some(other) => self.absorb_stray_event(other),
                None => {
                    let err = CameraError::CaptureTimeout;
                    self.router.fail(&err);
                    break Err(err);
                }
            }
        };

        // The preview surface may have been torn down between requests;
        // resume by rebuilding the whole session.
        self.hal.close_session();
        self.state = SessionState::Configuring;
        if let Err(e) = self.configure(&camera_id) {
            tracing::warn!(error = %e, "failed to resume preview after capture");
            self.teardown();
        }

        outcome
    }

    /// Closes the session and releases every handle. Idempotent.
    pub fn close(&mut self) -> Result<(), CameraError> {
        let lock = Arc::clone(&self.lock);
        match lock.acquire(self.config.lock_timeout()) {
            Ok(_guard) => self.teardown(),
            Err(e) => {
                // Never leak handles over lock contention.
                tracing::warn!(error = %e, "closing without the device lock");
                self.teardown();
            }
        }
        Ok(())
    }

    fn teardown(&mut self) {
        if self.router.is_pending() {
            self.router.fail(&CameraError::Cancelled);
        }
        if let Err(e) = self.hal.stop_repeating() {
            tracing::debug!(error = %e, "stop repeating during close failed");
        }
        self.hal.close_session();
        self.hal.close_device();
        self.active = None;
        self.active_view = None;
        self.focus_region = None;
        self.pending_focus = None;
        if self.state != SessionState::Closed {
            tracing::info!("camera closed");
        }
        self.state = SessionState::Closed;
    }

    /// Re-applies a page's profile after an edit.
    ///
    /// A non-active page is a pure store mutation with no hardware
    /// effect. For the active page, a facing or resolution-mode change
    /// forces a full reopen; anything else refreshes the repeating
    /// request in place.
    pub fn switch_profile(&mut self, page_id: &str) -> Result<(), CameraError> {
        if page_id != self.active_page || self.active.is_none() {
            return Ok(());
        }

        let snapshot = match self.active.as_ref() {
            Some(active) => active.profile.clone(),
            None => return Ok(()),
        };
        let latest = self.profiles.get(page_id);

        if latest.facing != snapshot.facing || latest.high_resolution != snapshot.high_resolution {
            self.reopen_active()
        } else {
            self.update_preview()
        }
    }

    /// Closes and reopens the camera against the active view.
    pub fn reopen_active(&mut self) -> Result<(), CameraError> {
        let view_id = self.active_view.ok_or(CameraError::NoActiveCamera)?;
        self.close()?;
        self.open(view_id)
    }

    /// Runs the touch-to-focus sequence for a view-space touch point.
    pub fn touch_focus(&mut self, view_id: i64, x: f32, y: f32) -> Result<(), CameraError> {
        let view_size = self
            .views
            .get(view_id)
            .and_then(|v| v.surface_size())
            .ok_or(CameraError::ViewNotReady(view_id))?;

        if self.state != SessionState::Previewing {
            return Err(CameraError::NoActiveCamera);
        }
        let session = self.active.as_ref().ok_or(CameraError::NoActiveCamera)?;
        let sensor = session.characteristics.sensor_rect;
        let profile = session.profile.clone();

        let region = compute_focus_region(sensor, view_size, x, y);
        tracing::debug!(x, y, rect = ?region.rect, "focus trigger");

        let request = build_focus_request(&profile, sensor, region);
        self.hal.submit_focus(&request)?;
        self.pending_focus = Some(region);

        // Listen for a bounded window; a sequence that has not reached a
        // terminal state by then stays pending and completes from a later
        // event pump.
        let deadline = Instant::now() + self.config.lock_timeout();
        while self.pending_focus.is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.hal.poll_event(remaining) {
                Some(event) => self.absorb_stray_event(event),
                None => break,
            }
        }
        Ok(())
    }

    /// Drains any buffered hardware events (e.g. a focus sequence that
    /// finished after its bounded listen window).
    pub fn drain_events(&mut self) {
        while let Some(event) = self.hal.poll_event(Duration::ZERO) {
            self.absorb_stray_event(event);
        }
    }

    fn absorb_stray_event(&mut self, event: HalEvent) {
        match event {
            HalEvent::AutofocusUpdate { state } => self.handle_af_state(state),
            other => tracing::debug!(event = ?other, "ignoring stray hardware event"),
        }
    }

    /// Folds a terminal autofocus state back into the repeating request,
    /// keeping the metering regions in force.
    fn handle_af_state(&mut self, af: crate::geometry::AfState) {
        tracing::debug!(state = %af, "autofocus update");
        if !af.is_terminal() {
            return;
        }
        let Some(region) = self.pending_focus.take() else {
            return;
        };
        self.focus_region = Some(region);

        let Some(session) = self.active.as_ref() else {
            return;
        };
        let sensor = session.characteristics.sensor_rect;
        let profile = session.profile.clone();
        let request = build_preview_request(&profile, sensor, &[region]);
        if let Err(e) = self.hal.set_repeating(&request) {
            tracing::warn!(error = %e, "failed to resume preview after focus");
        }
    }

    /// Current preview/capture dimensions and mode flags.
    pub fn camera_info(&self) -> CameraInfo {
        match self.active.as_ref() {
            Some(session) => CameraInfo {
                preview_width: session.preview_size.width,
                preview_height: session.preview_size.height,
                photo_width: session.capture_size.width,
                photo_height: session.capture_size.height,
                photo_format: "JPEG".into(),
                high_resolution_mode: session.profile.high_resolution,
                is_rear_camera: session.profile.facing.is_rear(),
                hdr_mode: session.profile.hdr,
            },
            None => CameraInfo {
                preview_width: 0,
                preview_height: 0,
                photo_width: 0,
                photo_height: 0,
                photo_format: "Unknown".into(),
                high_resolution_mode: false,
                is_rear_camera: false,
                hdr_mode: false,
            },
        }
    }

    /// Average preview brightness for the diagnostic page.
    ///
    /// Any other active page is rejected before touching the hardware.
    pub fn light_intensity(&mut self) -> Result<f64, CameraError> {
        if self.active_page != self.config.diagnostic_page {
            return Err(CameraError::InvalidPage(self.active_page.clone()));
        }
        let frame = self
            .hal
            .preview_snapshot()
            .ok_or(CameraError::ViewNotReady(self.active_view.unwrap_or(-1)))?;
        Ok(average_intensity(&frame))
    }

    /// Snapshot of the active session's profile, if one is live.
    pub fn active_profile(&self) -> Option<CaptureProfile> {
        self.active.as_ref().map(|a| a.profile.clone())
    }

    /// The view backing the live session, if any.
    pub fn active_view(&self) -> Option<i64> {
        self.active_view
    }

    /// Preview size of the live session, if any.
    pub fn preview_size(&self) -> Option<Size> {
        self.active.as_ref().map(|a| a.preview_size)
    }
}
