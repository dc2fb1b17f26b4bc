//! Command service worker.
//!
//! All camera work runs on one dedicated thread that owns the
//! [`SessionCoordinator`]. Callers hand in a method name and argument
//! map; the service marshals the call into the worker's mailbox, the
//! worker executes it to completion and sends back exactly one reply.
//! Commands never interleave, so a multi-step operation such as a
//! cross-page capture runs atomically with respect to every other
//! command.

use crate::command::{Command, CommandReply, Parsed, ReplyPayload};
use crate::config::CoordinatorConfig;
use crate::error::CameraError;
use crate::geometry::Size;
use crate::hal::CameraHal;
use crate::profile::{normalize_page_id, CameraSelector, ProfileStore};
use crate::session::SessionCoordinator;
use crate::storage::{ContentResolver, MediaStore};
use serde_json::Value;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

/// View lifecycle notification from the host.
#[derive(Debug, Clone)]
pub enum ViewEvent {
    /// A preview view was created and bound to a page.
    Register {
        view_id: i64,
        page_id: Option<String>,
        use_rear_camera: bool,
    },
    /// The view's rendering surface became available.
    SurfaceAvailable { view_id: i64, size: Size },
    /// The surface changed size.
    SurfaceResized { view_id: i64, size: Size },
    /// The surface was torn down by the host.
    SurfaceDestroyed { view_id: i64 },
    /// The view itself was disposed.
    Dispose { view_id: i64 },
}

enum WorkerMsg {
    Call {
        method: String,
        args: Value,
        reply: mpsc::Sender<CommandReply>,
    },
    View(ViewEvent),
    Shutdown,
}

/// Handle to the session worker thread.
pub struct CameraService {
    tx: mpsc::Sender<WorkerMsg>,
    worker: Option<JoinHandle<()>>,
}

impl CameraService {
    /// Spawns the worker thread around the given hardware and
    /// persistence backends.
    pub fn spawn(
        hal: Box<dyn CameraHal>,
        store: Arc<dyn MediaStore>,
        resolver: Arc<dyn ContentResolver>,
        config: CoordinatorConfig,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let worker = std::thread::spawn(move || {
            let coordinator = SessionCoordinator::new(hal, store, ProfileStore::new(), config);
            Worker {
                coordinator,
                resolver,
            }
            .run(rx);
        });
        Self {
            tx,
            worker: Some(worker),
        }
    }

    /// Executes one command on the worker and waits for its reply.
    ///
    /// Every call produces exactly one reply. If the worker is gone the
    /// reply is a generic plugin error rather than a hang.
    pub fn call(&self, method: &str, args: Value) -> CommandReply {
        let (reply_tx, reply_rx) = mpsc::channel();
        let msg = WorkerMsg::Call {
            method: method.to_string(),
            args,
            reply: reply_tx,
        };
        if self.tx.send(msg).is_err() {
            return CameraError::Plugin("session worker is gone".into()).into();
        }
        match reply_rx.recv() {
            Ok(reply) => reply,
            Err(_) => CameraError::Plugin("session worker dropped the reply".into()).into(),
        }
    }

    /// Forwards a view lifecycle notification to the worker.
    pub fn view_event(&self, event: ViewEvent) {
        if self.tx.send(WorkerMsg::View(event)).is_err() {
            tracing::warn!("view event dropped, session worker is gone");
        }
    }
}

impl Drop for CameraService {
    fn drop(&mut self) {
        let _ = self.tx.send(WorkerMsg::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("session worker panicked");
            }
        }
    }
}

struct Worker {
    coordinator: SessionCoordinator,
    resolver: Arc<dyn ContentResolver>,
}

impl Worker {
    fn run(mut self, rx: mpsc::Receiver<WorkerMsg>) {
        tracing::debug!("session worker started");
        while let Ok(msg) = rx.recv() {
            match msg {
                WorkerMsg::Call {
                    method,
                    args,
                    reply,
                } => {
                    self.coordinator.drain_events();
                    let outcome = self.dispatch(&method, &args);
                    if reply.send(outcome).is_err() {
                        tracing::debug!(method, "caller went away before the reply");
                    }
                }
                WorkerMsg::View(event) => {
                    self.coordinator.drain_events();
                    self.handle_view_event(event);
                }
                WorkerMsg::Shutdown => break,
            }
        }
        if let Err(error) = self.coordinator.close() {
            tracing::warn!(%error, "close on shutdown failed");
        }
        tracing::debug!("session worker stopped");
    }

    fn dispatch(&mut self, method: &str, args: &Value) -> CommandReply {
        let command = match Command::parse(method, args) {
            Ok(Parsed::Command(command)) => command,
            Ok(Parsed::NotImplemented) => {
                tracing::debug!(method, "unimplemented method");
                return CommandReply::NotImplemented;
            }
            Err(error) => {
                tracing::warn!(method, %error, "malformed arguments");
                return error.into();
            }
        };
        tracing::debug!(method, "command accepted");
        self.execute(command)
    }

    fn execute(&mut self, command: Command) -> CommandReply {
        match command {
            Command::InitCamera(args) => self.init_camera(args).into(),
            Command::DisposeCamera(args) => self.dispose_camera(args).into(),
            Command::SwitchCamera(args) => self.switch_camera(args).into(),
            Command::GetCameraInfo => self.camera_info().into(),
            Command::SetZoomLevel(args) => {
                let page = normalize_page_id(args.page_id.as_deref());
                self.edit_profile(&page, false, |p| p.set_zoom(args.zoom_level))
                    .into()
            }
            Command::SetExposureTime(args) => {
                let page = normalize_page_id(args.page_id.as_deref());
                self.edit_profile(&page, false, |p| p.set_fixed_exposure_ns(args.exposure_time))
                    .into()
            }
            Command::SetAutoExposure(args) => {
                let page = normalize_page_id(args.page_id.as_deref());
                self.edit_profile(&page, false, |p| p.set_auto_exposure(args.enabled))
                    .into()
            }
            Command::SetHighResolutionMode(args) => {
                let page = normalize_page_id(args.page_id.as_deref());
                // A resolution change invalidates the still stream, so
                // the session has to be rebuilt, not just refreshed.
                self.edit_profile(&page, true, |p| p.high_resolution = args.enabled)
                    .into()
            }
            Command::SetHdrMode(args) => {
                let page = normalize_page_id(args.page_id.as_deref());
                self.edit_profile(&page, false, |p| p.hdr = args.enabled).into()
            }
            Command::SetCameraParams(args) => self.set_camera_params(args).into(),
            Command::TakePicture(args) => self.take_picture(args).into(),
            Command::PerformManualFocus(args) => self
                .coordinator
                .touch_focus(args.view_id, args.x, args.y)
                .map(|()| ReplyPayload::Value(Value::Bool(true)))
                .into(),
            Command::LoadImageFromContentUri(args) => self
                .resolver
                .read(&args.uri)
                .map(ReplyPayload::Bytes)
                .into(),
            Command::StartIntensityMonitoring => CommandReply::Error {
                code: "NOT_SUPPORTED".into(),
                message: "continuous intensity monitoring was removed; poll \
                          getCurrentLightIntensity instead"
                    .into(),
            },
            Command::StopIntensityMonitoring => CommandReply::ok(true),
            Command::GetCurrentLightIntensity => self
                .coordinator
                .light_intensity()
                .map(|v| ReplyPayload::Value(Value::from(v)))
                .into(),
        }
    }

    fn init_camera(
        &mut self,
        args: crate::command::InitCameraArgs,
    ) -> Result<ReplyPayload, CameraError> {
        let page = normalize_page_id(args.page_id.as_deref());
        self.coordinator.profiles().update(&page, |profile| {
            if let Some(use_rear) = args.use_rear_camera {
                profile.facing = CameraSelector::from_rear_flag(use_rear);
            }
            if let Some(high_resolution) = args.high_resolution_mode {
                profile.high_resolution = high_resolution;
            }
            if let Some(hdr) = args.hdr_mode {
                profile.hdr = hdr;
            }
            if args.use_fixed_camera_params.unwrap_or(false) {
                if let Some(iso) = args.iso_value {
                    if iso > 0 {
                        profile.iso = iso;
                    }
                }
                if let Some(exposure_us) = args.exposure_time_us {
                    if exposure_us > 0 {
                        profile.set_fixed_exposure_ns(exposure_us * 1_000);
                    }
                }
            }
        });
        self.coordinator.set_active_page(page.clone());

        // Opening needs a ready surface. Prefer a view already bound to
        // this page; otherwise adopt the currently active view, which
        // follows the page the caller is initializing.
        let view_id = self
            .coordinator
            .views()
            .ready_view_for_page(&page)
            .map(|v| v.view_id)
            .or_else(|| self.coordinator.active_view());
        if let Some(view_id) = view_id {
            self.coordinator.views_mut().rebind_page(view_id, page);
            self.coordinator.open(view_id)?;
        } else {
            tracing::debug!(page, "no ready view yet, open deferred");
        }
        Ok(ReplyPayload::Value(Value::Bool(true)))
    }

    fn dispose_camera(
        &mut self,
        args: crate::command::PageArgs,
    ) -> Result<ReplyPayload, CameraError> {
        let page = normalize_page_id(args.page_id.as_deref());
        if page == self.coordinator.active_page() {
            self.coordinator.close()?;
        }
        self.coordinator.profiles().remove(&page);
        let removed = self.coordinator.views_mut().remove_page(&page);
        tracing::info!(page, views = removed.len(), "page disposed");
        Ok(ReplyPayload::Value(Value::Bool(true)))
    }

    fn switch_camera(
        &mut self,
        args: crate::command::SwitchCameraArgs,
    ) -> Result<ReplyPayload, CameraError> {
        let page = normalize_page_id(args.page_id.as_deref());
        self.coordinator.profiles().update(&page, |profile| {
            profile.facing = CameraSelector::from_rear_flag(args.use_rear_camera);
        });
        if page == self.coordinator.active_page() {
            self.coordinator.reopen_active()?;
        }
        Ok(ReplyPayload::Value(Value::Bool(true)))
    }

    fn camera_info(&mut self) -> Result<ReplyPayload, CameraError> {
        let info = self.coordinator.camera_info();
        let value = serde_json::to_value(info)
            .map_err(|e| CameraError::Plugin(format!("info serialization failed: {e}")))?;
        Ok(ReplyPayload::Value(value))
    }

    fn set_camera_params(
        &mut self,
        args: crate::command::SetCameraParamsArgs,
    ) -> Result<ReplyPayload, CameraError> {
        if !args.use_fixed_camera_params {
            return Ok(ReplyPayload::Value(Value::Bool(false)));
        }
        let page = normalize_page_id(args.page_id.as_deref());
        self.edit_profile(&page, false, |profile| {
            if let Some(iso) = args.iso_value {
                if iso > 0 {
                    profile.iso = iso;
                }
            }
            match args.exposure_time_us {
                Some(exposure_us) if exposure_us > 0 => {
                    profile.set_fixed_exposure_ns(exposure_us * 1_000);
                }
                _ => profile.set_auto_exposure(true),
            }
        })
    }

    /// Applies an edit to a page profile and propagates it to the live
    /// session when that page is active. Changes that alter the stream
    /// configuration force a full session rebuild.
    fn edit_profile<F>(
        &mut self,
        page: &str,
        rebuild: bool,
        edit: F,
    ) -> Result<ReplyPayload, CameraError>
    where
        F: FnOnce(&mut crate::profile::CaptureProfile),
    {
        self.coordinator.profiles().update(page, edit);
        if page == self.coordinator.active_page() {
            if rebuild {
                self.coordinator.reopen_active()?;
            } else {
                self.coordinator.update_preview()?;
            }
        }
        Ok(ReplyPayload::Value(Value::Bool(true)))
    }

    fn take_picture(
        &mut self,
        args: crate::command::TakePictureArgs,
    ) -> Result<ReplyPayload, CameraError> {
        let page = normalize_page_id(args.page_id.as_deref());
        self.coordinator.profiles().update(&page, |profile| {
            if let Some(hdr) = args.hdr_mode {
                profile.hdr = hdr;
            }
            if let Some(high_resolution) = args.high_resolution_mode {
                profile.high_resolution = high_resolution;
            }
            if args.use_fixed_camera_params.unwrap_or(false) {
                if let Some(iso) = args.iso_value {
                    if iso > 0 {
                        profile.iso = iso;
                    }
                }
                if let Some(exposure_us) = args.exposure_time_us {
                    if exposure_us > 0 {
                        profile.set_fixed_exposure_ns(exposure_us * 1_000);
                    }
                }
            }
        });

        let reference = if page == self.coordinator.active_page() {
            // Fold any profile edits into the repeating request before
            // the still fires; a dead preview fails inside capture.
            let _ = self.coordinator.update_preview();
            self.coordinator.capture(args.illumination_params)?
        } else {
            // Capture for a page that does not own the live session:
            // swap the active page, shoot, then restore. The worker
            // mailbox guarantees nothing interleaves.
            let previous = self.coordinator.active_page().to_string();
            self.coordinator.set_active_page(page);
            let _ = self.coordinator.update_preview();
            let result = self.coordinator.capture(args.illumination_params);
            self.coordinator.set_active_page(previous);
            let _ = self.coordinator.update_preview();
            result?
        };
        Ok(ReplyPayload::Value(Value::String(reference)))
    }

    fn handle_view_event(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::Register {
                view_id,
                page_id,
                use_rear_camera,
            } => {
                let page = normalize_page_id(page_id.as_deref());
                let facing = CameraSelector::from_rear_flag(use_rear_camera);
                self.coordinator.views_mut().register(view_id, page, facing);
            }
            ViewEvent::SurfaceAvailable { view_id, size } => {
                self.coordinator.views_mut().surface_available(view_id, size);
                // Open eagerly when nothing is live yet, or when the
                // surface backing the live session came back.
                let should_open = match self.coordinator.active_view() {
                    None => true,
                    Some(active) => active == view_id,
                };
                if should_open {
                    if let Err(error) = self.coordinator.open(view_id) {
                        tracing::warn!(view_id, %error, "open on surface available failed");
                    }
                }
            }
            ViewEvent::SurfaceResized { view_id, size } => {
                self.coordinator.views_mut().surface_resized(view_id, size);
            }
            ViewEvent::SurfaceDestroyed { view_id } => {
                self.coordinator.views_mut().surface_destroyed(view_id);
                if self.coordinator.active_view() == Some(view_id) {
                    if let Err(error) = self.coordinator.close() {
                        tracing::warn!(view_id, %error, "close on surface destroyed failed");
                    }
                }
            }
            ViewEvent::Dispose { view_id } => {
                if self.coordinator.active_view() == Some(view_id) {
                    if let Err(error) = self.coordinator.close() {
                        tracing::warn!(view_id, %error, "close on view dispose failed");
                    }
                }
                self.coordinator.views_mut().remove(view_id);
            }
        }
    }
}
