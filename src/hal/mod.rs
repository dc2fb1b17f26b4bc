//! Hardware abstraction layer.
//!
//! This module defines the trait boundary between the session coordinator
//! and the platform camera stack, together with the request vocabulary
//! shared across it. A mock implementation backs tests and the demo
//! binary; a real backend would wrap the platform's Camera2-class API.

mod event;
mod frame;
mod mock;

pub use event::{CapturedImage, HalEvent};
pub use frame::{Frame, RGB_BYTES_PER_PIXEL};
pub use mock::{MockHal, MockHalHandle};

use crate::error::CameraError;
use crate::geometry::{MeteringRegion, Rect, Size};
use std::time::Duration;

/// Physical orientation of a camera as reported by enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// World-facing lens.
    Back,
    /// User-facing lens.
    Front,
    /// Externally attached camera.
    External,
}

/// One enumerated camera.
#[derive(Debug, Clone)]
pub struct CameraDescriptor {
    /// Platform camera id.
    pub id: String,
    /// Which way the lens points.
    pub facing: Facing,
}

/// A supported output stream configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Output image format of the stream.
    pub format: ImageFormat,
    /// Output dimensions of the stream.
    pub size: Size,
}

/// Output image formats the coordinator cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Encoded still-capture output.
    Jpeg,
    /// Preview texture stream.
    PreviewTexture,
}

/// Static characteristics fetched when a device is resolved.
#[derive(Debug, Clone)]
pub struct DeviceCharacteristics {
    pub id: String,
    /// Sensor active-array rectangle.
    pub sensor_rect: Rect,
    /// Supported stream configurations.
    pub streams: Vec<StreamConfig>,
}

impl DeviceCharacteristics {
    /// Supported sizes for one output format.
    pub fn sizes_for(&self, format: ImageFormat) -> Vec<Size> {
        self.streams
            .iter()
            .filter(|s| s.format == format)
            .map(|s| s.size)
            .collect()
    }
}

/// Which output surface a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Streams continuous preview frames.
    Preview,
    /// Receives one-shot still images.
    Still,
}

/// A surface the session coordinator asks the HAL to materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSpec {
    /// Role of the surface in the session.
    pub kind: SurfaceKind,
    /// Image format the surface receives.
    pub format: ImageFormat,
    /// Surface dimensions.
    pub size: Size,
}

/// Base template a capture request derives from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTemplate {
    /// Tuned for continuous preview streaming.
    Preview,
    /// Tuned for a one-shot, full-quality still.
    StillCapture,
}

/// Auto-exposure mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExposureMode {
    /// Hardware meters exposure automatically.
    On,
    /// Exposure time and sensitivity are fixed by the request.
    Off,
}

/// Autofocus mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfMode {
    /// Continuous autofocus tuned for stills; used by the preview stream.
    ContinuousPicture,
    /// One-shot autofocus; used for touch-to-focus triggers.
    Auto,
}

/// Autofocus trigger accompanying a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfTrigger {
    /// No trigger change.
    Idle,
    /// Start a focus sweep.
    Start,
}

/// A fully-specified capture request handed to the hardware.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    /// Base template the request derives from.
    pub template: RequestTemplate,
    /// Surfaces the output frames go to.
    pub targets: Vec<SurfaceKind>,
    /// Auto-exposure on or off.
    pub exposure: ExposureMode,
    /// Fixed exposure duration in nanoseconds; 0 leaves it to the device.
    pub exposure_time_ns: i64,
    /// Fixed ISO sensitivity; 0 leaves it to the device.
    pub iso: i32,
    /// HDR scene mode.
    pub hdr: bool,
    /// Sensor crop region driving digital zoom.
    pub crop_region: Option<Rect>,
    /// Autofocus mode.
    pub af_mode: AfMode,
    /// Autofocus trigger for this request.
    pub af_trigger: AfTrigger,
    /// Autofocus metering regions.
    pub af_regions: Vec<MeteringRegion>,
    /// Auto-exposure metering regions.
    pub ae_regions: Vec<MeteringRegion>,
}

/// Trait boundary to the platform camera stack.
///
/// Open, configure, still-capture and focus operations begin
/// asynchronously; their outcomes arrive as [`HalEvent`] values through
/// [`CameraHal::poll_event`]. All methods are invoked from the single
/// session worker.
pub trait CameraHal: Send {
    /// Enumerates available cameras.
    fn enumerate(&mut self) -> Result<Vec<CameraDescriptor>, CameraError>;

    /// Fetches static characteristics for one camera.
    fn characteristics(&mut self, id: &str) -> Result<DeviceCharacteristics, CameraError>;

    /// Begins opening a device; completion arrives as a device event.
    fn open_device(&mut self, id: &str) -> Result<(), CameraError>;

    /// Begins configuring a capture session over the given surfaces.
    fn create_session(&mut self, surfaces: &[SurfaceSpec]) -> Result<(), CameraError>;

    /// Installs or replaces the repeating preview request.
    fn set_repeating(&mut self, request: &CaptureRequest) -> Result<(), CameraError>;

    /// Stops the repeating preview request.
    fn stop_repeating(&mut self) -> Result<(), CameraError>;

    /// Submits a one-shot still capture; the image arrives as an event.
    fn submit_still(&mut self, request: &CaptureRequest) -> Result<(), CameraError>;

    /// Submits a one-shot focus trigger; progress arrives as AF events.
    fn submit_focus(&mut self, request: &CaptureRequest) -> Result<(), CameraError>;

    /// Tears down the capture session. Safe to call when none exists.
    fn close_session(&mut self);

    /// Closes the device handle. Safe to call when none exists.
    fn close_device(&mut self);

    /// Waits up to `timeout` for the next hardware event.
    fn poll_event(&mut self, timeout: Duration) -> Option<HalEvent>;

    /// Grabs the most recent preview frame, if the stream is live.
    fn preview_snapshot(&mut self) -> Option<Frame>;
}
