//! Typed command surface.
//!
//! Commands arrive from the UI bridge as a method name plus a
//! loosely-typed argument map. Each method name maps to a closed struct;
//! unknown or malformed fields are rejected with a typed validation
//! error instead of best-effort coercion, and an unknown method yields a
//! "not implemented" reply rather than an error.

use crate::error::CameraError;
use crate::session::Annotation;
use serde::Deserialize;
use serde_json::Value;

/// Arguments for `initCamera`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InitCameraArgs {
    /// Target page; the shared default page when omitted.
    #[serde(default)]
    pub page_id: Option<String>,
    /// Camera facing to select.
    #[serde(default)]
    pub use_rear_camera: Option<bool>,
    /// Full-sensor still resolution toggle.
    #[serde(default)]
    pub high_resolution_mode: Option<bool>,
    /// HDR scene mode toggle.
    #[serde(default)]
    pub hdr_mode: Option<bool>,
    /// When true, the fixed ISO/exposure values below apply.
    #[serde(default)]
    pub use_fixed_camera_params: Option<bool>,
    /// Fixed ISO; ignored unless positive.
    #[serde(default)]
    pub iso_value: Option<i32>,
    /// Fixed exposure time in microseconds; ignored unless positive.
    #[serde(default)]
    pub exposure_time_us: Option<i64>,
}

/// Arguments carrying only a page id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PageArgs {
    /// Target page; the shared default page when omitted.
    #[serde(default)]
    pub page_id: Option<String>,
}

/// Arguments for `switchCamera`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SwitchCameraArgs {
    /// Target page; the shared default page when omitted.
    #[serde(default)]
    pub page_id: Option<String>,
    /// Camera facing to select.
    pub use_rear_camera: bool,
}

/// Arguments for `setZoomLevel`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetZoomLevelArgs {
    /// Target page; the shared default page when omitted.
    #[serde(default)]
    pub page_id: Option<String>,
    /// Digital zoom factor; clamped to the supported range.
    pub zoom_level: f32,
}

/// Arguments for `setExposureTime` (nanoseconds).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetExposureTimeArgs {
    /// Target page; the shared default page when omitted.
    #[serde(default)]
    pub page_id: Option<String>,
    /// Fixed exposure time in nanoseconds; disables auto-exposure.
    pub exposure_time: i64,
}

/// Arguments toggling a boolean mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetFlagArgs {
    /// Target page; the shared default page when omitted.
    #[serde(default)]
    pub page_id: Option<String>,
    /// New value of the flag.
    pub enabled: bool,
}

/// Arguments for `setCameraParams`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetCameraParamsArgs {
    /// Target page; the shared default page when omitted.
    #[serde(default)]
    pub page_id: Option<String>,
    /// When false the whole call is a no-op.
    #[serde(default)]
    pub use_fixed_camera_params: bool,
    /// Fixed ISO; ignored unless positive.
    #[serde(default)]
    pub iso_value: Option<i32>,
    /// Fixed exposure time in microseconds; ignored unless positive.
    #[serde(default)]
    pub exposure_time_us: Option<i64>,
}

/// Arguments for `takePicture`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TakePictureArgs {
    /// Target page; the shared default page when omitted.
    #[serde(default)]
    pub page_id: Option<String>,
    /// HDR scene mode toggle.
    #[serde(default)]
    pub hdr_mode: Option<bool>,
    /// Full-sensor still resolution toggle.
    #[serde(default)]
    pub high_resolution_mode: Option<bool>,
    /// When true, the fixed ISO/exposure values below apply.
    #[serde(default)]
    pub use_fixed_camera_params: Option<bool>,
    /// Fixed ISO; ignored unless positive.
    #[serde(default)]
    pub iso_value: Option<i32>,
    /// Fixed exposure time in microseconds; ignored unless positive.
    #[serde(default)]
    pub exposure_time_us: Option<i64>,
    /// Free-form annotation folded into the persisted file name.
    #[serde(default)]
    pub illumination_params: Option<Annotation>,
}

/// Arguments for `performManualFocus`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ManualFocusArgs {
    /// View whose surface the touch landed on.
    pub view_id: i64,
    /// Touch x in view coordinates.
    pub x: f32,
    /// Touch y in view coordinates.
    pub y: f32,
}

/// Arguments for `loadImageFromContentUri`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoadImageArgs {
    /// Opaque content handle to read.
    pub uri: String,
}

/// A fully-validated command.
#[derive(Debug, Clone)]
pub enum Command {
    /// Apply profile parameters and open the camera for a page.
    InitCamera(InitCameraArgs),
    /// Close the session if the page owns it and forget its state.
    DisposeCamera(PageArgs),
    /// Change the camera facing for a page.
    SwitchCamera(SwitchCameraArgs),
    /// Report the live session's dimensions and mode flags.
    GetCameraInfo,
    /// Set the digital zoom factor for a page.
    SetZoomLevel(SetZoomLevelArgs),
    /// Fix the exposure time for a page.
    SetExposureTime(SetExposureTimeArgs),
    /// Toggle auto-exposure for a page.
    SetAutoExposure(SetFlagArgs),
    /// Toggle full-sensor still resolution for a page.
    SetHighResolutionMode(SetFlagArgs),
    /// Toggle HDR scene mode for a page.
    SetHdrMode(SetFlagArgs),
    /// Apply fixed ISO/exposure values for a page.
    SetCameraParams(SetCameraParamsArgs),
    /// Capture a still and persist it under a synthesized name.
    TakePicture(TakePictureArgs),
    /// Run the touch-to-focus sequence at a view coordinate.
    PerformManualFocus(ManualFocusArgs),
    /// Read raw bytes back from an opaque content handle.
    LoadImageFromContentUri(LoadImageArgs),
    /// Legacy monitoring entry point; always rejected.
    StartIntensityMonitoring,
    /// Legacy monitoring entry point; always succeeds.
    StopIntensityMonitoring,
    /// Sample the preview brightness on the diagnostic page.
    GetCurrentLightIntensity,
}

/// Result of mapping a wire call onto the command set.
#[derive(Debug)]
pub enum Parsed {
    /// A recognized method with valid arguments.
    Command(Command),
    /// Method name outside the command set.
    NotImplemented,
}

impl Command {
    /// Parses a method name and argument value into a typed command.
    pub fn parse(method: &str, args: &Value) -> Result<Parsed, CameraError> {
        fn decode<T: for<'de> Deserialize<'de>>(args: &Value) -> Result<T, CameraError> {
            let args = match args {
                Value::Null => Value::Object(serde_json::Map::new()),
                other => other.clone(),
            };
            serde_json::from_value(args).map_err(|e| CameraError::InvalidArguments(e.to_string()))
        }

        let command = match method {
            "initCamera" => Command::InitCamera(decode(args)?),
            "disposeCamera" => Command::DisposeCamera(decode(args)?),
            "switchCamera" => Command::SwitchCamera(decode(args)?),
            "getCameraInfo" => Command::GetCameraInfo,
            "setZoomLevel" => Command::SetZoomLevel(decode(args)?),
            "setExposureTime" => Command::SetExposureTime(decode(args)?),
            "setAutoExposure" => Command::SetAutoExposure(decode(args)?),
            "setHighResolutionMode" => Command::SetHighResolutionMode(decode(args)?),
            "setHDRMode" => Command::SetHdrMode(decode(args)?),
            "setCameraParams" => Command::SetCameraParams(decode(args)?),
            "takePicture" => Command::TakePicture(decode(args)?),
            "performManualFocus" => Command::PerformManualFocus(decode(args)?),
            "loadImageFromContentUri" => Command::LoadImageFromContentUri(decode(args)?),
            "startIntensityMonitoring" => Command::StartIntensityMonitoring,
            "stopIntensityMonitoring" => Command::StopIntensityMonitoring,
            "getCurrentLightIntensity" => Command::GetCurrentLightIntensity,
            _ => return Ok(Parsed::NotImplemented),
        };
        Ok(Parsed::Command(command))
    }
}

/// Payload of a successful reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyPayload {
    /// A JSON-encodable result.
    Value(Value),
    /// Raw byte buffers (e.g. loaded image data) skip JSON encoding.
    Bytes(Vec<u8>),
}

/// The single reply every command produces.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandReply {
    /// The command completed; the payload is its result.
    Success(ReplyPayload),
    /// The command failed with a stable wire code.
    Error {
        /// Stable uppercase wire code.
        code: String,
        /// Human-readable description.
        message: String,
    },
    /// The method name is outside the command set.
    NotImplemented,
}

impl CommandReply {
    /// A success reply wrapping a JSON value.
    pub fn ok(value: impl Into<Value>) -> Self {
        Self::Success(ReplyPayload::Value(value.into()))
    }

    /// A success reply wrapping a raw byte buffer.
    pub fn ok_bytes(bytes: Vec<u8>) -> Self {
        Self::Success(ReplyPayload::Bytes(bytes))
    }

    /// Whether this reply is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The error code, when this reply is an error.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Error { code, .. } => Some(code),
            _ => None,
        }
    }

    /// The success payload as a JSON value, when present.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Success(ReplyPayload::Value(value)) => Some(value),
            _ => None,
        }
    }
}

impl From<CameraError> for CommandReply {
    fn from(error: CameraError) -> Self {
        Self::Error {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

impl From<Result<ReplyPayload, CameraError>> for CommandReply {
    fn from(result: Result<ReplyPayload, CameraError>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(error) => error.into(),
        }
    }
}
