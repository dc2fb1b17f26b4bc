//! Error taxonomy for the camera coordinator.
//!
//! Every hardware-layer failure is converted into one of these kinds at
//! the coordinator boundary; raw platform errors never reach callers.
//! Each kind carries a stable uppercase wire code used in command replies.

use thiserror::Error;

/// Errors produced by the camera coordinator and its collaborators.
#[derive(Debug, Clone, Error)]
pub enum CameraError {
    #[error("camera access denied: {0}")]
    AccessDenied(String),
    #[error("camera device busy: open/close lock timed out")]
    DeviceBusy,
    #[error("no camera available")]
    NoCameraAvailable,
    #[error("no supported sizes available")]
    NoSizesAvailable,
    #[error("view {0} has no ready surface")]
    ViewNotReady(i64),
    #[error("capture session configuration failed: {0}")]
    ConfigurationFailed(String),
    #[error("preview update failed: {0}")]
    PreviewUpdateFailed(String),
    #[error("a still capture is already in progress")]
    CaptureAlreadyInProgress,
    #[error("no active camera device")]
    NoActiveCamera,
    #[error("capture failed: {0}")]
    CaptureError(String),
    #[error("still capture timed out")]
    CaptureTimeout,
    #[error("failed to persist image: {0}")]
    PersistenceError(String),
    #[error("operation not valid for page {0}")]
    InvalidPage(String),
    #[error("operation cancelled by session teardown")]
    Cancelled,
    #[error("invalid command arguments: {0}")]
    InvalidArguments(String),
    #[error("plugin error: {0}")]
    Plugin(String),
}

impl CameraError {
    /// Stable wire code for command replies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccessDenied(_) => "ACCESS_DENIED",
            Self::DeviceBusy => "DEVICE_BUSY",
            Self::NoCameraAvailable => "NO_CAMERA_AVAILABLE",
            Self::NoSizesAvailable => "NO_SIZES_AVAILABLE",
            Self::ViewNotReady(_) => "VIEW_NOT_READY",
            Self::ConfigurationFailed(_) => "CONFIGURATION_FAILED",
            Self::PreviewUpdateFailed(_) => "PREVIEW_UPDATE_FAILED",
            Self::CaptureAlreadyInProgress => "CAPTURE_IN_PROGRESS",
            Self::NoActiveCamera => "NO_CAMERA",
            Self::CaptureError(_) => "CAMERA_ERROR",
            Self::CaptureTimeout => "CAPTURE_TIMEOUT",
            Self::PersistenceError(_) => "SAVE_ERROR",
            Self::InvalidPage(_) => "INVALID_PAGE",
            Self::Cancelled => "CANCELLED",
            Self::InvalidArguments(_) => "INVALID_ARGS",
            Self::Plugin(_) => "PLUGIN_ERROR",
        }
    }
}
