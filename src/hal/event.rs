//! Hardware completion events.
//!
//! The platform camera stack reports progress through callbacks; the HAL
//! surfaces them as explicit event values instead. The session worker
//! pumps these events and each one maps to exactly one state-machine
//! transition.

use crate::geometry::{AfState, Size};

/// An image delivered by a completed still capture.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    /// Encoded image bytes (JPEG).
    pub bytes: Vec<u8>,
    /// Image dimensions.
    pub size: Size,
}

/// A completion event emitted by the hardware layer.
#[derive(Debug, Clone)]
pub enum HalEvent {
    /// The device finished opening and is ready for a session.
    DeviceOpened,
    /// The device was disconnected (e.g. claimed by another client).
    DeviceDisconnected,
    /// The device reported a fatal error.
    DeviceError { code: i32 },
    /// The capture session is configured and can accept requests.
    SessionConfigured,
    /// Session configuration was rejected.
    SessionConfigureFailed { reason: String },
    /// A still capture delivered its image.
    StillCaptured { image: CapturedImage },
    /// A submitted capture failed at the hardware level.
    CaptureFailed { reason: String },
    /// Autofocus progress after a focus trigger.
    AutofocusUpdate { state: AfState },
}
