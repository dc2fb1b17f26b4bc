//! Session state machine vocabulary.

use crate::geometry::Size;
use crate::hal::DeviceCharacteristics;
use crate::profile::CaptureProfile;

/// Lifecycle state of the capture session.
///
/// `Closed → Opening → Configuring → Previewing → Capturing` and back to
/// `Previewing` after a still; `close` is valid from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No device held.
    Closed,
    /// Device open requested, waiting for the hardware.
    Opening,
    /// Session and surfaces being built.
    Configuring,
    /// Repeating preview running.
    Previewing,
    /// One-shot still in flight.
    Capturing,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Configuring => "configuring",
            Self::Previewing => "previewing",
            Self::Capturing => "capturing",
        };
        f.write_str(name)
    }
}

/// The single live session owned by the coordinator.
///
/// Constructed only once the device handle exists; torn down as a unit.
/// The profile is a snapshot copied from the active page at configuration
/// time so concurrent edits to other pages cannot disturb in-flight
/// hardware operations.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    /// Id of the opened camera.
    pub camera_id: String,
    /// Characteristics snapshot taken at configure time.
    pub characteristics: DeviceCharacteristics,
    /// Selected preview stream size.
    pub preview_size: Size,
    /// Selected still capture size.
    pub capture_size: Size,
    /// Profile snapshot the session was configured from.
    pub profile: CaptureProfile,
}
