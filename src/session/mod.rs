//! Session lifecycle.
//!
//! Everything that owns live hardware state lives here: the coordinator
//! driving the open/configure/preview/capture/close state machine, the
//! timed open/close lock, capture request construction and still-capture
//! result routing.

mod coordinator;
mod lock;
mod request;
mod router;
mod state;

pub use coordinator::{CameraInfo, SessionCoordinator};
pub use lock::{DeviceLock, DeviceLockGuard};
pub use request::{build_focus_request, build_preview_request, build_still_request};
pub use router::{synthesize_name, Annotation, CaptureRouter, PendingCapture};
pub use state::{ActiveSession, SessionState};
