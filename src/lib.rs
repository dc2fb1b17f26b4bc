//! Scope Camera Session Library
//!
//! A capture-session coordinator for microscope imaging devices built on
//! a Camera2-style hardware layer. Provides per-page capture profiles,
//! preview lifecycle management, one-shot still capture with annotated
//! file naming, touch-to-focus and digital zoom.
//!
//! # Architecture
//!
//! All hardware work runs on a single session worker that owns the
//! coordinator; commands are marshaled to it through a mailbox:
//!
//! ```text
//! command → service worker → coordinator → hardware layer
//!                ↓               ↓
//!          profile store    capture router → media store
//! ```
//!
//! # Design Principles
//!
//! - **Single-threaded hardware access**: One worker owns the device; callers never touch it
//! - **Explicit lifecycle**: Every transition is a state-machine step, never an implicit callback
//! - **Typed commands**: Unknown methods and malformed arguments are rejected up front
//! - **Profile isolation**: The live session works from a snapshot; edits to other pages never leak in
//!
//! # Example
//!
//! ```no_run
//! use scope_camera::{
//!     config::CoordinatorConfig,
//!     geometry::Size,
//!     hal::MockHal,
//!     service::{CameraService, ViewEvent},
//!     storage::{FileContentResolver, MemoryMediaStore},
//! };
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let service = CameraService::spawn(
//!     Box::new(MockHal::new()),
//!     Arc::new(MemoryMediaStore::new()),
//!     Arc::new(FileContentResolver),
//!     CoordinatorConfig::default(),
//! );
//!
//! // Bind a preview view and hand it a surface
//! service.view_event(ViewEvent::Register {
//!     view_id: 1,
//!     page_id: Some("scan".into()),
//!     use_rear_camera: true,
//! });
//! service.view_event(ViewEvent::SurfaceAvailable {
//!     view_id: 1,
//!     size: Size::new(1080, 1920),
//! });
//!
//! // Drive the session through commands
//! let reply = service.call("initCamera", json!({"pageId": "scan"}));
//! assert!(reply.is_success());
//!
//! let reply = service.call("takePicture", json!({"pageId": "scan"}));
//! println!("saved: {reply:?}");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod command;
pub mod config;
pub mod device;
pub mod error;
pub mod geometry;
pub mod hal;
pub mod intensity;
pub mod profile;
pub mod selection;
pub mod service;
pub mod session;
pub mod storage;
pub mod view;

// Re-export commonly used types at crate root
pub use command::{Command, CommandReply, ReplyPayload};
pub use config::CoordinatorConfig;
pub use error::CameraError;
pub use geometry::{Rect, Size};
pub use hal::{CameraHal, MockHal};
pub use profile::{CaptureProfile, ProfileStore};
pub use service::{CameraService, ViewEvent};
pub use session::{SessionCoordinator, SessionState};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
