//! Scope Camera CLI
//!
//! Command-line driver for exercising the session coordinator against
//! the mock hardware layer.

use clap::Parser;
use scope_camera::{
    config::CoordinatorConfig,
    geometry::Size,
    hal::MockHal,
    service::{CameraService, ViewEvent},
    storage::{DirMediaStore, FileContentResolver},
    CommandReply,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Demonstration driver for the capture-session coordinator.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Page id to run the session under.
    #[arg(long, default_value = "demo_page")]
    page: String,

    /// Number of still captures to take.
    #[arg(long, default_value_t = 3)]
    shots: u32,

    /// Directory captured images are written into.
    #[arg(long, default_value = "captures")]
    storage_dir: String,

    /// Digital zoom factor applied before capturing.
    #[arg(long, default_value_t = 1.0)]
    zoom: f32,

    /// Use the front-facing camera.
    #[arg(long)]
    front: bool,

    /// Enable HDR for captures.
    #[arg(long)]
    hdr: bool,

    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<String>,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Scope Camera v{}", scope_camera::VERSION);
    info!("This is a demonstration using mock camera hardware");

    let config = match &args.config {
        Some(path) => match CoordinatorConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration: {}", e);
                std::process::exit(1);
            }
        },
        None => CoordinatorConfig::default(),
    };

    let service = CameraService::spawn(
        Box::new(MockHal::new()),
        Arc::new(DirMediaStore::new(&args.storage_dir)),
        Arc::new(FileContentResolver),
        config,
    );

    // Bind a preview view and hand it a surface, the way the host
    // platform would when the widget is laid out.
    service.view_event(ViewEvent::Register {
        view_id: 1,
        page_id: Some(args.page.clone()),
        use_rear_camera: !args.front,
    });
    service.view_event(ViewEvent::SurfaceAvailable {
        view_id: 1,
        size: Size::new(1080, 1920),
    });

    let reply = service.call(
        "initCamera",
        json!({
            "pageId": args.page,
            "useRearCamera": !args.front,
            "hdrMode": args.hdr,
        }),
    );
    if !reply.is_success() {
        eprintln!("Failed to open camera: {:?}", reply);
        std::process::exit(1);
    }

    if (args.zoom - 1.0).abs() > f32::EPSILON {
        let reply = service.call(
            "setZoomLevel",
            json!({"pageId": args.page, "zoomLevel": args.zoom}),
        );
        if !reply.is_success() {
            warn!("Zoom request rejected: {:?}", reply);
        }
    }

    if let Some(info) = service.call("getCameraInfo", json!({})).value() {
        info!("Session info: {}", info);
    }

    let mut saved = 0u32;
    for i in 0..args.shots {
        let reply = service.call(
            "takePicture",
            json!({
                "pageId": args.page,
                "illuminationParams": {"type": "brightfield", "ringIntensity": 10 + i},
            }),
        );
        match reply {
            CommandReply::Success(payload) => {
                saved += 1;
                info!("Capture {} saved: {:?}", i + 1, payload);
            }
            other => warn!("Capture {} failed: {:?}", i + 1, other),
        }
    }

    info!("Captured {} of {} stills", saved, args.shots);

    let reply = service.call("disposeCamera", json!({"pageId": args.page}));
    if !reply.is_success() {
        warn!("Dispose failed: {:?}", reply);
    }

    info!("Done.");
}
