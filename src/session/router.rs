//! Still-capture result routing.
//!
//! At most one still-capture request is outstanding at a time. The router
//! holds its annotation metadata while the hardware round trip is in
//! flight, synthesizes the output name when the image arrives and hands
//! the bytes to the persistence collaborator. Success or failure, the
//! pending slot is cleared the instant a result is delivered.

use crate::error::CameraError;
use crate::hal::CapturedImage;
use crate::profile::CaptureProfile;
use crate::storage::MediaStore;
use chrono::Local;
use serde_json::Value;

/// Free-form annotation metadata attached to a capture request.
pub type Annotation = serde_json::Map<String, Value>;

const NAME_PREFIX: &str = "SCOPE_";
const NAME_EXTENSION: &str = ".jpg";

/// State of one accepted still-capture request.
#[derive(Debug, Clone, Default)]
pub struct PendingCapture {
    /// Annotation captured with the request, folded into the name.
    pub annotation: Option<Annotation>,
}

/// Owns the pending-capture slot and result delivery.
#[derive(Debug, Default)]
pub struct CaptureRouter {
    pending: Option<PendingCapture>,
}

impl CaptureRouter {
    /// A router with no pending capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts a new still-capture request.
    ///
    /// Rejects with [`CameraError::CaptureAlreadyInProgress`] while one is
    /// outstanding; the existing pending state is never replaced.
    pub fn begin(&mut self, annotation: Option<Annotation>) -> Result<(), CameraError> {
        if self.pending.is_some() {
            return Err(CameraError::CaptureAlreadyInProgress);
        }
        self.pending = Some(PendingCapture { annotation });
        Ok(())
    }

    /// Whether a capture is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Delivers a captured image: synthesizes the name and persists.
    ///
    /// Clears the pending slot whether persistence succeeds or fails; on
    /// failure the caller receives the error, never a partial success.
    pub fn deliver(
        &mut self,
        image: &CapturedImage,
        profile: &CaptureProfile,
        store: &dyn MediaStore,
    ) -> Result<String, CameraError> {
        let pending = self.pending.take().unwrap_or_default();
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let name = synthesize_name(
            &timestamp,
            pending.annotation.as_ref(),
            profile.hdr,
            profile.high_resolution,
        );

        tracing::info!(
            name,
            bytes = image.bytes.len(),
            size = %image.size,
            "delivering captured image"
        );
        store.persist(&name, &image.bytes)
    }

    /// Fails the pending capture, clearing the slot.
    pub fn fail(&mut self, error: &CameraError) {
        if self.pending.take().is_some() {
            tracing::warn!(error = %error, "pending capture failed");
        }
    }
}

/// Synthesizes the persisted image name.
///
/// Pattern: prefix, timestamp, then — only when an annotation is present —
/// optional type/radius/spacing segments followed by HDR and
/// high-resolution mode tags, always ending in the image extension.
pub fn synthesize_name(
    timestamp: &str,
    annotation: Option<&Annotation>,
    hdr: bool,
    high_resolution: bool,
) -> String {
    let mut name = format!("{NAME_PREFIX}{timestamp}");

    if let Some(annotation) = annotation.filter(|a| !a.is_empty()) {
        if let Some(kind) = annotation.get("type").map(render_text) {
            name.push('_');
            name.push_str(&kind);
        }
        if let Some(radius) = annotation.get("radius").and_then(render_int) {
            name.push_str(&format!("_R{radius}"));
        }
        if let Some(spacing) = annotation.get("spacing").and_then(render_int) {
            name.push_str(&format!("_S{spacing}"));
        }
        if hdr {
            name.push_str("_HDR");
        }
        if high_resolution {
            name.push_str("_HR");
        }
    }

    name.push_str(NAME_EXTENSION);
    name
}

fn render_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::storage::MemoryMediaStore;
    use serde_json::json;

    fn ring_annotation() -> Annotation {
        let mut annotation = Annotation::new();
        annotation.insert("type".into(), json!("ring"));
        annotation.insert("radius".into(), json!(12));
        annotation.insert("spacing".into(), json!(4));
        annotation
    }

    #[test]
    fn test_plain_name_is_timestamp_only() {
        let name = synthesize_name("20260829_101500", None, true, true);
        assert_eq!(name, "SCOPE_20260829_101500.jpg");
    }

    #[test]
    fn test_empty_annotation_counts_as_absent() {
        let annotation = Annotation::new();
        let name = synthesize_name("20260829_101500", Some(&annotation), true, true);
        assert_eq!(name, "SCOPE_20260829_101500.jpg");
    }

    #[test]
    fn test_annotated_name_segments_in_order() {
        let annotation = ring_annotation();
        let name = synthesize_name("20260829_101500", Some(&annotation), true, false);
        assert_eq!(name, "SCOPE_20260829_101500_ring_R12_S4_HDR.jpg");
    }

    #[test]
    fn test_mode_tags_follow_annotation_segments() {
        let annotation = ring_annotation();
        let name = synthesize_name("20260829_101500", Some(&annotation), true, true);
        assert_eq!(name, "SCOPE_20260829_101500_ring_R12_S4_HDR_HR.jpg");
    }

    #[test]
    fn test_string_numbers_are_coerced() {
        let mut annotation = Annotation::new();
        annotation.insert("radius".into(), json!("7"));
        let name = synthesize_name("20260829_101500", Some(&annotation), false, false);
        assert_eq!(name, "SCOPE_20260829_101500_R7.jpg");
    }

    #[test]
    fn test_single_pending_capture() {
        let mut router = CaptureRouter::new();
        router.begin(None).unwrap();
        assert!(matches!(
            router.begin(Some(ring_annotation())),
            Err(CameraError::CaptureAlreadyInProgress)
        ));
        // The first pending capture survives the rejected request.
        assert!(router.is_pending());
    }

    #[test]
    fn test_deliver_persists_and_clears() {
        let mut router = CaptureRouter::new();
        router.begin(None).unwrap();

        let store = MemoryMediaStore::new();
        let image = CapturedImage {
            bytes: vec![0xFF, 0xD8],
            size: Size::new(10, 10),
        };
        let reference = router
            .deliver(&image, &CaptureProfile::default(), &store)
            .unwrap();

        assert!(reference.starts_with("memory://SCOPE_"));
        assert!(!router.is_pending());
        assert_eq!(store.saved_names().len(), 1);
    }

    #[test]
    fn test_persistence_failure_propagates() {
        let mut router = CaptureRouter::new();
        router.begin(None).unwrap();

        let store = MemoryMediaStore::new();
        store.set_fail(true);
        let image = CapturedImage {
            bytes: vec![],
            size: Size::new(1, 1),
        };
        assert!(matches!(
            router.deliver(&image, &CaptureProfile::default(), &store),
            Err(CameraError::PersistenceError(_))
        ));
        assert!(!router.is_pending());
    }

    #[test]
    fn test_fail_clears_pending() {
        let mut router = CaptureRouter::new();
        router.begin(None).unwrap();
        router.fail(&CameraError::Cancelled);
        assert!(!router.is_pending());
    }
}
