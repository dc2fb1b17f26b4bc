//! Persistence collaborators.
//!
//! Writing a captured image to the platform media library and reading
//! bytes back from an opaque content handle are host responsibilities;
//! the coordinator talks to them through these traits. A directory-backed
//! implementation covers tests and the demo binary.

use crate::error::CameraError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Writes captured image bytes under a synthesized name and returns an
/// addressable reference (path or URI).
pub trait MediaStore: Send + Sync {
    fn persist(&self, name: &str, bytes: &[u8]) -> Result<String, CameraError>;
}

/// Reads raw bytes from an opaque content handle.
pub trait ContentResolver: Send + Sync {
    fn read(&self, uri: &str) -> Result<Vec<u8>, CameraError>;
}

/// Media store writing into a local directory.
pub struct DirMediaStore {
    root: PathBuf,
}

impl DirMediaStore {
    /// A store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MediaStore for DirMediaStore {
    fn persist(&self, name: &str, bytes: &[u8]) -> Result<String, CameraError> {
        std::fs::create_dir_all(&self.root)
            .map_err(|e| CameraError::PersistenceError(e.to_string()))?;
        let path = self.root.join(name);
        std::fs::write(&path, bytes).map_err(|e| CameraError::PersistenceError(e.to_string()))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "image persisted");
        Ok(path.display().to_string())
    }
}

/// Content resolver over local file paths.
pub struct FileContentResolver;

impl ContentResolver for FileContentResolver {
    fn read(&self, uri: &str) -> Result<Vec<u8>, CameraError> {
        let path = uri.strip_prefix("file://").unwrap_or(uri);
        std::fs::read(path).map_err(|e| CameraError::PersistenceError(e.to_string()))
    }
}

/// In-memory media store recording every write, for tests.
#[derive(Default)]
pub struct MemoryMediaStore {
    saved: Mutex<Vec<(String, usize)>>,
    fail: Mutex<bool>,
}

impl MemoryMediaStore {
    /// An empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent writes fail with a persistence error.
    pub fn set_fail(&self, on: bool) {
        *self.fail.lock().expect("store poisoned") = on;
    }

    /// Names persisted so far, in order.
    pub fn saved_names(&self) -> Vec<String> {
        self.saved
            .lock()
            .expect("store poisoned")
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl MediaStore for MemoryMediaStore {
    fn persist(&self, name: &str, bytes: &[u8]) -> Result<String, CameraError> {
        if *self.fail.lock().expect("store poisoned") {
            return Err(CameraError::PersistenceError("injected".into()));
        }
        self.saved
            .lock()
            .expect("store poisoned")
            .push((name.to_string(), bytes.len()));
        Ok(format!("memory://{name}"))
    }
}

/// In-memory content resolver, for tests.
#[derive(Default)]
pub struct MemoryContentResolver {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryContentResolver {
    /// An empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers bytes under a content handle.
    pub fn insert(&self, uri: impl Into<String>, bytes: Vec<u8>) {
        self.entries
            .lock()
            .expect("resolver poisoned")
            .insert(uri.into(), bytes);
    }
}

impl ContentResolver for MemoryContentResolver {
    fn read(&self, uri: &str) -> Result<Vec<u8>, CameraError> {
        self.entries
            .lock()
            .expect("resolver poisoned")
            .get(uri)
            .cloned()
            .ok_or_else(|| CameraError::PersistenceError(format!("no content at {uri}")))
    }
}
