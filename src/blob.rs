//! Local image references.
//!
//! A selected file lives in a `BlobStore` under an opaque `ImageKey` until
//! it is released. Readers take an `Arc` of the bytes, so work already in
//! flight keeps its copy alive while new reads after release see `None`.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Serialize, Serializer};

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-unique handle for a selected image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageKey(u64);

impl ImageKey {
    fn next() -> Self {
        ImageKey(NEXT_KEY.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric id of the handle
    pub fn id(&self) -> u64 {
        self.0
    }

    /// Handle rendered as a displayable local URL.
    pub fn to_url(&self) -> String {
        format!("blob:local/{}", self.0)
    }
}

impl fmt::Display for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:local/{}", self.0)
    }
}

/// Serialized as its local URL.
impl Serialize for ImageKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_url())
    }
}

/// Where a file's image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A freshly selected file held in the blob store
    Local(ImageKey),
    /// A stable URL that is displayed as-is
    Remote(String),
}

impl ImageSource {
    pub fn is_local(&self) -> bool {
        matches!(self, ImageSource::Local(_))
    }

    pub fn local_key(&self) -> Option<ImageKey> {
        match self {
            ImageSource::Local(key) => Some(*key),
            ImageSource::Remote(_) => None,
        }
    }
}

/// Registry of live local images.
#[derive(Debug, Default)]
pub struct BlobStore {
    blobs: Mutex<HashMap<ImageKey, Arc<[u8]>>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes and hand back a fresh key.
    pub fn create(&self, bytes: impl Into<Arc<[u8]>>) -> ImageKey {
        let key = ImageKey::next();
        self.lock().insert(key, bytes.into());
        key
    }

    /// Bytes behind `key`, or `None` once released.
    pub fn read(&self, key: ImageKey) -> Option<Arc<[u8]>> {
        self.lock().get(&key).cloned()
    }

    /// Free the entry. Returns false if it was already gone.
    pub fn release(&self, key: ImageKey) -> bool {
        let freed = self.lock().remove(&key).is_some();
        if freed {
            tracing::trace!(%key, "released local image");
        }
        freed
    }

    pub fn is_live(&self, key: ImageKey) -> bool {
        self.lock().contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ImageKey, Arc<[u8]>>> {
        // A panic while holding this lock cannot leave the map half-written
        self.blobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}
