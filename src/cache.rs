//! Preview caches keyed by local image handle
//!
//! Two independent stores: finished full previews and tiny placeholders.
//! There is no eviction. Entries live as long as the owning session, which
//! bounds them by the number of files selected.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::blob::ImageKey;
use crate::types::Preview;

/// Insert-once preview store.
///
/// The first value written for a key is authoritative; later writes for
/// the same key are ignored.
#[derive(Debug, Default)]
pub struct PreviewCache {
    /// Cached entries (key -> preview)
    entries: Mutex<HashMap<ImageKey, Preview>>,
}

impl PreviewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached preview without side effects
    pub fn peek(&self, key: ImageKey) -> Option<Preview> {
        self.lock().get(&key).cloned()
    }

    /// Store a preview. Returns false if the key was already present.
    pub fn set(&self, key: ImageKey, value: Preview) -> bool {
        let mut entries = self.lock();
        if entries.contains_key(&key) {
            return false;
        }
        entries.insert(key, value);
        true
    }

    pub fn contains(&self, key: ImageKey) -> bool {
        self.lock().contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ImageKey, Preview>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The full-preview and tiny-preview caches of one upload session.
#[derive(Debug, Default)]
pub struct PreviewCaches {
    pub full: PreviewCache,
    pub tiny: PreviewCache,
}

impl PreviewCaches {
    pub fn new() -> Self {
        Self::default()
    }
}
