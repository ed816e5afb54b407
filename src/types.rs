//! Preview values shared by the caches, generators and orchestrator.

use serde::Serialize;

use crate::blob::ImageKey;

/// A displayable preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Preview {
    /// Downscaled image embedded as a `data:` URL
    Encoded(String),
    /// Degraded case: the unprocessed local image
    Source(ImageKey),
    /// Already-published image at a stable URL
    Remote(String),
}

impl Preview {
    /// String suitable for an image `src` attribute.
    pub fn as_src(&self) -> String {
        match self {
            Preview::Encoded(url) | Preview::Remote(url) => url.clone(),
            Preview::Source(key) => key.to_url(),
        }
    }

    pub fn is_encoded(&self) -> bool {
        matches!(self, Preview::Encoded(_))
    }

    pub fn is_source(&self) -> bool {
        matches!(self, Preview::Source(_))
    }

    /// The data URL, if this preview was produced by the pipeline
    pub fn data_url(&self) -> Option<&str> {
        match self {
            Preview::Encoded(url) => Some(url),
            _ => None,
        }
    }
}
