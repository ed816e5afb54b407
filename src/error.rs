//! Preview pipeline errors.
//!
//! These never escape the public preview paths: every stage converts them
//! into a fallback `Preview` and logs them. They are public so codec
//! implementations and the worker protocol can name them.

/// Errors raised by the decode / resize / encode stages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image as {mime}: {message}")]
    Encode { mime: String, message: String },

    #[error("Encoder does not support {0}")]
    UnsupportedEncoding(String),

    #[error("Offscreen rendering surface unavailable")]
    SurfaceUnavailable,

    #[error("Background worker unavailable")]
    WorkerUnavailable,

    #[error("Source image was already released")]
    Released,

    #[error("Worker panicked: {0}")]
    Panicked(String),
}

impl From<image::ImageError> for PreviewError {
    fn from(err: image::ImageError) -> Self {
        PreviewError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PreviewError>;
