//! Studio Preview Library
//!
//! Progressive image previews for photo-session uploads: a blurred tiny
//! placeholder first, then a downscaled full preview produced off the
//! calling thread under a bounded concurrency limit.

pub mod blob;
pub mod cache;
pub mod cli;
pub mod config;
pub mod downscale;
pub mod error;
pub mod pipeline;
pub mod preview;
pub mod queue;
pub mod raster;
pub mod session;
pub mod tiny;
pub mod types;

pub use blob::{BlobStore, ImageKey, ImageSource};
pub use cache::{PreviewCache, PreviewCaches};
pub use config::Config;
pub use downscale::{DownscaleSettings, EncodedPreview};
pub use error::PreviewError;
pub use pipeline::PreviewPipeline;
pub use preview::{FilePreview, PreviewState};
pub use queue::TaskQueue;
pub use raster::{ImageCodec, RasterCodec};
pub use session::{FileRecord, StatusCounts, UploadSession, UploadStatus};
pub use tiny::TinySettings;
pub use types::Preview;
