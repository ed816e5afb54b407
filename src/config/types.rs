//! Configuration type definitions and defaults

use serde::{Deserialize, Serialize};

use crate::downscale::DownscaleSettings;
use crate::tiny::TinySettings;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Blurred placeholder shown while the full preview is processed
    #[serde(default)]
    pub tiny: TinySettings,
    /// Full downscaled preview
    #[serde(default)]
    pub full: DownscaleSettings,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Downscale queue configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum number of downscale jobs running at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

pub fn default_max_concurrency() -> usize {
    3
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
        }
    }
}

/// Background worker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Try the background worker before downscaling in the queue slot
    #[serde(default = "default_worker_enabled")]
    pub enabled: bool,
}

pub fn default_worker_enabled() -> bool {
    true
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_worker_enabled(),
        }
    }
}

impl Config {
    /// Check value ranges. Returns a human-readable message on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.tiny.max_dimension == 0 {
            return Err("tiny.max_dimension must be greater than 0".to_string());
        }
        if self.full.max_dimension == 0 {
            return Err("full.max_dimension must be greater than 0".to_string());
        }
        for (name, quality) in [("tiny.quality", self.tiny.quality), ("full.quality", self.full.quality)] {
            if !(quality > 0.0 && quality <= 1.0) {
                return Err(format!("{} must be in (0, 1], got {}", name, quality));
            }
        }
        if self.tiny.blur_sigma < 0.0 || !self.tiny.blur_sigma.is_finite() {
            return Err("tiny.blur_sigma must be a non-negative number".to_string());
        }
        if self.full.mime_type.trim().is_empty() {
            return Err("full.mime_type must not be empty".to_string());
        }
        if self.queue.max_concurrency == 0 {
            return Err("queue.max_concurrency must be at least 1".to_string());
        }
        Ok(())
    }
}
