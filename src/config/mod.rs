//! Configuration management for studio-preview

mod io;
mod types;

pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};

impl Config {
    /// Get the config file path (~/.config/studio-preview/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        io::config_path()
    }

    /// Get the config directory path (~/.config/studio-preview)
    pub fn config_dir() -> Result<PathBuf> {
        io::config_dir()
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> Result<Self> {
        io::load()
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        io::load_from(path)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        io::save(self)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        io::save_to(self, path)
    }

    /// Override the queue width, keeping it at least 1
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.queue.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Disable the background worker (every job runs in its queue slot)
    pub fn without_worker(mut self) -> Self {
        self.worker.enabled = false;
        self
    }
}
