//! Mirror configuration.

use cbmirror_sync::{RetryConfig, SyncConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the mirror lives and how it reaches the server.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Directory holding the registry files.
    pub cache_dir: PathBuf,
    /// Directory receiving player sound effects; `None` skips sound effects.
    pub sfx_dir: Option<PathBuf>,
    /// Server connection settings.
    pub sync: SyncConfig,
}

impl MirrorConfig {
    /// Creates a configuration with the default server settings.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            sfx_dir: None,
            sync: SyncConfig::default(),
        }
    }

    /// Sets the server base URL.
    #[must_use]
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.sync.server_url = url.into();
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.sync = self.sync.with_api_key(key);
        self
    }

    /// Enables sound effect sync into `dir`.
    #[must_use]
    pub fn with_sfx_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sfx_dir = Some(dir.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.sync = self.sync.with_timeout(timeout);
        self
    }

    /// Sets the delivery retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.sync = self.sync.with_retry(retry);
        self
    }

    /// Directory holding the registry files.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self::new("cache")
    }
}
