//! Engine configuration.
//!
//! [`EngineConfig`] is the single configuration surface handed to
//! [`crate::controller::BasemapController`]. Defaults favor an impatient
//! interactive map: short timeouts and one worker per spare core.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::TileDiskCache;

/// Default connect timeout for tile requests.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Default total timeout for tile requests.
///
/// Short on purpose: a blank tile now beats a stalled worker; the next
/// redraw round retries anything that was left zero-length.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

/// Top-level engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root directory of the disk tile cache.
    pub cache_dir: PathBuf,

    /// Worker thread count override; `None` uses the hardware default.
    pub workers: Option<usize>,

    /// HTTP connect timeout.
    pub connect_timeout: Duration,

    /// HTTP total request timeout.
    pub request_timeout: Duration,

    /// Credential tokens substituted into URL templates, keyed by
    /// placeholder name. Supplied by the host's key/value store.
    pub credentials: HashMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_dir: TileDiskCache::default_root(),
            workers: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            credentials: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Set the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Override the worker thread count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Set both HTTP timeouts.
    pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }

    /// Add one credential token.
    pub fn with_credential(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.credentials.insert(token.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.workers.is_none());
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(config.credentials.is_empty());
        assert!(config.cache_dir.ends_with("basemap/tiles") || config.cache_dir.ends_with("tiles"));
    }

    #[test]
    fn test_builder_chain() {
        let config = EngineConfig::default()
            .with_cache_dir("/tmp/tiles")
            .with_workers(2)
            .with_timeouts(Duration::from_millis(500), Duration::from_millis(800))
            .with_credential("apikey", "secret");

        assert_eq!(config.cache_dir, PathBuf::from("/tmp/tiles"));
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.connect_timeout, Duration::from_millis(500));
        assert_eq!(config.credentials.get("apikey").unwrap(), "secret");
    }
}
