//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background clear task interval in seconds
    pub clear_interval: u64,
    /// Clean entries the top layer may hold before the clear task trims them
    pub max_clean_entries: usize,
    /// Number of cache layers stacked over the base store
    pub cache_depth: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEAR_INTERVAL` - Clear task frequency in seconds (default: 30)
    /// - `MAX_CLEAN_ENTRIES` - Read-cache size that triggers a clear (default: 10000)
    /// - `CACHE_DEPTH` - Cache layers over the base store, at least 1 (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            clear_interval: env_or("CLEAR_INTERVAL", defaults.clear_interval),
            max_clean_entries: env_or("MAX_CLEAN_ENTRIES", defaults.max_clean_entries),
            cache_depth: env_or("CACHE_DEPTH", defaults.cache_depth).max(1),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            clear_interval: 30,
            max_clean_entries: 10_000,
            cache_depth: 1,
        }
    }
}
