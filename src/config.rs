//! Configuration Module
//!
//! Handles loading service configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL};

/// Service configuration, fixed at process start.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of cached views
    pub cache_max_entries: usize,
    /// Cache entry lifetime in milliseconds; also the janitor period
    pub cache_ttl_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Application log written by the server and read by log exports
    pub log_file: String,
    /// Directory receiving exported log extracts
    pub log_export_dir: String,
    /// Pause before an export job reads the log, in milliseconds
    pub log_export_delay_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Cache capacity (default: 100, minimum: 1)
    /// - `CACHE_TTL_MS` - Entry lifetime in milliseconds (default: 600000)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `LOG_FILE` - Application log path (default: logs/application.log)
    /// - `LOG_EXPORT_DIR` - Export directory (default: logs)
    /// - `LOG_EXPORT_DELAY_MS` - Delay before an export runs (default: 20000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES")
                .unwrap_or(defaults.cache_max_entries)
                .max(1),
            cache_ttl_ms: parse_var("CACHE_TTL_MS")
                .filter(|ttl| *ttl > 0)
                .unwrap_or(defaults.cache_ttl_ms),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            log_file: parse_var("LOG_FILE").unwrap_or(defaults.log_file),
            log_export_dir: parse_var("LOG_EXPORT_DIR").unwrap_or(defaults.log_export_dir),
            log_export_delay_ms: parse_var("LOG_EXPORT_DELAY_MS")
                .unwrap_or(defaults.log_export_delay_ms),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn log_export_delay(&self) -> Duration {
        Duration::from_millis(self.log_export_delay_ms)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            cache_ttl_ms: DEFAULT_TTL.as_millis() as u64,
            server_port: 8080,
            log_file: "logs/application.log".to_string(),
            log_export_dir: "logs".to_string(),
            log_export_delay_ms: 20_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_max_entries, 100);
        assert_eq!(config.cache_ttl_ms, 600_000);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.log_file, "logs/application.log");
        assert_eq!(config.log_export_dir, "logs");
        assert_eq!(config.log_export_delay(), Duration::from_secs(20));
    }

    #[test]
    fn test_config_from_env() {
        // Only test that touches the process environment.
        env::remove_var("CACHE_MAX_ENTRIES");
        env::remove_var("CACHE_TTL_MS");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.cache_max_entries, 100);
        assert_eq!(config.cache_ttl_ms, 600_000);
        assert_eq!(config.server_port, 8080);

        env::set_var("CACHE_MAX_ENTRIES", "0");
        env::set_var("CACHE_TTL_MS", "2500");
        env::set_var("SERVER_PORT", "not-a-port");

        let config = Config::from_env();
        assert_eq!(config.cache_max_entries, 1);
        assert_eq!(config.cache_ttl_ms, 2500);
        assert_eq!(config.server_port, 8080);

        env::remove_var("CACHE_MAX_ENTRIES");
        env::remove_var("CACHE_TTL_MS");
        env::remove_var("SERVER_PORT");
    }
}
