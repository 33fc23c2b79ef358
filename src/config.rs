//! Configuration management for devscout
//!
//! Settings are loaded from environment variables with sensible defaults.
//!
//! # Environment Variables
//!
//! - `DEVSCOUT_REGISTRY_URL`: Devfile registry base URL - default: "https://registry.devfile.io"
//! - `DEVSCOUT_REQUEST_TIMEOUT`: Registry timeout in seconds - default: "30"
//! - `DEVSCOUT_PARALLEL_FALLBACK`: Analyze directories without manifests in parallel (true|false) - default: "true"
//! - `DEVSCOUT_RESPECT_GITIGNORE`: Skip files ignored by `.gitignore` (true|false) - default: "true"
//! - `DEVSCOUT_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use devscout::DetectorConfig;
//! use std::env;
//!
//! env::set_var("DEVSCOUT_REQUEST_TIMEOUT", "10");
//!
//! let config = DetectorConfig::default();
//! config.validate().expect("Invalid configuration");
//! assert_eq!(config.request_timeout().as_secs(), 10);
//! ```

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_REGISTRY_URL: &str = "https://registry.devfile.io";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PARALLEL_FALLBACK: bool = true;
const DEFAULT_RESPECT_GITIGNORE: bool = true;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

/// Settings shared by detection and registry access
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Devfile registry base URL
    pub registry_url: String,

    /// Registry request timeout in seconds
    pub request_timeout_secs: u64,

    /// Analyze fallback directories on the rayon pool
    pub parallel_fallback: bool,

    /// Honor `.gitignore` files while indexing
    pub respect_gitignore: bool,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().to_lowercase().parse::<bool>().ok())
        .unwrap_or(default)
}

impl Default for DetectorConfig {
    /// Loads `DEVSCOUT_*` environment variables, falling back to defaults
    fn default() -> Self {
        let registry_url = env::var("DEVSCOUT_REGISTRY_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string());

        let request_timeout_secs = env::var("DEVSCOUT_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let log_level = env::var("DEVSCOUT_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            registry_url,
            request_timeout_secs,
            parallel_fallback: env_bool("DEVSCOUT_PARALLEL_FALLBACK", DEFAULT_PARALLEL_FALLBACK),
            respect_gitignore: env_bool("DEVSCOUT_RESPECT_GITIGNORE", DEFAULT_RESPECT_GITIGNORE),
            log_level,
        }
    }
}

impl DetectorConfig {
    /// Defaults without consulting the environment
    pub fn builtin() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            parallel_fallback: DEFAULT_PARALLEL_FALLBACK,
            respect_gitignore: DEFAULT_RESPECT_GITIGNORE,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    /// Checks numeric ranges, the registry URL scheme and the log level
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if !(self.registry_url.starts_with("http://") || self.registry_url.starts_with("https://")) {
            return Err(ConfigError::ParseError {
                field: "DEVSCOUT_REGISTRY_URL".to_string(),
                error: format!("expected an http(s) URL, got {}", self.registry_url),
            });
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Converts configuration to a display map for output formatting
    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("registry_url".to_string(), self.registry_url.clone());
        map.insert(
            "request_timeout_secs".to_string(),
            self.request_timeout_secs.to_string(),
        );
        map.insert(
            "parallel_fallback".to_string(),
            self.parallel_fallback.to_string(),
        );
        map.insert(
            "respect_gitignore".to_string(),
            self.respect_gitignore.to_string(),
        );
        map.insert("log_level".to_string(), self.log_level.clone());

        map
    }
}

impl fmt::Display for DetectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Devscout Configuration:")?;
        writeln!(f, "  Registry URL: {}", self.registry_url)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Parallel Fallback: {}", self.parallel_fallback)?;
        writeln!(f, "  Respect .gitignore: {}", self.respect_gitignore)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
