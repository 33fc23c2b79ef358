//! Structured logging setup for devscout
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter`. Output is
//! either human-readable or JSON. The subscriber is installed at most once per
//! process; later calls are no-ops, and an already installed global subscriber
//! is left in place.
//!
//! # Example
//!
//! ```no_run
//! use devscout::util::logging;
//! use tracing::info;
//!
//! logging::init_from_env();
//! info!(root = "/srv/app", "Detecting components");
//! ```

use crate::config::DetectorConfig;
use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Crates whose debug output drowns out detection logs
const QUIET_DEPENDENCIES: &[&str] = &["h2=warn", "hyper=warn", "hyper_util=warn", "reqwest=warn", "ignore=warn"];

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for `devscout` events
    pub level: Level,

    /// Emit one JSON object per event
    pub use_json: bool,

    /// Include the module target (e.g. `devscout::detection::component`)
    pub include_target: bool,

    /// Include file and line number
    pub include_location: bool,

    /// Include thread ids and names, useful with the parallel fallback analysis
    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Level taken from a loaded [`DetectorConfig`]
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::with_level(parse_level(&config.log_level))
    }

    /// JSON output with location and thread metadata
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            ..Default::default()
        }
    }
}

/// Parses a level name case-insensitively, falling back to INFO
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn directive(raw: &str) -> Option<Directive> {
    raw.parse()
        .map_err(|e| eprintln!("Ignoring invalid log directive '{}': {}", raw, e))
        .ok()
}

/// Filter honoring `RUST_LOG`, with the crate level and quiet HTTP dependencies on top
fn build_filter(level: Level) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();
    if let Some(own) = directive(&format!("devscout={}", level)) {
        filter = filter.add_directive(own);
    }

    if env::var("RUST_LOG").is_err() {
        for raw in QUIET_DEPENDENCIES {
            if let Some(quiet) = directive(raw) {
                filter = filter.add_directive(quiet);
            }
        }
    }
    filter
}

pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        let result = if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .try_init()
        };

        if let Err(e) = result {
            eprintln!("Logging already initialized: {}", e);
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Reads `DEVSCOUT_LOG_LEVEL` and `DEVSCOUT_LOG_JSON`
pub fn init_from_env() {
    let level_str = env::var("DEVSCOUT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let use_json = env::var("DEVSCOUT_LOG_JSON")
        .ok()
        .and_then(|v| v.to_lowercase().parse::<bool>().ok())
        .unwrap_or(false);

    init_logging(LoggingConfig {
        level: parse_level(&level_str),
        use_json,
        ..Default::default()
    });
}

pub fn with_level(level_str: &str) {
    init_logging(LoggingConfig::with_level(parse_level(level_str)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("Debug"), Level::DEBUG);
        assert_eq!(parse_level(" INFO "), Level::INFO);
        assert_eq!(parse_level("warning"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
    }

    #[test]
    fn test_parse_level_invalid() {
        assert_eq!(parse_level("invalid"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_presets() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);

        let config = LoggingConfig::production();
        assert!(config.use_json);
        assert!(config.include_thread_ids);

        assert_eq!(LoggingConfig::development().level, Level::DEBUG);
    }

    #[test]
    fn test_from_detector_config() {
        let mut detector = DetectorConfig::builtin();
        detector.log_level = "trace".to_string();
        assert_eq!(LoggingConfig::from_config(&detector).level, Level::TRACE);
    }

    #[test]
    fn test_quiet_directives_parse() {
        for raw in QUIET_DEPENDENCIES {
            assert!(directive(raw).is_some(), "{}", raw);
        }
        assert!(directive("devscout=debug").is_some());
    }
}
