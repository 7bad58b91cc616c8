//! Structured logger initialization
//!
//! The logger is a process-wide singleton configured from environment
//! variables on first use. Later calls return the already-installed
//! settings; re-configuration is unsupported.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Minimum log level when `RUST_LOG` is not set.
pub const LOG_LEVEL_ENV: &str = "APIKIT_LOG_LEVEL";
/// Switch between JSON and human-readable output.
pub const LOG_JSON_ENV: &str = "APIKIT_LOG_JSON";
/// Maximum length of a logged string field.
pub const LOG_MAX_LEN_ENV: &str = "APIKIT_LOG_MAX_LEN";

const DEFAULT_LEVEL: &str = "info";
const DEFAULT_MAX_FIELD_LEN: usize = 2048;

/// Output format of the process logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output.
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Effective logger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Logged string fields longer than this are truncated. Truncation is
    /// a logging concern only and never alters payloads.
    pub max_field_len: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_owned(),
            format: LogFormat::Pretty,
            max_field_len: DEFAULT_MAX_FIELD_LEN,
        }
    }
}

impl LoggingConfig {
    /// Read settings from `APIKIT_LOG_LEVEL`, `APIKIT_LOG_JSON` and
    /// `APIKIT_LOG_MAX_LEN`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| DEFAULT_LEVEL.to_owned());
        let format = std::env::var(LOG_JSON_ENV)
            .ok()
            .and_then(|v| parse_bool(&v))
            .map_or(LogFormat::Pretty, |json| {
                if json {
                    LogFormat::Json
                } else {
                    LogFormat::Pretty
                }
            });
        let max_field_len = std::env::var(LOG_MAX_LEN_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_FIELD_LEN);
        Self {
            level,
            format,
            max_field_len,
        }
    }
}

/// Accepted spellings: yes/no, true/false, t/f, y/n, 1/0 (case-insensitive).
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "t" | "y" | "1" => Some(true),
        "no" | "false" | "f" | "n" | "0" => Some(false),
        _ => None,
    }
}

static SETTINGS: OnceLock<LoggingConfig> = OnceLock::new();

/// Install the process logger from `config`.
///
/// The first call wins and installs the subscriber; later calls are no-ops
/// that return the settings of the first call.
pub fn init_logging(config: &LoggingConfig) -> &'static LoggingConfig {
    SETTINGS.get_or_init(|| {
        // RUST_LOG directives take precedence over the configured level.
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
        });

        let registry = tracing_subscriber::registry().with(filter);
        let installed = match config.format {
            LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
            LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
        };
        if let Err(e) = installed {
            // Another subscriber is already set (common under test
            // harnesses); keep it and only record the settings.
            tracing::warn!(error = %e, "logger already installed, keeping existing subscriber");
        }

        config.clone()
    })
}

/// Install the process logger from environment variables.
pub fn init_logging_from_env() -> &'static LoggingConfig {
    init_logging(&LoggingConfig::from_env())
}

/// Settings of the installed logger, if any.
#[must_use]
pub fn logging_settings() -> Option<&'static LoggingConfig> {
    SETTINGS.get()
}

/// Effective cap for logged string fields.
#[must_use]
pub fn max_field_len() -> usize {
    SETTINGS
        .get()
        .map_or(DEFAULT_MAX_FIELD_LEN, |c| c.max_field_len)
}
