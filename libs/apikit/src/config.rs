//! Application configuration
//!
//! Configuration is layered the same way on every service built with the
//! kit: struct defaults, then a YAML file (explicit path or the
//! `APIKIT_CONFIG` environment variable), then `APIKIT__*` environment
//! overrides. The extracted [`AppConfig`] is built once at assembly time
//! and immutable afterwards.

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

/// Environment variable holding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "APIKIT_CONFIG";

/// Prefix for environment overrides, e.g. `APIKIT__SERVER__PORT=8080`.
const ENV_PREFIX: &str = "APIKIT__";

/// Configuration error for loading and validation.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file does not exist: {path}")]
    FileNotFound { path: String },
    #[error("path '{path}' for {field} must start with '/'")]
    NotAbsolutePath { field: &'static str, path: String },
    #[error("invalid configuration: {source}")]
    Invalid {
        #[from]
        source: figment::Error,
    },
}

/// Deployment stage, controlling how much error detail leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Dev,
    Staging,
    Prod,
}

impl Stage {
    /// Error detail and stack information are suppressed in production.
    #[must_use]
    pub fn is_production(self) -> bool {
        matches!(self, Self::Prod)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        };
        f.write_str(name)
    }
}

/// Listener address of the HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
        }
    }
}

/// Application-level settings consumed by the factory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Service title, shown in the generated API docs.
    pub title: String,
    /// Service version, shown in the generated API docs.
    pub version: String,
    /// Prefix all caller routers are mounted under, e.g. `/api/v1`.
    /// Empty means the root.
    pub prefix_url: String,
    /// Seconds to wait for in-flight requests when shutting down.
    pub graceful_timeout: u64,
    /// Serve `openapi.json`, Swagger UI and ReDoc routes.
    pub docs_enable: bool,
    /// Prefix for the docs routes; falls back to `prefix_url` when empty.
    pub docs_prefix_url: String,
    /// Path of the health-check endpoint.
    pub health_check_api: String,
    pub stage: Stage,
    /// Install the permissive CORS layer.
    pub cors_enable: bool,
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            version: String::new(),
            prefix_url: String::new(),
            graceful_timeout: 10,
            docs_enable: true,
            docs_prefix_url: String::new(),
            health_check_api: "/healthz".to_owned(),
            stage: Stage::Dev,
            cors_enable: true,
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load layered configuration:
    /// 1) struct defaults -> 2) YAML file (explicit path, else
    /// `APIKIT_CONFIG`) -> 3) `APIKIT__*` environment overrides.
    ///
    /// # Errors
    /// Returns an error if a named config file is missing, a value cannot
    /// be deserialized, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let file = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(Into::into));
        if let Some(file) = file {
            if !file.is_file() {
                return Err(ConfigError::FileNotFound {
                    path: file.display().to_string(),
                });
            }
            figment = figment.merge(Yaml::file(file));
        }

        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("prefix_url", &self.prefix_url),
            ("docs_prefix_url", &self.docs_prefix_url),
        ] {
            if !value.is_empty() && !value.starts_with('/') {
                return Err(ConfigError::NotAbsolutePath {
                    field,
                    path: value.clone(),
                });
            }
        }
        if !self.health_check_api.starts_with('/') {
            return Err(ConfigError::NotAbsolutePath {
                field: "health_check_api",
                path: self.health_check_api.clone(),
            });
        }
        Ok(())
    }

    /// Effective prefix for the docs routes.
    #[must_use]
    pub fn docs_prefix(&self) -> &str {
        if self.docs_prefix_url.is_empty() {
            &self.prefix_url
        } else {
            &self.docs_prefix_url
        }
    }

    #[must_use]
    pub fn graceful_timeout(&self) -> Duration {
        Duration::from_secs(self.graceful_timeout)
    }
}
