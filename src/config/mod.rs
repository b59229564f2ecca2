use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const ENV_PREFIX: &str = "DINNERFOOD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {message}")]
    LoadError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub enable_json_logging: bool,
}

impl Config {
    /// Load every section from `DINNERFOOD_*` environment variables
    pub fn from_environment() -> Result<Self, ConfigError> {
        info!("Loading configuration from environment");
        Self::from_source(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load from an explicit key/value map, as if each key were an
    /// environment variable without the prefix
    pub fn from_map(values: HashMap<String, String>) -> Result<Self, ConfigError> {
        let prefixed = values
            .into_iter()
            .map(|(key, value)| (format!("{}_{}", ENV_PREFIX, key.to_uppercase()), value))
            .collect();

        Self::from_source(config::Environment::with_prefix(ENV_PREFIX).source(Some(prefixed)))
    }

    fn from_source(source: config::Environment) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(source)
            .build()
            .map_err(|e| ConfigError::LoadError {
                message: format!("Failed to load configuration: {}", e),
            })?;

        let config = Config {
            server: section(&settings, "server")?,
            database: section(&settings, "database")?,
            observability: section(&settings, "observability")?,
        };

        config.validate()?;

        info!("Configuration loaded successfully");
        debug!("Configuration: {:?}", config);

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(validation_error("Server port cannot be 0"));
        }

        if self.server.request_timeout_seconds == 0 {
            return Err(validation_error("Request timeout cannot be 0"));
        }

        if self.database.database_url.trim().is_empty() {
            return Err(validation_error("Database URL cannot be empty"));
        }

        if self.database.max_connections == 0 {
            return Err(validation_error("Database max connections cannot be 0"));
        }

        Ok(())
    }
}

// All sections share the flat variable namespace
fn section<T: DeserializeOwned>(settings: &config::Config, name: &str) -> Result<T, ConfigError> {
    settings
        .clone()
        .try_deserialize()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to deserialize {} config: {}", name, e),
        })
}

fn validation_error(message: &str) -> ConfigError {
    ConfigError::ValidationError {
        message: message.to_string(),
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    /// Private in-memory store with migrations applied, for tests and demos
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: default_acquire_timeout(),
            run_migrations: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }
}

pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    8080
}

pub(crate) fn default_timeout() -> u64 {
    30
}

pub(crate) fn default_max_request_size() -> usize {
    1024 * 1024 // 1MB
}

pub(crate) fn default_database_url() -> String {
    "sqlite://dinnerfood.db".to_string()
}

pub(crate) fn default_max_connections() -> u32 {
    5
}

pub(crate) fn default_acquire_timeout() -> u64 {
    5
}

pub(crate) fn default_run_migrations() -> bool {
    true
}

pub(crate) fn default_service_name() -> String {
    "dinnerfood-rs".to_string()
}

pub(crate) fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}
