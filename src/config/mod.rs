use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Prefix of every environment variable the service reads
pub const ENV_PREFIX: &str = "POSMENU";

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
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_meals_table")]
    pub meals_table_name: String,
    #[serde(default = "default_drinks_table")]
    pub drinks_table_name: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Override for DynamoDB Local or another compatible endpoint
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub create_tables: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub enable_json_logging: bool,
}

impl Config {
    /// Load every section from `POSMENU_*` environment variables
    pub fn from_environment() -> Result<Self, ConfigError> {
        info!("Loading configuration from environment");

        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| ConfigError::LoadError {
                message: format!("Failed to read environment: {}", e),
            })?;

        let config = Self::from_settings(&settings)?;
        config.validate()?;

        info!("Configuration loaded successfully");
        debug!("Configuration: {:?}", config);
        Ok(config)
    }

    pub(crate) fn from_settings(settings: &config::Config) -> Result<Self, ConfigError> {
        Ok(Config {
            server: section(settings, "server")?,
            database: section(settings, "database")?,
            observability: section(settings, "observability")?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("Server port cannot be 0"));
        }

        if self.server.request_timeout_seconds == 0 {
            return Err(invalid("Request timeout cannot be 0"));
        }

        if self.database.meals_table_name.trim().is_empty() {
            return Err(invalid("Meals table name cannot be empty"));
        }

        if self.database.drinks_table_name.trim().is_empty() {
            return Err(invalid("Drinks table name cannot be empty"));
        }

        if self.database.meals_table_name == self.database.drinks_table_name {
            return Err(invalid("Meals and drinks must use different tables"));
        }

        if self.database.region.trim().is_empty() {
            return Err(invalid("Region cannot be empty"));
        }

        if self.observability.metrics_port == 0 {
            return Err(invalid("Metrics port cannot be 0"));
        }

        if self.observability.metrics_port == self.server.port {
            return Err(invalid("Metrics port must differ from server port"));
        }

        if self.observability.log_level.parse::<tracing::Level>().is_err() {
            return Err(invalid("Log level must be one of trace, debug, info, warn, error"));
        }

        if let Some(endpoint) = &self.observability.otlp_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(invalid("OTLP endpoint must be an http(s) URL"));
            }
        }

        Ok(())
    }
}

fn section<T: DeserializeOwned>(settings: &config::Config, name: &str) -> Result<T, ConfigError> {
    settings
        .clone()
        .try_deserialize()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to deserialize {} config: {}", name, e),
        })
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError {
        message: message.to_string(),
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl DatabaseConfig {
    /// Build a DynamoDB client for the configured region and endpoint
    pub async fn dynamodb_client(&self) -> DynamoDbClient {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(self.region.clone()));

        if let Some(endpoint) = &self.endpoint_url {
            info!("Using DynamoDB endpoint override: {}", endpoint);
            loader = loader.endpoint_url(endpoint);
        }

        DynamoDbClient::new(&loader.load().await)
    }
}

// Default value functions
pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    8080
}

pub(crate) fn default_timeout() -> u64 {
    30
}

pub(crate) fn default_meals_table() -> String {
    "menuItems".to_string()
}

pub(crate) fn default_drinks_table() -> String {
    "drinks".to_string()
}

pub(crate) fn default_region() -> String {
    "us-east-1".to_string()
}

pub(crate) fn default_service_name() -> String {
    "menucatalog-rs".to_string()
}

pub(crate) fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub(crate) fn default_metrics_port() -> u16 {
    9090
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests;
