//! Server configuration management
//!
//! Handles loading configuration from TOML files, environment variables, and CLI arguments.

use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use adapter_exrate::DEFAULT_UPSTREAM_URL;

/// Plain-text body returned for every failure in compat mode
pub const DEFAULT_FALLBACK_TEXT: &str = "Hello Hono!";

const ENV_HOST: &str = "EXRATE_SERVER_HOST";
const ENV_PORT: &str = "EXRATE_SERVER_PORT";
const ENV_LOG_LEVEL: &str = "EXRATE_LOG_LEVEL";
const ENV_ENVIRONMENT: &str = "EXRATE_ENV";
const ENV_UPSTREAM_URL: &str = "EXRATE_UPSTREAM_URL";
const ENV_ERROR_MODE: &str = "EXRATE_ERROR_MODE";
const ENV_FALLBACK_TEXT: &str = "EXRATE_FALLBACK_TEXT";
const ENV_METRICS_PORT: &str = "EXRATE_METRICS_PORT";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid port number: {0}. Must be between 1 and 65535")]
    InvalidPort(String),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid environment: {0}. Must be one of: development, staging, production")]
    InvalidEnvironment(String),

    #[error("Invalid error mode: {0}. Must be one of: compat, strict")]
    InvalidErrorMode(String),

    #[error("Invalid upstream URL: {0:?}. Must start with http:// or https://")]
    InvalidUpstreamUrl(String),

    #[error("Metrics port {0} conflicts with the HTTP port")]
    MetricsPortConflict(u16),

    #[error("Configuration file error: {0}")]
    FileError(String),
}

/// Log levels supported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Deployment environment; production switches logs to JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }
}

impl Environment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How handler failures are reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Every failure is HTTP 200 with the fallback text
    #[default]
    Compat,
    /// Failures map to 4xx/5xx with a JSON error body
    Strict,
}

impl FromStr for ErrorMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compat" | "compatible" => Ok(ErrorMode::Compat),
            "strict" => Ok(ErrorMode::Strict),
            _ => Err(ConfigError::InvalidErrorMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for ErrorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorMode::Compat => write!(f, "compat"),
            ErrorMode::Strict => write!(f, "strict"),
        }
    }
}

/// Server configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Log level
    #[serde(deserialize_with = "deserialize_from_str")]
    pub log_level: LogLevel,
    /// Environment (development, staging, production)
    #[serde(deserialize_with = "deserialize_from_str")]
    pub environment: Environment,
    /// Exchange-rate XML feed URL
    pub upstream_url: String,
    /// Failure reporting mode
    #[serde(deserialize_with = "deserialize_from_str")]
    pub error_mode: ErrorMode,
    /// Body returned for failures in compat mode
    pub fallback_text: String,
    /// Prometheus exporter port; exporter disabled when unset
    pub metrics_port: Option<u16>,
}

fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: FromStr<Err = ConfigError>,
{
    let s = String::deserialize(deserializer)?;
    T::from_str(&s).map_err(serde::de::Error::custom)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: LogLevel::Info,
            environment: Environment::Development,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            error_mode: ErrorMode::Compat,
            fallback_text: DEFAULT_FALLBACK_TEXT.to_string(),
            metrics_port: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;

        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Override fields whose environment variable is set
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var(ENV_HOST) {
            self.host = host;
        }

        if let Ok(port) = std::env::var(ENV_PORT) {
            self.port = parse_port(&port)?;
        }

        if let Ok(log_level) = std::env::var(ENV_LOG_LEVEL) {
            self.log_level = LogLevel::from_str(&log_level)?;
        }

        if let Ok(env) = std::env::var(ENV_ENVIRONMENT) {
            self.environment = Environment::from_str(&env)?;
        }

        if let Ok(url) = std::env::var(ENV_UPSTREAM_URL) {
            self.upstream_url = url;
        }

        if let Ok(mode) = std::env::var(ENV_ERROR_MODE) {
            self.error_mode = ErrorMode::from_str(&mode)?;
        }

        if let Ok(text) = std::env::var(ENV_FALLBACK_TEXT) {
            self.fallback_text = text;
        }

        // Empty value disables the exporter
        if let Ok(port) = std::env::var(ENV_METRICS_PORT) {
            self.metrics_port = match port.trim() {
                "" => None,
                port => Some(parse_port(port)?),
            };
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port.to_string()));
        }

        let url = self.upstream_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidUpstreamUrl(self.upstream_url.clone()));
        }

        match self.metrics_port {
            Some(0) => return Err(ConfigError::InvalidPort("0".to_string())),
            Some(port) if port == self.port => {
                return Err(ConfigError::MetricsPortConflict(port))
            }
            _ => {}
        }

        Ok(())
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = LogLevel::from_str(log_level)?;
        }
        if let Some(url) = &cli.upstream_url {
            self.upstream_url = url.clone();
        }
        if let Some(mode) = &cli.error_mode {
            self.error_mode = ErrorMode::from_str(mode)?;
        }
        if let Some(port) = cli.metrics_port {
            self.metrics_port = Some(port);
        }
        Ok(())
    }
}

fn parse_port(s: &str) -> Result<u16, ConfigError> {
    s.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidPort(s.to_string()))
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Host address override
    pub host: Option<String>,
    /// Port override
    pub port: Option<u16>,
    /// Log level override
    pub log_level: Option<String>,
    /// Upstream feed URL override
    pub upstream_url: Option<String>,
    /// Error mode override
    pub error_mode: Option<String>,
    /// Metrics exporter port override
    pub metrics_port: Option<u16>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<ServerConfig, ConfigError> {
    let mut config = if let Some(config_path) = &cli.config_file {
        ServerConfig::from_file(config_path)?
    } else {
        ServerConfig::default()
    };

    config.apply_env()?;
    config.merge_with_cli(cli)?;

    config.validate()?;

    Ok(config)
}
