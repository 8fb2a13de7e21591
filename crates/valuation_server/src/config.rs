//! Server configuration
//!
//! Sources, from highest to lowest precedence: command-line flags,
//! `VALUATION_*` environment variables, a TOML file, built-in defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Prefix shared by every environment variable the server reads.
pub const ENV_PREFIX: &str = "VALUATION_";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Port {0} is not usable; expected 1-65535")]
    InvalidPort(u16),

    #[error("Unknown log level '{0}'; expected trace, debug, info, warn or error")]
    InvalidLogLevel(String),

    #[error("Unknown environment '{0}'; expected development, staging or production")]
    InvalidEnvironment(String),

    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{var}: expected {expected}, got '{value}'")]
    InvalidVar {
        var: String,
        value: String,
        expected: &'static str,
    },
}

/// Log verbosity, also the default `EnvFilter` directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const NAMES: [(LogLevel, &'static str); 5] = [
        (LogLevel::Trace, "trace"),
        (LogLevel::Debug, "debug"),
        (LogLevel::Info, "info"),
        (LogLevel::Warn, "warn"),
        (LogLevel::Error, "error"),
    ];

    pub fn as_filter_str(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(level, _)| level == self)
            .map_or("info", |(_, name)| *name)
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s.trim()))
            .map(|(level, _)| *level)
            .ok_or_else(|| ConfigError::InvalidLogLevel(s.to_string()))
    }
}

impl TryFrom<String> for LogLevel {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, <LogLevel as TryFrom<String>>::Error> {
        s.parse()
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Production logs are emitted as JSON lines.
    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }

    pub fn name(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let env = match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            _ => return Err(ConfigError::InvalidEnvironment(s.to_string())),
        };
        Ok(env)
    }
}

impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime settings of the valuation server
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: LogLevel,
    pub environment: Environment,
    /// Grace period for in-flight requests on shutdown
    pub shutdown_timeout_secs: u64,
    /// Allow cross-origin requests from any dashboard origin
    pub cors_permissive: bool,
    /// TOML file with per-ticker fundamentals for the DCF endpoint
    pub fundamentals_file: Option<PathBuf>,
    /// TOML file with the elasticity product catalog
    pub catalog_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: LogLevel::default(),
            environment: Environment::default(),
            shutdown_timeout_secs: 30,
            cors_permissive: true,
            fundamentals_file: None,
            catalog_file: None,
        }
    }
}

/// Read `VALUATION_<name>` through `lookup` and parse it.
fn env_var<T, F>(lookup: &F, name: &str, expected: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar {
                var: format!("{}{}", ENV_PREFIX, name),
                value,
                expected,
            }),
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ServerConfig {
    /// Load and validate a TOML file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ServerConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Override fields from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|name| std::env::var(format!("{}{}", ENV_PREFIX, name)).ok())
    }

    /// Override fields from `lookup`, which maps an unprefixed variable name
    /// (`SERVER_PORT`) to its value. Unset variables leave the field alone.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = env_var(&lookup, "SERVER_PORT", "a port number")? {
            self.port = port;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level.parse()?;
        }
        if let Some(env) = lookup("ENV") {
            self.environment = env.parse()?;
        }
        if let Some(secs) = env_var(&lookup, "SHUTDOWN_TIMEOUT_SECS", "a number of seconds")? {
            self.shutdown_timeout_secs = secs;
        }
        if let Some(raw) = lookup("CORS_PERMISSIVE") {
            self.cors_permissive = parse_flag(raw.trim()).ok_or_else(|| ConfigError::InvalidVar {
                var: format!("{}CORS_PERMISSIVE", ENV_PREFIX),
                value: raw.clone(),
                expected: "true or false",
            })?;
        }
        if let Some(path) = lookup("FUNDAMENTALS_FILE") {
            self.fundamentals_file = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("CATALOG_FILE") {
            self.catalog_file = Some(PathBuf::from(path));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.port {
            0 => Err(ConfigError::InvalidPort(0)),
            _ => Ok(()),
        }
    }

    /// `host:port` as configured
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Apply command-line overrides
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(host) = &cli.host {
            self.host.clone_from(host);
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(level) = cli.log_level.as_deref() {
            self.log_level = level.parse()?;
        }
        if cli.fundamentals_file.is_some() {
            self.fundamentals_file.clone_from(&cli.fundamentals_file);
        }
        if cli.catalog_file.is_some() {
            self.catalog_file.clone_from(&cli.catalog_file);
        }
        Ok(())
    }
}

/// Command-line overrides, decoupled from the clap parser in `main`
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_file: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub fundamentals_file: Option<PathBuf>,
    pub catalog_file: Option<PathBuf>,
}

/// Resolve the effective configuration: defaults, then the config file,
/// then the environment, then the command line.
pub fn build_config(cli: &CliArgs) -> Result<ServerConfig, ConfigError> {
    let mut config = cli
        .config_file
        .as_deref()
        .map_or_else(|| Ok(ServerConfig::default()), ServerConfig::from_file)?;

    config.apply_env()?;
    config.merge_with_cli(cli)?;
    config.validate()?;

    Ok(config)
}
