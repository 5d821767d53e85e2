//! Configuration module for the exporter.
//!
//! Loads settings from environment variables (and an optional `.env` file)
//! with sensible defaults.

use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const API_KEY_VAR: &str = "UPTIMEROBOT_READ_API_KEY";
pub const INTERVAL_VAR: &str = "INTERVAL_SECONDS";
pub const PORT_VAR: &str = "PORT";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

const DEFAULT_INTERVAL_SECONDS: u64 = 300;
const DEFAULT_PORT: u16 = 8000;

/// Configuration error types.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("UPTIMEROBOT_READ_API_KEY environment variable is not set")]
    MissingApiKey,
}

/// Log verbosity accepted in `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Level name as understood by an `EnvFilter` directive. `CRITICAL` has
    /// no tracing counterpart and maps to `error`.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            other => Err(format!(
                "{} is not a valid {}, please pick between: DEBUG, INFO, WARNING, ERROR, CRITICAL",
                other, LOG_LEVEL_VAR
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exporter settings resolved from the environment.
#[derive(Clone)]
pub struct Settings {
    /// UptimeRobot read-only API key (required)
    pub api_key: String,
    /// Seconds between two collections (default: 300)
    pub interval_seconds: u64,
    /// HTTP port for the metrics endpoint (default: 8000)
    pub port: u16,
    /// Log verbosity (default: INFO)
    pub log_level: LogLevel,
    /// Problems found while resolving the values above. They are logged
    /// once the tracing subscriber exists.
    pub warnings: Vec<String>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("interval_seconds", &self.interval_seconds)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Settings {
    /// Load settings from a `.env` file (if any) and the process environment.
    ///
    /// Environment variables:
    /// - `UPTIMEROBOT_READ_API_KEY`: API key (required)
    /// - `INTERVAL_SECONDS`: polling interval (default: 300)
    /// - `PORT`: metrics HTTP port (default: 8000)
    /// - `LOG_LEVEL`: DEBUG, INFO, WARNING, ERROR or CRITICAL (default: INFO)
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is the normal case in containers.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();

        let api_key = match lookup(API_KEY_VAR) {
            Some(key) if !key.is_empty() => key,
            _ => return Err(ConfigError::MissingApiKey),
        };

        let log_level = match lookup(LOG_LEVEL_VAR) {
            Some(raw) => raw.parse::<LogLevel>().unwrap_or_else(|e| {
                warnings.push(e);
                warnings.push(format!("Fallback to default {}={}", LOG_LEVEL_VAR, LogLevel::Info));
                LogLevel::Info
            }),
            None => LogLevel::Info,
        };

        let interval_seconds = parse_positive(
            &lookup,
            INTERVAL_VAR,
            DEFAULT_INTERVAL_SECONDS,
            &mut warnings,
        );
        let port = parse_positive(&lookup, PORT_VAR, DEFAULT_PORT, &mut warnings);

        Ok(Self {
            api_key,
            interval_seconds,
            port,
            log_level,
            warnings,
        })
    }
}

/// Parse a positive integer variable, falling back to `default` on any
/// problem.
fn parse_positive<F, T>(lookup: &F, name: &str, default: T, warnings: &mut Vec<String>) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default + fmt::Display + Copy,
{
    let Some(raw) = lookup(name) else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => value,
        _ => {
            warnings.push(format!("{} must be a positive integer, got {:?}", name, raw));
            warnings.push(format!("Fallback to the default {}={}", name, default));
            default
        }
    }
}
