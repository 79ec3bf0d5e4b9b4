//! Server configuration read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `PORT` is not a valid port number.
    #[error("PORT must be a valid u16, got {value:?}: {reason}")]
    InvalidPort {
        /// The raw value.
        value: String,
        /// Why it did not parse.
        reason: String,
    },

    /// `LOG_FORMAT` names an unknown format.
    #[error("LOG_FORMAT must be `json` or `pretty`, got {0:?}")]
    InvalidLogFormat(String),

    /// `HOST` and `PORT` do not form a socket address.
    #[error("invalid HOST:PORT combination {0:?}")]
    InvalidAddress(String),
}

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable multi-line output for local development.
    Pretty,
}

/// Settings for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// `EnvFilter` directive, e.g. `info,salesarena_core=debug`.
    pub log_filter: String,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 3000,
            log_filter: "info".to_owned(),
            log_format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    /// Reads `HOST`, `PORT`, `RUST_LOG` and `LOG_FORMAT`, falling back to
    /// defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a set variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a set variable has an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                ConfigError::InvalidPort {
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => defaults.port,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            Some(other) => return Err(ConfigError::InvalidLogFormat(other.to_owned())),
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            log_filter: lookup("RUST_LOG").unwrap_or(defaults.log_filter),
            log_format,
        })
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidAddress` if host and port do not parse.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidAddress(raw))
    }
}
