//! Server runtime configuration.
//!
//! Values arrive through CLI flags with environment fallbacks (`DATABASE_URL`,
//! `TRACKBOARD_ADDR`); this module validates them into a typed config.

use std::net::SocketAddr;

use thiserror::Error;

/// Default database when nothing is configured: a file next to the process.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://trackboard.db?mode=rwc";

/// Validated server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub database_url: String,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid listen address: {0}")]
    InvalidAddr(String),

    #[error("Unsupported database URL: {0}. Expected a sqlite:// URL")]
    UnsupportedDatabase(String),
}

impl ServerConfig {
    /// Validate raw CLI/env inputs into a usable config.
    pub fn resolve(addr: &str, database_url: Option<String>) -> Result<Self, ConfigError> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(addr.to_string()))?;

        let database_url = database_url.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        if !database_url.starts_with("sqlite:") {
            return Err(ConfigError::UnsupportedDatabase(database_url));
        }

        Ok(Self { addr, database_url })
    }
}
