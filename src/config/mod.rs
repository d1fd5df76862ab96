//! Configuration module for the school admin backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use crate::models::UniqueScope;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid SCHOOL_BIND_ADDR {value:?}: {source}")]
    InvalidBindAddr {
        value: String,
        source: AddrParseError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Resource kinds whose unique fields are enforced across all admins
    pub global_unique_kinds: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = lookup("SCHOOL_DB_PATH")
            .unwrap_or_else(|| "./data/school.sqlite".to_string())
            .into();

        let bind_value =
            lookup("SCHOOL_BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string());
        let bind_addr = bind_value
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind_value.clone(),
                source,
            })?;

        let log_level = lookup("SCHOOL_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let log_json = lookup("SCHOOL_LOG_FORMAT")
            .is_some_and(|format| format.trim().eq_ignore_ascii_case("json"));

        let global_unique_kinds = lookup("SCHOOL_GLOBAL_UNIQUE_KINDS")
            .map(|kinds| {
                kinds
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_json,
            global_unique_kinds,
        })
    }

    /// Uniqueness scope applied to the given resource kind.
    pub fn unique_scope(&self, kind: &str) -> UniqueScope {
        if self.global_unique_kinds.iter().any(|k| k == kind) {
            UniqueScope::Global
        } else {
            UniqueScope::PerScope
        }
    }
}
