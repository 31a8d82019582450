//! Error types for Pony Core
//!
//! Provides error handling for:
//! - Record service failures (search and delete)
//! - Navigation failures (unparseable URLs, unknown routes)
//! - Configuration loading and seeding failures

use crate::types::PonyId;
use std::path::PathBuf;

/// Main error type
#[derive(Debug, thiserror::Error)]
pub enum PonyError {
    /// Record service failed
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// Navigation failed
    #[error("navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Record service errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Backend could not be reached or refused the call
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Record not found (only raised by strict backends, the in-memory one is idempotent)
    #[error("pony not found: {0}")]
    NotFound(PonyId),

    /// Backend did not answer in time
    #[error("backend timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
}

impl ServiceError {
    /// Check if the call may succeed when retried
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout { .. })
    }
}

/// Navigation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// URL could not be parsed
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Path does not match any route
    #[error("no route matches path {0:?}")]
    UnknownRoute(String),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for `AppConfig`
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Seed records are inconsistent
    #[error("invalid seed: duplicate pony id {0}")]
    DuplicateSeedId(PonyId),

    /// Log filter directive rejected
    #[error("invalid log filter {filter:?}: {reason}")]
    InvalidLogFilter { filter: String, reason: String },
}
