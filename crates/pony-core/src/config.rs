//! Application configuration
//!
//! Loaded from a TOML file; every field has a default so an empty (or
//! missing) file yields a working setup. CLI flags are applied on top with
//! the `with_*` builders.

use crate::error::ConfigError;
use crate::service::{InMemoryPonyService, DEFAULT_LATENCY};
use crate::types::{default_seed, Pony};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` if it is not valid configuration
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// With listen address
    #[inline]
    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.server.bind = bind;
        self
    }

    /// With backend latency
    #[inline]
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.backend.latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

/// HTTP surface settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// Directory served under `/images`
    pub assets_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 4200)),
            assets_dir: None,
        }
    }
}

/// In-memory backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Latency of every call, in milliseconds
    pub latency_ms: u64,
    /// Seed records; the built-in seed when empty
    pub ponies: Vec<Pony>,
}

impl BackendConfig {
    /// Latency as a `Duration`
    #[inline]
    #[must_use]
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// Build the backend this configuration describes
    ///
    /// # Errors
    /// - `ConfigError::DuplicateSeedId` if the seed repeats an id
    pub fn build_service(&self) -> Result<InMemoryPonyService, ConfigError> {
        let seed = if self.ponies.is_empty() {
            default_seed()
        } else {
            self.ponies.clone()
        };
        Ok(InMemoryPonyService::with_ponies(seed)?.with_latency(self.latency()))
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            latency_ms: u64::try_from(DEFAULT_LATENCY.as_millis()).unwrap_or(100),
            ponies: Vec::new(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, overridden by `RUST_LOG`
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}
