//! Gateway configuration loaded from TOML.
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8091"
//!
//! [storage]
//! type = "memory-cache"
//! cache_size = 10000
//! ttl_secs = 3600
//!
//! [gateway]
//! mismatch_policy = "retain"
//! push_attempts = 3
//!
//! [[backends]]
//! type = "bitcoind"
//! name = "local-node"
//! network = "t"
//! rpc = { host = "127.0.0.1", port = 18332, user = "relay", pass = "secret" }
//!
//! [[backends]]
//! type = "samourai-backend"
//! name = "dojo"
//! url = "http://dojo.local/v2"
//! api_key = "key"
//! ```
//!
//! Every section except `[[backends]]` may be omitted.

use std::{
    fs,
    net::{Ipv4Addr, SocketAddr},
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    dispatch::{BitcoindConfig, DEFAULT_PUSH_ATTEMPTS, SamouraiConfig},
    gateway::MismatchPolicy,
    store::MemoryStoreConfig,
};

/// Port the ingestion surface listens on by default.
pub const DEFAULT_PORT: u16 = 8091;

/// Errors raised while loading configuration or building from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Configuration file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The contents are not valid configuration.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// No push backend is configured.
    #[error("at least one push backend must be configured")]
    NoBackends,
    /// A push backend could not be initialised.
    #[error("failed to initialise backend {name}: {source}")]
    Backend {
        /// Configured backend name.
        name: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
}

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Ingestion surface settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage backend selection.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Reassembly and dispatch settings.
    #[serde(default)]
    pub gateway: GatewaySettings,
    /// Push backends, in registration order.
    #[serde(default)]
    pub backends: Vec<BackendConfig>,
}

/// Ingestion surface settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind: SocketAddr,
    /// Address of the Prometheus exporter, disabled when unset.
    pub metrics_bind: Option<SocketAddr>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            metrics_bind: None,
        }
    }
}

/// Storage backend selection, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StorageConfig {
    /// Bounded in-process LRU caches with a time-to-live.
    MemoryCache(MemoryStoreConfig),
}

impl Default for StorageConfig {
    fn default() -> Self { Self::MemoryCache(MemoryStoreConfig::default()) }
}

/// Reassembly and dispatch settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewaySettings {
    /// Fate of bundles whose transaction fails verification.
    pub mismatch_policy: MismatchPolicy,
    /// Randomised push attempts when several backends serve a network.
    pub push_attempts: NonZeroUsize,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            mismatch_policy: MismatchPolicy::default(),
            push_attempts: DEFAULT_PUSH_ATTEMPTS,
        }
    }
}

/// One push backend, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BackendConfig {
    /// A node reached over JSON-RPC.
    Bitcoind {
        /// Name used in logs.
        name: String,
        /// Network served; every network when unset.
        #[serde(default)]
        network: Option<String>,
        /// RPC endpoint.
        rpc: BitcoindConfig,
    },
    /// A Samourai-compatible HTTP backend.
    SamouraiBackend {
        /// Name used in logs.
        name: String,
        /// Network served; every network when unset.
        #[serde(default)]
        network: Option<String>,
        /// Endpoint and credentials.
        #[serde(flatten)]
        api: SamouraiConfig,
    },
}

impl BackendConfig {
    /// Configured backend name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Bitcoind { name, .. } | Self::SamouraiBackend { name, .. } => name,
        }
    }

    /// Network the backend is restricted to, if any.
    #[must_use]
    pub fn network(&self) -> Option<&str> {
        match self {
            Self::Bitcoind { network, .. } | Self::SamouraiBackend { network, .. } => {
                network.as_deref()
            }
        }
    }
}

impl GatewayConfig {
    /// Read and validate the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, does not parse, or
    /// fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        contents.parse()
    }

    /// Reject configurations the gateway cannot start with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoBackends`] when no push backend is configured.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }
        Ok(())
    }
}

impl std::str::FromStr for GatewayConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
