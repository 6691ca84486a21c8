//! Explicit construction of a [`Gateway`].

use std::sync::Arc;

use log::info;

use super::{Gateway, MismatchPolicy, locks::BundleLocks};
use crate::{
    config::{BackendConfig, ConfigError, GatewayConfig, StorageConfig},
    dispatch::{BitcoindBackend, Dispatcher, PushBackend, SamouraiBackend},
    store::{BundleStore, MemoryStore, MemoryStoreConfig},
    transaction::{BitcoinFormat, TransactionFormat},
};

/// Builder for [`Gateway`].
///
/// Defaults to a [`MemoryStore`] with default bounds, the Bitcoin transaction
/// format, and the [`MismatchPolicy::Retain`] policy.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use txrelay::{gateway::Gateway, store::{MemoryStore, MemoryStoreConfig}};
///
/// let gateway = Gateway::builder()
///     .store(Arc::new(MemoryStore::new(MemoryStoreConfig::default())))
///     .build();
/// assert!(gateway.dispatcher().is_empty());
/// ```
#[must_use]
pub struct GatewayBuilder {
    store: Option<Arc<dyn BundleStore>>,
    dispatcher: Dispatcher,
    format: Arc<dyn TransactionFormat>,
    mismatch_policy: MismatchPolicy,
}

impl Default for GatewayBuilder {
    fn default() -> Self { Self::new() }
}

impl GatewayBuilder {
    /// Builder with default collaborators.
    pub fn new() -> Self {
        Self {
            store: None,
            dispatcher: Dispatcher::new(),
            format: Arc::new(BitcoinFormat),
            mismatch_policy: MismatchPolicy::default(),
        }
    }

    /// Builder populated from a loaded configuration.
    ///
    /// Selects the storage backend, applies the gateway settings and creates
    /// one push backend per `[[backends]]` entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Backend`] if a push backend's HTTP client cannot
    /// be created.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let store: Arc<dyn BundleStore> = match config.storage {
            StorageConfig::MemoryCache(settings) => {
                info!(
                    "using memory cache storage: cache_size={}, ttl_secs={}",
                    settings.cache_size,
                    settings.ttl.as_secs()
                );
                Arc::new(MemoryStore::new(settings))
            }
        };

        let mut builder = Self::new()
            .store(store)
            .dispatcher(Dispatcher::new().with_max_attempts(config.gateway.push_attempts))
            .mismatch_policy(config.gateway.mismatch_policy);
        for backend in &config.backends {
            let push = push_backend(backend).map_err(|source| ConfigError::Backend {
                name: backend.name().to_owned(),
                source,
            })?;
            builder
                .dispatcher
                .register(push, backend.network().map(str::to_owned));
        }
        Ok(builder)
    }

    /// Use `store` for bundles and processed records.
    pub fn store(mut self, store: Arc<dyn BundleStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the dispatcher, including any backends registered so far.
    pub fn dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Register a push backend serving every network.
    pub fn backend(mut self, backend: Arc<dyn PushBackend>) -> Self {
        self.dispatcher.register(backend, None);
        self
    }

    /// Register a push backend restricted to `network`.
    pub fn network_backend(mut self, backend: Arc<dyn PushBackend>, network: &str) -> Self {
        self.dispatcher.register(backend, Some(network.to_owned()));
        self
    }

    /// Use `format` to identify reassembled transactions.
    pub fn transaction_format(mut self, format: Arc<dyn TransactionFormat>) -> Self {
        self.format = format;
        self
    }

    /// Choose what happens to bundles failing verification.
    pub fn mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.mismatch_policy = policy;
        self
    }

    /// Finish construction.
    #[must_use]
    pub fn build(self) -> Gateway {
        Gateway {
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemoryStore::new(MemoryStoreConfig::default()))),
            dispatcher: self.dispatcher,
            format: self.format,
            locks: BundleLocks::default(),
            mismatch_policy: self.mismatch_policy,
        }
    }
}

fn push_backend(config: &BackendConfig) -> Result<Arc<dyn PushBackend>, reqwest::Error> {
    Ok(match config {
        BackendConfig::Bitcoind { name, rpc, .. } => {
            Arc::new(BitcoindBackend::new(name.clone(), rpc.clone())?)
        }
        BackendConfig::SamouraiBackend { name, api, .. } => {
            Arc::new(SamouraiBackend::new(name.clone(), api.clone())?)
        }
    })
}
