//! Forwarding of verified transactions to interchangeable push services.
//!
//! A [`Dispatcher`] holds the registered [`PushBackend`]s. For each push it
//! narrows them to the backends serving the bundle's network, then:
//!
//! - with no candidate it fails with [`PushError::NoBackendAvailable`];
//! - with one candidate it calls it once and reports its answer;
//! - otherwise it picks a candidate uniformly at random for each attempt (the
//!   same backend may be picked again) and stops at the first success, giving
//!   up with [`PushError::Exhausted`] after the configured attempts.
//!
//! Attempts run sequentially: a push that succeeds early never fans out.

pub mod bitcoind;
mod error;
pub mod samourai;

use std::{num::NonZeroUsize, sync::Arc};

use async_trait::async_trait;
use log::{info, warn};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};

pub use bitcoind::{BitcoindBackend, BitcoindConfig};
pub use error::PushError;
pub use samourai::{SamouraiBackend, SamouraiConfig};

use crate::metrics;

/// Default number of randomised attempts when several backends are available.
pub const DEFAULT_PUSH_ATTEMPTS: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(attempts) => attempts,
    None => NonZeroUsize::MIN,
};

/// A downstream service able to broadcast a raw transaction.
///
/// Implementations handle their own authentication and timeouts. Failures of
/// any kind resolve to `false`; nothing propagates past this boundary.
#[async_trait]
pub trait PushBackend: Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Submit `raw_tx` (lowercase hexadecimal). Returns `true` once accepted.
    async fn push(&self, raw_tx: &str) -> bool;
}

struct Registration {
    backend: Arc<dyn PushBackend>,
    network: Option<String>,
}

impl Registration {
    fn serves(&self, hint: Option<&str>) -> bool {
        match (self.network.as_deref(), hint) {
            (Some(served), Some(wanted)) => served == wanted,
            _ => true,
        }
    }
}

/// Successful push outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushReceipt {
    /// Name of the backend that accepted the transaction.
    pub backend: String,
    /// Attempts made, including the successful one.
    pub attempts: usize,
}

/// Randomised failover over the registered push backends.
pub struct Dispatcher {
    backends: Vec<Registration>,
    max_attempts: NonZeroUsize,
    rng: Mutex<StdRng>,
}

impl Default for Dispatcher {
    fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.backends.iter().map(|r| r.backend.name()).collect();
        f.debug_struct("Dispatcher")
            .field("backends", &names)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Create a dispatcher with no backends, seeded from system entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
            max_attempts: DEFAULT_PUSH_ATTEMPTS,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Override the number of randomised attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: NonZeroUsize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Use a deterministic selection sequence.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Register a backend, optionally restricted to one network.
    pub fn register(&mut self, backend: Arc<dyn PushBackend>, network: Option<String>) {
        info!(
            "registered push backend: name={}, network={network:?}",
            backend.name()
        );
        self.backends.push(Registration { backend, network });
    }

    /// Number of registered backends.
    #[must_use]
    pub fn len(&self) -> usize { self.backends.len() }

    /// Whether no backend is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.backends.is_empty() }

    /// Push `raw_tx` to a backend serving `network`.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::NoBackendAvailable`] when no backend serves the
    /// network, [`PushError::Rejected`] when the only candidate refuses the
    /// transaction, and [`PushError::Exhausted`] when every randomised attempt
    /// fails.
    pub async fn push(&self, raw_tx: &str, network: Option<&str>) -> Result<PushReceipt, PushError> {
        let candidates: Vec<&Arc<dyn PushBackend>> = self
            .backends
            .iter()
            .filter(|registration| registration.serves(network))
            .map(|registration| &registration.backend)
            .collect();

        let result = match candidates.as_slice() {
            [] => Err(PushError::NoBackendAvailable {
                network: network.map(str::to_owned),
            }),
            [only] => Self::push_once(only.as_ref(), raw_tx).await,
            _ => self.push_with_failover(&candidates, raw_tx).await,
        };

        metrics::inc_push(result.is_ok());
        if let Err(err) = &result {
            warn!("failed to push transaction: error={err}");
        }
        result
    }

    async fn push_once(backend: &dyn PushBackend, raw_tx: &str) -> Result<PushReceipt, PushError> {
        if backend.push(raw_tx).await {
            info!("transaction pushed: backend={}", backend.name());
            Ok(PushReceipt {
                backend: backend.name().to_owned(),
                attempts: 1,
            })
        } else {
            Err(PushError::Rejected {
                backend: backend.name().to_owned(),
            })
        }
    }

    async fn push_with_failover(
        &self,
        candidates: &[&Arc<dyn PushBackend>],
        raw_tx: &str,
    ) -> Result<PushReceipt, PushError> {
        let mut pushed_by = None;
        let mut attempts = 0;

        while pushed_by.is_none() && attempts < self.max_attempts.get() {
            let pick = self.rng.lock().gen_range(0..candidates.len());
            let backend = candidates[pick];
            attempts += 1;
            info!(
                "pushing transaction: backend={}, attempt={attempts}",
                backend.name()
            );
            if backend.push(raw_tx).await {
                pushed_by = Some(backend.name().to_owned());
            }
        }

        match pushed_by {
            Some(backend) => {
                info!("transaction pushed: backend={backend}, attempts={attempts}");
                Ok(PushReceipt { backend, attempts })
            }
            None => Err(PushError::Exhausted { attempts }),
        }
    }
}
