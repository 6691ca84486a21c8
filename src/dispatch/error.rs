use thiserror::Error;

/// Reasons a verified transaction could not be forwarded.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PushError {
    /// No registered backend serves the requested network.
    #[error("no push backend available (network {network:?})")]
    NoBackendAvailable {
        /// Network hint of the bundle.
        network: Option<String>,
    },
    /// The single candidate backend refused the transaction.
    #[error("push backend {backend} rejected the transaction")]
    Rejected {
        /// Name of the refusing backend.
        backend: String,
    },
    /// Every randomised attempt failed.
    #[error("push failed after {attempts} attempts")]
    Exhausted {
        /// Attempts made.
        attempts: usize,
    },
}
