//! Error types surfaced by the reassembly engine.

use thiserror::Error;

use crate::{
    codec::DecodeError,
    dispatch::PushError,
    segment::{BundleId, SegmentError},
    transaction::TransactionError,
};

/// Reasons a complete bundle cannot be turned into a verified transaction.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BuildError {
    /// Stored segments do not cover the announced count.
    #[error("bundle incomplete: expected {expected} segments, found {found}")]
    IncompleteBundle {
        /// Announced segment count, zero when unknown.
        expected: u32,
        /// Segments stored.
        found: usize,
    },
    /// The reassembled transaction does not match the announced fingerprint.
    #[error("transaction id mismatch: expected {expected}, computed {computed}")]
    HashMismatch {
        /// Fingerprint announced by segment zero, as hex.
        expected: String,
        /// Identifier of the reassembled transaction.
        computed: String,
    },
    /// The payload or fingerprint could not be decoded.
    #[error("failed to decode bundle: {0}")]
    Decode(#[from] DecodeError),
    /// The decoded bytes are not a well-formed transaction.
    #[error("malformed transaction: {0}")]
    MalformedTransaction(#[from] TransactionError),
}

impl BuildError {
    /// Short label used in metrics.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::IncompleteBundle { .. } => "incomplete",
            Self::HashMismatch { .. } => "hash_mismatch",
            Self::Decode(_) => "decode",
            Self::MalformedTransaction(_) => "malformed",
        }
    }
}

/// Errors returned by [`Gateway::process_segment`](super::Gateway::process_segment).
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RelayError {
    /// The segment is malformed.
    #[error(transparent)]
    Segment(#[from] SegmentError),
    /// The store reported a complete bundle it then could not return.
    #[error("bundle {bundle_id} vanished from storage after completing")]
    InternalInconsistency {
        /// Affected bundle.
        bundle_id: BundleId,
    },
    /// The complete bundle failed reconstruction or verification.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// The verified transaction could not be pushed. The bundle is finalised
    /// regardless.
    #[error(transparent)]
    Push(#[from] PushError),
}

impl RelayError {
    /// Whether the caller sent an unusable segment, as opposed to a failure
    /// further down the pipeline.
    #[must_use]
    pub fn is_malformed_segment(&self) -> bool { matches!(self, Self::Segment(_)) }
}
