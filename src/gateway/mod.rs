//! Reassembly engine: stores segments, detects completion, verifies and
//! forwards each bundle exactly once.
//!
//! [`Gateway`] is constructed explicitly (see [`GatewayBuilder`]) and owns its
//! store, dispatcher and transaction format. Processing a segment holds the
//! bundle's lock from the processed-record check through the processed-record
//! write, so a bundle completed by duplicate final segments arriving together
//! is pushed once.

mod builder;
mod error;
pub mod locks;

use std::{num::NonZeroU32, sync::Arc};

use log::{error, info, warn};
use serde::Deserialize;

pub use builder::GatewayBuilder;
pub use error::{BuildError, RelayError};
use locks::BundleLocks;

use crate::{
    codec,
    config::{ConfigError, GatewayConfig},
    dispatch::{Dispatcher, PushReceipt},
    metrics::{self, SegmentResult},
    segment::{BundleId, Segment, SegmentFields},
    store::{Bundle, BundleStore},
    transaction::TransactionFormat,
};

/// What happens to a complete bundle whose transaction fails verification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Keep the bundle until the store evicts it.
    #[default]
    Retain,
    /// Delete the bundle so that a full resend starts from scratch.
    Evict,
}

/// Successful handling of one segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SegmentOutcome {
    /// Stored; the bundle still awaits segments.
    Stored,
    /// The bundle was already finalised; the segment was ignored.
    AlreadyProcessed,
    /// The segment completed the bundle and the transaction was pushed.
    Pushed(PushReceipt),
}

/// The reassembly and dispatch engine.
pub struct Gateway {
    store: Arc<dyn BundleStore>,
    dispatcher: Dispatcher,
    format: Arc<dyn TransactionFormat>,
    locks: BundleLocks,
    mismatch_policy: MismatchPolicy,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("dispatcher", &self.dispatcher)
            .field("mismatch_policy", &self.mismatch_policy)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Start building a gateway.
    #[must_use]
    pub fn builder() -> GatewayBuilder { GatewayBuilder::new() }

    /// Gateway described by a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a push backend cannot be created.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        Ok(GatewayBuilder::from_config(config)?.build())
    }

    /// Storage backend holding bundles and processed records.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn BundleStore> { &self.store }

    /// Dispatcher forwarding verified transactions.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher { &self.dispatcher }

    /// Validate raw ingestion fields and process the resulting segment.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Segment`] for malformed fields, otherwise see
    /// [`process_segment`](Self::process_segment).
    pub async fn process_fields(&self, fields: SegmentFields) -> Result<SegmentOutcome, RelayError> {
        let segment = Segment::try_from(fields).inspect_err(|err| {
            metrics::inc_segments(SegmentResult::Rejected);
            warn!("rejected segment: error={err}");
        })?;
        self.process_segment(segment).await
    }

    /// Store a segment and, if it completes its bundle, verify and push the
    /// transaction.
    ///
    /// Segments of an already finalised bundle are acknowledged without being
    /// stored. Once a complete bundle verifies, it is recorded as processed
    /// whatever the push outcome, so retransmissions never trigger a second
    /// push.
    ///
    /// # Errors
    ///
    /// - [`RelayError::Build`] when the complete bundle fails reconstruction;
    ///   it stays unprocessed.
    /// - [`RelayError::Push`] when no backend accepted the transaction.
    /// - [`RelayError::InternalInconsistency`] when the store loses a bundle
    ///   it just reported complete.
    pub async fn process_segment(&self, segment: Segment) -> Result<SegmentOutcome, RelayError> {
        let bundle_id = segment.bundle_id().clone();
        let index = segment.index();
        let _guard = self.locks.acquire(&bundle_id).await;

        if self.store.has_processed_record(&bundle_id) {
            metrics::inc_segments(SegmentResult::Duplicate);
            info!("bundle already processed, skipping segment: bundle_id={bundle_id}, index={index}");
            return Ok(SegmentOutcome::AlreadyProcessed);
        }

        self.store.add_segment(&segment);
        metrics::inc_segments(SegmentResult::Stored);
        info!("stored segment: bundle_id={bundle_id}, index={index}");

        if !self.store.has_all_segments(&bundle_id) {
            return Ok(SegmentOutcome::Stored);
        }

        metrics::inc_bundles_completed();
        info!("bundle complete, building transaction: bundle_id={bundle_id}");
        let Some(bundle) = self.store.get_bundle(&bundle_id) else {
            error!("complete bundle missing from storage: bundle_id={bundle_id}");
            return Err(RelayError::InternalInconsistency { bundle_id });
        };

        let raw_tx = self
            .build_transaction(&bundle)
            .inspect_err(|err| self.on_build_failure(&bundle_id, err))?;

        let pushed = self.dispatcher.push(&raw_tx, bundle.network()).await;
        self.store
            .add_processed_record(&bundle_id, bundle.fingerprint());

        match pushed {
            Ok(receipt) => {
                info!(
                    "pushed transaction: bundle_id={bundle_id}, fingerprint={}, backend={}",
                    bundle.fingerprint(),
                    receipt.backend
                );
                Ok(SegmentOutcome::Pushed(receipt))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Reassemble a complete bundle and verify it against its fingerprint.
    ///
    /// Payloads are concatenated in index order; the result and the
    /// fingerprint are each decoded from encoded text when they look like it,
    /// and treated as hexadecimal otherwise.
    ///
    /// Returns the raw transaction as lowercase hexadecimal.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] when segments are missing, a field fails to
    /// decode, the bytes are not a transaction, or the transaction id differs
    /// from the fingerprint.
    pub fn build_transaction(&self, bundle: &Bundle) -> Result<String, BuildError> {
        let expected = bundle.total_count().map_or(0, NonZeroU32::get);
        let incomplete = || BuildError::IncompleteBundle {
            expected,
            found: bundle.segment_count(),
        };
        if usize::try_from(expected).ok() != Some(bundle.segment_count()) {
            return Err(incomplete());
        }
        let serialized = bundle.ordered_payload().ok_or_else(incomplete)?;

        let fingerprint = codec::to_hex(bundle.fingerprint())?;
        let raw = codec::decode_text_or_hex(&serialized)?;
        let computed = self.format.transaction_id(&raw)?;

        if computed != fingerprint {
            return Err(BuildError::HashMismatch {
                expected: fingerprint,
                computed,
            });
        }
        Ok(hex::encode(raw))
    }

    fn on_build_failure(&self, bundle_id: &BundleId, err: &BuildError) {
        metrics::inc_build_failures(err.reason());
        warn!("failed to build transaction: bundle_id={bundle_id}, error={err}");
        if matches!(err, BuildError::HashMismatch { .. })
            && self.mismatch_policy == MismatchPolicy::Evict
        {
            info!("evicting unverifiable bundle: bundle_id={bundle_id}");
            self.store.delete_bundle(bundle_id);
        }
    }
}
