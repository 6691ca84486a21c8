//! Storage capability for in-flight bundles and finalised records.
//!
//! [`BundleStore`] is the seam between the reassembly engine and whichever
//! cache keeps partial bundles alive. Every method is individually atomic; the
//! engine layers a per-bundle lock on top so that completion detection and the
//! processed-record write happen once per bundle.
//!
//! [`MemoryStore`] is the bundled backend: two bounded LRU caches with a
//! time-to-live, one for bundles and one for processed records.

mod bundle;
pub mod memory;

pub use bundle::Bundle;
pub use memory::{MemoryStore, MemoryStoreConfig};

use crate::segment::{BundleId, Segment, SegmentIndex};

/// Capability implemented by bundle storage backends.
///
/// Backends own all bundle and processed-record state. Callers only observe
/// snapshots (`get_bundle` returns an owned copy) and mutate through
/// [`add_segment`](Self::add_segment), [`delete_segment`](Self::delete_segment),
/// [`delete_bundle`](Self::delete_bundle) and
/// [`add_processed_record`](Self::add_processed_record).
pub trait BundleStore: Send + Sync {
    /// Store a segment, creating its bundle when absent.
    ///
    /// A segment whose index is already stored is ignored, so the header
    /// written by the first segment zero can never be overwritten.
    fn add_segment(&self, segment: &Segment);

    /// Remove one segment from a bundle, if present.
    fn delete_segment(&self, bundle_id: &BundleId, index: SegmentIndex);

    /// Snapshot of a bundle's current state.
    fn get_bundle(&self, bundle_id: &BundleId) -> Option<Bundle>;

    /// Remove a bundle and all its segments.
    fn delete_bundle(&self, bundle_id: &BundleId);

    /// Record a bundle as finalised. A second write for the same bundle is a
    /// no-op.
    fn add_processed_record(&self, bundle_id: &BundleId, fingerprint: &str);

    /// Fingerprint recorded when the bundle was finalised.
    fn processed_fingerprint(&self, bundle_id: &BundleId) -> Option<String>;

    /// Whether a bundle is currently stored.
    fn has_bundle(&self, bundle_id: &BundleId) -> bool { self.get_bundle(bundle_id).is_some() }

    /// Whether the given segment is stored.
    fn has_segment(&self, bundle_id: &BundleId, index: SegmentIndex) -> bool {
        self.get_segment(bundle_id, index).is_some()
    }

    /// Payload of the given segment.
    fn get_segment(&self, bundle_id: &BundleId, index: SegmentIndex) -> Option<String> {
        self.get_bundle(bundle_id)
            .and_then(|bundle| bundle.segment(index).map(str::to_owned))
    }

    /// Whether every segment of the bundle has arrived. `false` until segment
    /// zero announces the total count.
    fn has_all_segments(&self, bundle_id: &BundleId) -> bool {
        self.get_bundle(bundle_id)
            .is_some_and(|bundle| bundle.is_complete())
    }

    /// Whether the bundle has already been finalised.
    fn has_processed_record(&self, bundle_id: &BundleId) -> bool {
        self.processed_fingerprint(bundle_id).is_some()
    }
}
