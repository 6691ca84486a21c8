//! Metric helpers for `txrelay`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking ingested segments.
pub const SEGMENTS_TOTAL: &str = "txrelay_segments_total";
/// Name of the counter tracking bundles that became complete.
pub const BUNDLES_COMPLETED: &str = "txrelay_bundles_completed_total";
/// Name of the counter tracking push outcomes.
pub const PUSH_TOTAL: &str = "txrelay_push_total";
/// Name of the counter tracking failed reconstructions.
pub const BUILD_FAILURES: &str = "txrelay_build_failures_total";

/// How an incoming segment was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentResult {
    /// Stored in its bundle.
    Stored,
    /// Bundle already processed; nothing stored.
    Duplicate,
    /// Rejected before storage.
    Rejected,
}

impl SegmentResult {
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    fn as_str(self) -> &'static str {
        match self {
            SegmentResult::Stored => "stored",
            SegmentResult::Duplicate => "duplicate",
            SegmentResult::Rejected => "rejected",
        }
    }
}

/// Record an incoming segment.
pub fn inc_segments(result: SegmentResult) {
    #[cfg(feature = "metrics")]
    counter!(SEGMENTS_TOTAL, "result" => result.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = result;
}

/// Record a bundle whose last missing segment arrived.
pub fn inc_bundles_completed() {
    #[cfg(feature = "metrics")]
    counter!(BUNDLES_COMPLETED).increment(1);
}

/// Record a push outcome.
pub fn inc_push(success: bool) {
    #[cfg(feature = "metrics")]
    counter!(PUSH_TOTAL, "result" => if success { "ok" } else { "failed" }).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = success;
}

/// Record a failed reconstruction, labelled with a short reason.
pub fn inc_build_failures(reason: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(BUILD_FAILURES, "reason" => reason).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = reason;
}
