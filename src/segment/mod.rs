//! Segment data model and ingestion-field validation.
//!
//! A transaction is split by the sender into numbered [`Segment`]s sharing a
//! [`BundleId`]. Segment zero additionally carries the [`BundleHeader`]: the
//! number of segments to expect, the fingerprint the reassembled transaction
//! must match, and an optional network hint used for routing.

mod error;
mod fields;
mod types;

pub use error::SegmentError;
pub use fields::{NumberField, SegmentFields};
pub use types::{BundleHeader, BundleId, Segment, SegmentIndex};

#[cfg(test)]
mod tests;
