use std::{collections::HashMap, num::NonZeroU32};

use crate::segment::{Segment, SegmentIndex};

/// Accumulated reassembly state for one bundle.
///
/// `total_count` stays zero (unknown) until segment zero arrives; from then on
/// the header fields are fixed for the life of the bundle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bundle {
    total_count: u32,
    fingerprint: String,
    network: Option<String>,
    segments: HashMap<SegmentIndex, String>,
}

impl Bundle {
    /// Empty bundle awaiting its first segment.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Merge `segment` into the bundle.
    ///
    /// The first segment zero fixes the header; later ones only contribute
    /// their payload. Returns `false` when a segment with the same index is already present,
    /// in which case nothing changes.
    pub fn insert(&mut self, segment: &Segment) -> bool {
        if self.segments.contains_key(&segment.index()) {
            return false;
        }
        if let Some(header) = segment.header()
            && self.total_count == 0
        {
            self.total_count = header.total_count.get();
            self.fingerprint.clone_from(&header.fingerprint);
            self.network.clone_from(&header.network);
        }
        self.segments
            .insert(segment.index(), segment.payload().to_owned());
        true
    }

    /// Remove a segment, returning its payload.
    ///
    /// Removing segment zero keeps the header: it was fixed on arrival.
    pub fn remove(&mut self, index: SegmentIndex) -> Option<String> { self.segments.remove(&index) }

    /// Announced number of segments, `None` while segment zero is missing.
    #[must_use]
    pub fn total_count(&self) -> Option<NonZeroU32> { NonZeroU32::new(self.total_count) }

    /// Expected fingerprint, empty while segment zero is missing.
    #[must_use]
    pub fn fingerprint(&self) -> &str { &self.fingerprint }

    /// Routing hint announced by segment zero.
    #[must_use]
    pub fn network(&self) -> Option<&str> { self.network.as_deref() }

    /// Number of distinct segments stored.
    #[must_use]
    pub fn segment_count(&self) -> usize { self.segments.len() }

    /// Whether the segment at `index` is stored.
    #[must_use]
    pub fn contains(&self, index: SegmentIndex) -> bool { self.segments.contains_key(&index) }

    /// Payload of the segment at `index`.
    #[must_use]
    pub fn segment(&self, index: SegmentIndex) -> Option<&str> {
        self.segments.get(&index).map(String::as_str)
    }

    /// Whether the total is known and every index below it is stored.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_count > 0
            && (0..self.total_count).all(|index| self.contains(SegmentIndex::new(index)))
    }

    /// Concatenate payloads in index order, or `None` if any is missing.
    #[must_use]
    pub fn ordered_payload(&self) -> Option<String> {
        let total = self.total_count().map_or(0, NonZeroU32::get);
        (0..total)
            .map(|index| self.segment(SegmentIndex::new(index)))
            .try_fold(String::new(), |mut out, payload| {
                out.push_str(payload?);
                Some(out)
            })
            .filter(|_| total > 0)
    }
}
