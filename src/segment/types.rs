use std::num::NonZeroU32;

use derive_more::{Display, From, Into};

/// Caller-supplied identifier shared by every segment of one transaction.
///
/// # Examples
///
/// ```
/// use txrelay::segment::BundleId;
/// let id = BundleId::new("bundle-1");
/// assert_eq!(id.as_str(), "bundle-1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("{_0}")]
pub struct BundleId(String);

impl BundleId {
    /// Create a new identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for BundleId {
    fn from(value: &str) -> Self { Self::new(value) }
}

/// Zero-based position of a segment within its bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Display, From, Into)]
#[display("{_0}")]
pub struct SegmentIndex(u32);

impl SegmentIndex {
    /// Construct an index from a `u32` value.
    #[must_use]
    pub const fn new(value: u32) -> Self { Self(value) }

    /// Index of the segment that carries the bundle header.
    #[must_use]
    pub const fn zero() -> Self { Self(0) }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u32 { self.0 }

    /// Whether this is the header-carrying first segment.
    #[must_use]
    pub const fn is_zero(self) -> bool { self.0 == 0 }
}

/// Bundle-wide metadata carried only by segment zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleHeader {
    /// Number of segments making up the bundle.
    pub total_count: NonZeroU32,
    /// Expected transaction identifier, hexadecimal or encoded text.
    pub fingerprint: String,
    /// Optional routing hint, for example `t` for testnet.
    pub network: Option<String>,
}

impl BundleHeader {
    /// Create a header without a network hint.
    #[must_use]
    pub fn new(total_count: NonZeroU32, fingerprint: impl Into<String>) -> Self {
        Self {
            total_count,
            fingerprint: fingerprint.into(),
            network: None,
        }
    }

    /// Attach a network hint.
    #[must_use]
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }
}

/// One validated fragment of a bundle.
///
/// The header is present exactly when the index is zero; the constructors
/// uphold this so the store never sees a header on a later segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    bundle_id: BundleId,
    index: SegmentIndex,
    payload: String,
    header: Option<BundleHeader>,
}

impl Segment {
    /// Build the header-carrying first segment of a bundle.
    #[must_use]
    pub fn first(
        bundle_id: impl Into<BundleId>,
        header: BundleHeader,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            index: SegmentIndex::zero(),
            payload: payload.into(),
            header: Some(header),
        }
    }

    /// Build a later segment. Returns `None` for index zero, which must carry
    /// a header and is built with [`Segment::first`].
    #[must_use]
    pub fn continuation(
        bundle_id: impl Into<BundleId>,
        index: SegmentIndex,
        payload: impl Into<String>,
    ) -> Option<Self> {
        (!index.is_zero()).then(|| Self::later(bundle_id.into(), index, payload.into()))
    }

    pub(super) fn later(bundle_id: BundleId, index: SegmentIndex, payload: String) -> Self {
        Self {
            bundle_id,
            index,
            payload,
            header: None,
        }
    }

    /// Bundle this segment belongs to.
    #[must_use]
    pub fn bundle_id(&self) -> &BundleId { &self.bundle_id }

    /// Position of this segment in its bundle.
    #[must_use]
    pub const fn index(&self) -> SegmentIndex { self.index }

    /// Chunk of the serialised transaction.
    #[must_use]
    pub fn payload(&self) -> &str { &self.payload }

    /// Bundle header, present on segment zero only.
    #[must_use]
    pub fn header(&self) -> Option<&BundleHeader> { self.header.as_ref() }
}
