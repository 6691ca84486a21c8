//! Bounded in-memory backend with least-recently-used and age eviction.
//!
//! Entries expire once they have not been written for the configured
//! time-to-live; reads do not extend their life. When a cache is full the
//! least recently used entry is dropped to make room.

use std::{
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use log::debug;
use lru::LruCache;
use parking_lot::Mutex;
use serde::Deserialize;

use super::{Bundle, BundleStore};
use crate::segment::{BundleId, Segment, SegmentIndex};

const DEFAULT_CACHE_SIZE: NonZeroUsize = match NonZeroUsize::new(10_000) {
    Some(size) => size,
    None => NonZeroUsize::MIN,
};
const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Settings for [`MemoryStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemoryStoreConfig {
    /// Maximum number of entries held by each cache.
    pub cache_size: NonZeroUsize,
    /// Age after which an unwritten entry is discarded.
    #[serde(rename = "ttl_secs", with = "secs")]
    pub ttl: Duration,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            ttl: DEFAULT_TTL,
        }
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[derive(Debug)]
struct Timed<T> {
    value: T,
    written_at: Instant,
}

impl<T> Timed<T> {
    fn new(value: T, now: Instant) -> Self {
        Self {
            value,
            written_at: now,
        }
    }

    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.written_at) >= ttl
    }
}

type TimedCache<T> = LruCache<BundleId, Timed<T>>;

/// Look up a live entry, dropping it first if it has expired.
fn live<'a, T>(
    cache: &'a mut TimedCache<T>,
    key: &BundleId,
    ttl: Duration,
    now: Instant,
) -> Option<&'a mut Timed<T>> {
    if cache.peek(key).is_some_and(|entry| entry.is_expired(ttl, now)) {
        cache.pop(key);
        return None;
    }
    cache.get_mut(key)
}

/// Purge expired entries, returning how many were removed.
fn purge<T>(cache: &mut TimedCache<T>, ttl: Duration, now: Instant) -> usize {
    let expired: Vec<BundleId> = cache
        .iter()
        .filter(|(_, entry)| entry.is_expired(ttl, now))
        .map(|(key, _)| key.clone())
        .collect();
    for key in &expired {
        cache.pop(key);
    }
    expired.len()
}

/// In-memory [`BundleStore`] backed by two bounded LRU caches.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroU32;
///
/// use txrelay::{
///     segment::{BundleHeader, BundleId, Segment},
///     store::{BundleStore, MemoryStore, MemoryStoreConfig},
/// };
///
/// let store = MemoryStore::new(MemoryStoreConfig::default());
/// let header = BundleHeader::new(NonZeroU32::MIN, "00");
/// store.add_segment(&Segment::first("b1", header, "0100"));
/// assert!(store.has_all_segments(&BundleId::new("b1")));
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    ttl: Duration,
    bundles: Mutex<TimedCache<Bundle>>,
    processed: Mutex<TimedCache<String>>,
}

impl MemoryStore {
    /// Create a store with the given bounds.
    #[must_use]
    pub fn new(config: MemoryStoreConfig) -> Self {
        Self {
            ttl: config.ttl,
            bundles: Mutex::new(LruCache::new(config.cache_size)),
            processed: Mutex::new(LruCache::new(config.cache_size)),
        }
    }

    /// Store a segment using an explicit clock reading.
    pub fn add_segment_at(&self, segment: &Segment, now: Instant) {
        let bundle_id = segment.bundle_id();
        let mut bundles = self.bundles.lock();
        if live(&mut bundles, bundle_id, self.ttl, now).is_none() {
            bundles.put(bundle_id.clone(), Timed::new(Bundle::new(), now));
        }
        if let Some(entry) = bundles.get_mut(bundle_id)
            && entry.value.insert(segment)
        {
            entry.written_at = now;
        } else {
            debug!(
                "duplicate segment ignored: bundle_id={bundle_id}, index={}",
                segment.index()
            );
        }
    }

    /// Snapshot a bundle using an explicit clock reading.
    #[must_use]
    pub fn get_bundle_at(&self, bundle_id: &BundleId, now: Instant) -> Option<Bundle> {
        let mut bundles = self.bundles.lock();
        live(&mut bundles, bundle_id, self.ttl, now).map(|entry| entry.value.clone())
    }

    /// Whether a bundle is complete, using an explicit clock reading.
    #[must_use]
    pub fn has_all_segments_at(&self, bundle_id: &BundleId, now: Instant) -> bool {
        let mut bundles = self.bundles.lock();
        live(&mut bundles, bundle_id, self.ttl, now).is_some_and(|entry| entry.value.is_complete())
    }

    /// Record a finalised bundle using an explicit clock reading.
    pub fn add_processed_record_at(&self, bundle_id: &BundleId, fingerprint: &str, now: Instant) {
        let mut processed = self.processed.lock();
        if live(&mut processed, bundle_id, self.ttl, now).is_none() {
            processed.put(bundle_id.clone(), Timed::new(fingerprint.to_owned(), now));
        }
    }

    /// Processed-record lookup using an explicit clock reading.
    #[must_use]
    pub fn processed_fingerprint_at(&self, bundle_id: &BundleId, now: Instant) -> Option<String> {
        let mut processed = self.processed.lock();
        live(&mut processed, bundle_id, self.ttl, now).map(|entry| entry.value.clone())
    }

    /// Remove expired bundles and processed records.
    ///
    /// Returns the number of entries evicted across both caches.
    pub fn purge_expired_at(&self, now: Instant) -> usize {
        purge(&mut self.bundles.lock(), self.ttl, now)
            + purge(&mut self.processed.lock(), self.ttl, now)
    }

    /// Remove expired entries using the current time.
    pub fn purge_expired(&self) -> usize { self.purge_expired_at(Instant::now()) }

    /// Number of bundles held, including expired ones not yet purged.
    #[must_use]
    pub fn bundle_count(&self) -> usize { self.bundles.lock().len() }
}

impl BundleStore for MemoryStore {
    fn add_segment(&self, segment: &Segment) { self.add_segment_at(segment, Instant::now()); }

    fn delete_segment(&self, bundle_id: &BundleId, index: SegmentIndex) {
        let mut bundles = self.bundles.lock();
        if let Some(entry) = live(&mut bundles, bundle_id, self.ttl, Instant::now())
            && entry.value.remove(index).is_some()
        {
            entry.written_at = Instant::now();
        }
    }

    fn get_bundle(&self, bundle_id: &BundleId) -> Option<Bundle> {
        self.get_bundle_at(bundle_id, Instant::now())
    }

    fn delete_bundle(&self, bundle_id: &BundleId) { self.bundles.lock().pop(bundle_id); }

    fn add_processed_record(&self, bundle_id: &BundleId, fingerprint: &str) {
        self.add_processed_record_at(bundle_id, fingerprint, Instant::now());
    }

    fn processed_fingerprint(&self, bundle_id: &BundleId) -> Option<String> {
        self.processed_fingerprint_at(bundle_id, Instant::now())
    }

    fn has_bundle(&self, bundle_id: &BundleId) -> bool {
        let mut bundles = self.bundles.lock();
        live(&mut bundles, bundle_id, self.ttl, Instant::now()).is_some()
    }

    fn has_all_segments(&self, bundle_id: &BundleId) -> bool {
        self.has_all_segments_at(bundle_id, Instant::now())
    }
}
