//! Per-bundle mutual exclusion.
//!
//! Each bundle id maps to an async mutex held for the whole
//! check-store-complete-push-record sequence, so two callers can never both
//! observe the same bundle becoming complete. Bundles do not contend with each
//! other. Entries are dropped as soon as nobody holds or awaits them.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::segment::BundleId;

/// Registry of per-bundle locks.
#[derive(Debug, Default)]
pub struct BundleLocks(DashMap<BundleId, Arc<Mutex<()>>>);

impl BundleLocks {
    /// Wait for exclusive access to `bundle_id`.
    pub async fn acquire(&self, bundle_id: &BundleId) -> BundleGuard<'_> {
        let mutex = self.0.entry(bundle_id.clone()).or_default().clone();
        let guard = mutex.lock_owned().await;
        BundleGuard {
            locks: &self.0,
            bundle_id: bundle_id.clone(),
            guard: Some(guard),
        }
    }

    /// Number of bundles currently locked or awaited.
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    /// Whether no bundle is locked or awaited.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

/// Exclusive access to one bundle, released on drop.
#[derive(Debug)]
pub struct BundleGuard<'a> {
    locks: &'a DashMap<BundleId, Arc<Mutex<()>>>,
    bundle_id: BundleId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for BundleGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .remove_if(&self.bundle_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
