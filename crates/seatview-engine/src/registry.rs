//! Per-venue run serialization (resolves Open Question 3: concurrent runs
//! on one venue are undefined upstream — this crate adds a process-local
//! mutex). Grounded in the `dashmap` usage already present in the wider
//! example pack for keyed concurrent registries.

use std::sync::Arc;

use dashmap::DashMap;
use seatview_core::VenueId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Hands out a per-venue lock, serializing runs targeting the same venue
/// within one orchestrator process. Cross-process serialization would
/// require the external metadata store and is out of scope.
#[derive(Debug, Default)]
pub struct VenueRunRegistry {
    locks: DashMap<VenueId, Arc<Mutex<()>>>,
}

impl VenueRunRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquires the lock for `venue_id`, creating its entry if this is the
    /// first run ever seen for it. The returned guard holds the lock for
    /// as long as the run is in flight.
    pub async fn acquire(&self, venue_id: &VenueId) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(venue_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_acquire_waits_for_first_release() {
        let registry = VenueRunRegistry::new();
        let venue = VenueId::new("v1");

        let guard = registry.acquire(&venue).await;
        let registry = Arc::new(registry);
        let registry2 = registry.clone();
        let venue2 = venue.clone();
        let handle = tokio::spawn(async move {
            let _guard = registry2.acquire(&venue2).await;
        });

        tokio::task::yield_now().await;
        assert!(!handle.is_finished());
        drop(guard);
        handle.await.unwrap();
    }
}
