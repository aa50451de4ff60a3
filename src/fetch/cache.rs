//! Explicit snapshot cache. Owned by the caller and passed by reference into
//! the pipeline — no process-global state — with TTL expiry and explicit
//! invalidation.

use crate::models::Snapshot;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    entry: Option<(Instant, Snapshot)>,
}

impl SnapshotCache {
    pub const fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// The cached snapshot, if one is present and not past its TTL.
    pub fn get(&self) -> Option<&Snapshot> {
        match &self.entry {
            Some((stored_at, snapshot)) if stored_at.elapsed() < self.ttl => Some(snapshot),
            _ => None,
        }
    }

    pub fn store(&mut self, snapshot: Snapshot) {
        self.entry = Some((Instant::now(), snapshot));
    }

    /// Drop the cached snapshot; the next load goes to the source.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SnapshotOrigin;

    fn snapshot() -> Snapshot {
        Snapshot::new(Vec::new(), SnapshotOrigin::Seed)
    }

    #[test]
    fn test_hit_within_ttl() {
        let mut cache = SnapshotCache::new(Duration::from_secs(60));
        assert!(cache.get().is_none());
        cache.store(snapshot());
        assert!(cache.get().is_some());
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let mut cache = SnapshotCache::new(Duration::ZERO);
        cache.store(snapshot());
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_invalidate() {
        let mut cache = SnapshotCache::new(Duration::from_secs(60));
        cache.store(snapshot());
        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
