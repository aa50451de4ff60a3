//! Pipeline orchestrator: cache → live source → seed fallback.
//!
//! Every load produces a complete immutable [`Snapshot`]; there is no
//! incremental update. The seed fallback keeps the dashboard usable when the
//! spreadsheet is unreachable, and the snapshot's origin records which path
//! produced it.

use crate::fetch::cache::SnapshotCache;
use crate::fetch::FinancialDataSource;
use crate::models::{Snapshot, SnapshotOrigin};
use crate::seed;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

pub struct Pipeline<S> {
    source: S,
}

impl<S: FinancialDataSource> Pipeline<S> {
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Load a snapshot, preferring the cache, then the live source, then the
    /// embedded seed dataset. The fresh snapshot replaces the cache entry.
    pub async fn load(&self, cache: &mut SnapshotCache) -> Result<Snapshot> {
        if let Some(hit) = cache.get() {
            debug!("Returning cached snapshot ({})", hit.origin);
            return Ok(hit.clone());
        }

        let snapshot = match self.source.fetch_series().await {
            Ok((origin, series)) => {
                info!("Live fetch succeeded via {} ({} companies)", origin, series.len());
                Snapshot::new(series, origin)
            }
            Err(e) => {
                warn!("Live fetch failed: {:#} — falling back to seed data", e);
                seed_snapshot()?
            }
        };

        cache.store(snapshot.clone());
        Ok(snapshot)
    }

    /// Bypass the cache and force a fresh load.
    pub async fn refresh(&self, cache: &mut SnapshotCache) -> Result<Snapshot> {
        cache.invalidate();
        self.load(cache).await
    }
}

/// The embedded dataset as a ready snapshot (offline mode and fetch fallback).
pub fn seed_snapshot() -> Result<Snapshot> {
    let series = seed::seed_series().context("Embedded seed dataset failed to parse")?;
    Ok(Snapshot::new(series, SnapshotOrigin::Seed))
}
