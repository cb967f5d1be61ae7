use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::RacewatchError;
use crate::session::SessionCatalog;
use crate::store::SessionStore;

pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(5);

struct CachedSnapshot {
    catalog: Arc<SessionCatalog>,
    fetched_at: Instant,
}

/// Time-bounded cache of the session catalog.
///
/// A snapshot is served without touching the store until it is older than the TTL or the cache is
/// cleared. Live refresh never goes through here, so a live session changing every second does not
/// churn the catalog.
pub struct SnapshotCache {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
    current: Option<CachedSnapshot>,
    last_good: Option<Arc<SessionCatalog>>,
}

impl SnapshotCache {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            current: None,
            last_good: None,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get_snapshot(&mut self) -> Result<Arc<SessionCatalog>, RacewatchError> {
        self.get_snapshot_at(Instant::now())
    }

    /// Return the cached catalog, fetching a new one first when there is none or it expired.
    ///
    /// # Errors
    ///
    /// Propagates the store's retrieval error. The previous snapshot is kept and stays available
    /// through [`SnapshotCache::last_good`].
    pub fn get_snapshot_at(&mut self, now: Instant) -> Result<Arc<SessionCatalog>, RacewatchError> {
        if let Some(cached) = &self.current {
            if now.saturating_duration_since(cached.fetched_at) <= self.ttl {
                debug!("Serving cached catalog of {} sessions", cached.catalog.len());
                return Ok(cached.catalog.clone());
            }
            debug!("Cached catalog expired");
        }

        let raw = self.store.fetch_all().map_err(|e| {
            warn!("Could not refresh catalog from {}: {}", self.store.describe(), e);
            e
        })?;
        let catalog = Arc::new(SessionCatalog::from_raw(raw));
        info!("Catalog refreshed with {} sessions", catalog.len());
        self.current = Some(CachedSnapshot {
            catalog: catalog.clone(),
            fetched_at: now,
        });
        self.last_good = Some(catalog.clone());
        Ok(catalog)
    }

    /// Drop the cached snapshot so the next call fetches regardless of the TTL.
    pub fn clear(&mut self) {
        debug!("Catalog cache cleared");
        self.current = None;
    }

    /// Most recent catalog that was fetched successfully, cleared or expired ones included.
    pub fn last_good(&self) -> Option<Arc<SessionCatalog>> {
        self.last_good.clone()
    }

    /// Time left before the cached snapshot expires, `None` when there is nothing cached.
    pub fn time_to_expiry(&self, now: Instant) -> Option<Duration> {
        self.current.as_ref().map(|cached| {
            self.ttl
                .saturating_sub(now.saturating_duration_since(cached.fetched_at))
        })
    }
}
