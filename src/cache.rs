// =============================================================================
// Score Cache — time-bounded holder of the last scored table
// =============================================================================
//
// The table is recomputed wholesale; nothing is updated incrementally. The
// cache only answers "is what I hold still fresh?" and hands out the last
// table even when stale, so the dashboard keeps serving data while a
// refresh is failing.
//
// Every time-dependent method has a `*_at(now)` form so tests can drive the
// clock explicitly.
//
// Each invalidation bumps a generation counter. A refresh reads the
// generation before it starts building and stores with it, so an
// invalidation that lands mid-build leaves the new entry expired.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::debug;

use crate::pipeline::ScoreTable;

struct Entry {
    stored_at: Instant,
    table: Arc<ScoreTable>,
    invalidated: bool,
}

impl Entry {
    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stored_at)
    }
}

/// TTL cache for the scored table.
pub struct ScoreCache {
    ttl: RwLock<Duration>,
    entry: RwLock<Option<Entry>>,
    generation: AtomicU64,
}

impl ScoreCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: RwLock::new(ttl),
            entry: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        *self.ttl.read()
    }

    pub fn set_ttl(&self, ttl: Duration) {
        *self.ttl.write() = ttl;
    }

    /// The stored table if it is younger than the TTL.
    pub fn fresh(&self) -> Option<Arc<ScoreTable>> {
        self.fresh_at(Instant::now())
    }

    pub fn fresh_at(&self, now: Instant) -> Option<Arc<ScoreTable>> {
        let ttl = self.ttl();
        self.entry
            .read()
            .as_ref()
            .filter(|e| !e.invalidated && e.age(now) < ttl)
            .map(|e| e.table.clone())
    }

    /// The stored table regardless of age.
    pub fn latest(&self) -> Option<Arc<ScoreTable>> {
        self.entry.read().as_ref().map(|e| e.table.clone())
    }

    /// True when nothing is stored or the entry has expired.
    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Instant::now())
    }

    pub fn is_stale_at(&self, now: Instant) -> bool {
        self.fresh_at(now).is_none()
    }

    /// Seconds until expiry, `None` when empty or already expired.
    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        let ttl = self.ttl();
        self.entry
            .read()
            .as_ref()
            .filter(|e| !e.invalidated)
            .and_then(|e| ttl.checked_sub(e.age(now)))
            .filter(|d| !d.is_zero())
    }

    pub fn store(&self, table: ScoreTable) -> Arc<ScoreTable> {
        self.store_at(table, Instant::now())
    }

    pub fn store_at(&self, table: ScoreTable, now: Instant) -> Arc<ScoreTable> {
        self.store_from_at(table, self.generation(), now)
    }

    /// Number of invalidations so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Store a table whose build started at `generation`. If the cache was
    /// invalidated since then, the new entry is stored already expired.
    pub fn store_from(&self, table: ScoreTable, generation: u64) -> Arc<ScoreTable> {
        self.store_from_at(table, generation, Instant::now())
    }

    pub fn store_from_at(
        &self,
        table: ScoreTable,
        generation: u64,
        now: Instant,
    ) -> Arc<ScoreTable> {
        let table = Arc::new(table);
        let mut entry = self.entry.write();
        let invalidated = self.generation() != generation;
        *entry = Some(Entry {
            stored_at: now,
            table: table.clone(),
            invalidated,
        });
        drop(entry);
        debug!(assets = table.assets.len(), invalidated, "score table cached");
        table
    }

    /// Mark the entry expired. The table stays readable through `latest()`
    /// until a refresh replaces it.
    pub fn invalidate(&self) {
        let mut entry = self.entry.write();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(entry) = entry.as_mut() {
            entry.invalidated = true;
        }
        drop(entry);
        debug!("score cache invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: usize) -> ScoreTable {
        ScoreTable {
            assets: Vec::with_capacity(n),
            ..ScoreTable::empty()
        }
    }

    #[test]
    fn empty_cache_is_stale() {
        let cache = ScoreCache::new(Duration::from_secs(900));
        assert!(cache.is_stale());
        assert!(cache.fresh().is_none());
        assert!(cache.latest().is_none());
    }

    #[test]
    fn entry_expires_after_ttl() {
        let cache = ScoreCache::new(Duration::from_secs(900));
        let t0 = Instant::now();
        cache.store_at(table(0), t0);

        assert!(cache.fresh_at(t0).is_some());
        assert!(cache.fresh_at(t0 + Duration::from_secs(899)).is_some());
        assert!(cache.is_stale_at(t0 + Duration::from_secs(900)));
        assert!(cache.latest().is_some());
        assert_eq!(
            cache.remaining_at(t0 + Duration::from_secs(600)),
            Some(Duration::from_secs(300))
        );
        assert_eq!(cache.remaining_at(t0 + Duration::from_secs(901)), None);
    }

    #[test]
    fn invalidate_keeps_latest() {
        let cache = ScoreCache::new(Duration::from_secs(900));
        cache.store(table(0));
        assert!(!cache.is_stale());
        cache.invalidate();
        assert!(cache.is_stale());
        assert!(cache.latest().is_some());
    }

    #[test]
    fn invalidation_during_build_survives_store() {
        let cache = ScoreCache::new(Duration::from_secs(900));
        let generation = cache.generation();
        cache.invalidate();
        cache.store_from(table(0), generation);
        assert!(cache.is_stale());
        assert!(cache.latest().is_some());

        // The next build starts after the request and clears it.
        cache.store_from(table(0), cache.generation());
        assert!(!cache.is_stale());
    }

    #[test]
    fn store_replaces_entry() {
        let cache = ScoreCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        let first = cache.store_at(table(0), t0);
        let second = cache.store_at(table(0), t0 + Duration::from_secs(120));
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&cache.latest().unwrap(), &second));
        assert!(cache.fresh_at(t0 + Duration::from_secs(150)).is_some());
    }

    #[test]
    fn shorter_ttl_applies_immediately() {
        let cache = ScoreCache::new(Duration::from_secs(900));
        let t0 = Instant::now();
        cache.store_at(table(0), t0);
        cache.set_ttl(Duration::from_secs(10));
        assert!(cache.is_stale_at(t0 + Duration::from_secs(10)));
    }
}
