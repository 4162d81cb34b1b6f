//! Process-local snapshot cache of active redirect rules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::clock::{Clock, SystemClock};
use crate::domain::entities::RedirectRule;

/// Upper bound on how long lookups skip the store after a failed rebuild.
pub const REFRESH_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Immutable view of the active rules at one point in time.
///
/// Readers hold an `Arc` to a snapshot; a rebuild publishes a new one and
/// never mutates an existing snapshot.
#[derive(Debug)]
pub struct RedirectSnapshot {
    built_at: Instant,
    expires_at: Instant,
    rules: HashMap<String, RedirectRule>,
}

impl RedirectSnapshot {
    /// Builds a snapshot from a rule list.
    ///
    /// Inactive rules are dropped. When two rules share a source the first one
    /// in the list wins.
    pub fn build(rules: Vec<RedirectRule>, built_at: Instant, ttl: Duration) -> Self {
        let mut map = HashMap::with_capacity(rules.len());
        for rule in rules.into_iter().filter(|r| r.is_active) {
            map.entry(rule.source.clone()).or_insert(rule);
        }

        Self {
            built_at,
            expires_at: built_at + ttl,
            rules: map,
        }
    }

    /// A snapshot with no rules that is already expired.
    pub fn empty(now: Instant) -> Self {
        Self {
            built_at: now,
            expires_at: now,
            rules: HashMap::new(),
        }
    }

    pub fn get(&self, source: &str) -> Option<&RedirectRule> {
        self.rules.get(source)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Health summary of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub rules: usize,
    pub age: Option<Duration>,
    pub fresh: bool,
}

/// TTL cache holding the current [`RedirectSnapshot`].
///
/// Publishing a snapshot is a single `Arc` swap under a short write lock, so
/// concurrent readers see either the old or the new snapshot in full. Rebuilds
/// go through [`RedirectCache::refresh_gate`]: one task fetches while the
/// others wait and then pick up its result.
///
/// A failed rebuild opens a retry window (the smaller of the TTL and
/// [`REFRESH_RETRY_DELAY`]). Until it closes, lookups serve
/// [`RedirectCache::fallback`] instead of queueing for another fetch, so an
/// outage costs one store round trip per window rather than one per request.
pub struct RedirectCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    current: RwLock<Option<Arc<RedirectSnapshot>>>,
    retry_at: RwLock<Option<Instant>>,
    generation: AtomicU64,
    refresh_gate: Mutex<()>,
}

impl RedirectCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            current: RwLock::new(None),
            retry_at: RwLock::new(None),
            generation: AtomicU64::new(0),
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn with_system_clock(ttl: Duration) -> Self {
        Self::new(ttl, Arc::new(SystemClock))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Returns the current snapshot if it has not expired.
    pub fn fresh(&self) -> Option<Arc<RedirectSnapshot>> {
        let now = self.clock.now();
        self.latest().filter(|snapshot| snapshot.is_fresh(now))
    }

    /// Returns the current snapshot whether or not it has expired.
    pub fn latest(&self) -> Option<Arc<RedirectSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The latest snapshot, or an empty one when nothing was ever loaded.
    pub fn fallback(&self) -> Arc<RedirectSnapshot> {
        self.latest()
            .unwrap_or_else(|| Arc::new(RedirectSnapshot::empty(self.clock.now())))
    }

    /// True while a failed rebuild's retry window is open.
    pub fn backing_off(&self) -> bool {
        let now = self.clock.now();
        self.retry_at
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some_and(|retry_at| now < retry_at)
    }

    /// Records a failed rebuild and opens the retry window.
    pub fn mark_failed(&self) {
        let retry_at = self.clock.now() + self.ttl.min(REFRESH_RETRY_DELAY);
        *self.retry_at.write().unwrap_or_else(|e| e.into_inner()) = Some(retry_at);
    }

    fn clear_failure(&self) {
        *self.retry_at.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Acquires the single-writer gate for a rebuild.
    ///
    /// Returns the guard and the generation the rebuild is based on; pass the
    /// generation back to [`RedirectCache::replace`].
    pub async fn refresh_gate(&self) -> (MutexGuard<'_, ()>, u64) {
        let guard = self.refresh_gate.lock().await;
        (guard, self.generation.load(Ordering::Acquire))
    }

    /// Builds a snapshot from `rules` and publishes it.
    ///
    /// If the cache was invalidated after `generation` was read the rules may
    /// predate the change, so the snapshot is returned to the caller but not
    /// published.
    pub fn replace(&self, generation: u64, rules: Vec<RedirectRule>) -> Arc<RedirectSnapshot> {
        let snapshot = Arc::new(RedirectSnapshot::build(rules, self.clock.now(), self.ttl));

        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        if self.generation.load(Ordering::Acquire) == generation {
            *current = Some(snapshot.clone());
            drop(current);
            self.clear_failure();
            debug!("Redirect cache rebuilt with {} rules", snapshot.len());
        } else {
            debug!("Redirect cache invalidated during rebuild; snapshot not published");
        }

        snapshot
    }

    /// Drops the current snapshot so the next lookup rebuilds it.
    pub fn invalidate(&self) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        self.generation.fetch_add(1, Ordering::AcqRel);
        *current = None;
        drop(current);
        self.clear_failure();
        debug!("Redirect cache invalidated");
    }

    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        match self.latest() {
            Some(snapshot) => CacheStats {
                rules: snapshot.len(),
                age: Some(now.saturating_duration_since(snapshot.built_at)),
                fresh: snapshot.is_fresh(now),
            },
            None => CacheStats {
                rules: 0,
                age: None,
                fresh: false,
            },
        }
    }
}
