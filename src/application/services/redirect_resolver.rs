//! Request-time redirect resolution over the snapshot cache.

use std::sync::Arc;

use axum::http::Method;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::domain::entities::{RedirectKind, RedirectRule};
use crate::domain::hit_event::HitEvent;
use crate::domain::repositories::RedirectRepository;
use crate::infrastructure::cache::{RedirectCache, RedirectSnapshot};
use crate::utils::destination::Destination;
use crate::utils::path::{candidate_paths, should_skip};

/// What the edge should do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectAction {
    /// No rule applies; route the request normally.
    PassThrough,
    /// Send a 301/302/307/308 with a `Location` header.
    Redirect {
        location: String,
        kind: RedirectKind,
        rule_id: i64,
    },
    /// Answer with 410 or 451 and no redirect.
    Terminal { kind: RedirectKind, rule_id: i64 },
}

/// Matches request paths against the active redirect rules.
///
/// Owns no global state: the cache and repository are injected, so tests can
/// supply a manual clock and a fixed rule set.
///
/// # Failure Semantics
///
/// Rebuilding the cache may fail (database down, network error). The failure
/// is logged and the last snapshot is used even if it has expired; with no
/// snapshot at all every request passes through. Errors never reach callers.
pub struct RedirectResolver<R: RedirectRepository + ?Sized> {
    repository: Arc<R>,
    cache: Arc<RedirectCache>,
    hit_sender: mpsc::Sender<HitEvent>,
}

impl<R: RedirectRepository + ?Sized> RedirectResolver<R> {
    /// Creates a new resolver.
    pub fn new(
        repository: Arc<R>,
        cache: Arc<RedirectCache>,
        hit_sender: mpsc::Sender<HitEvent>,
    ) -> Self {
        Self {
            repository,
            cache,
            hit_sender,
        }
    }

    pub fn cache(&self) -> &RedirectCache {
        &self.cache
    }

    /// Finds the rule matching `path`, trying the exact path first and then
    /// its trailing-slash variants.
    pub async fn resolve(&self, path: &str) -> Option<RedirectRule> {
        let snapshot = self.snapshot().await;

        candidate_paths(path)
            .iter()
            .find_map(|candidate| snapshot.get(candidate))
            .cloned()
    }

    /// Resolves `path` for the check endpoint.
    ///
    /// Unlike [`Self::apply`] this ignores method and skip rules, since the
    /// caller already decided the path is worth checking. Rules that would
    /// redirect back to `path` are hidden. A match records a hit.
    pub async fn check(&self, path: &str) -> Option<RedirectRule> {
        let rule = self.resolve(path).await?;

        if rule.kind.is_redirect() && self.destination_for(&rule, path, None).is_none() {
            return None;
        }

        self.record_hit(&rule);
        Some(rule)
    }

    /// Decides how the edge handles a request.
    ///
    /// Only `GET` and `HEAD` are considered; skipped paths (API, assets, SEO
    /// files) never touch the cache. A matched redirect whose destination
    /// leads back to the request path is ignored. Any served rule records a
    /// hit.
    pub async fn apply(&self, method: &Method, path: &str, host: Option<&str>) -> RedirectAction {
        if method != Method::GET && method != Method::HEAD {
            return RedirectAction::PassThrough;
        }

        if should_skip(path) {
            return RedirectAction::PassThrough;
        }

        let Some(rule) = self.resolve(path).await else {
            return RedirectAction::PassThrough;
        };

        let action = if rule.kind.is_redirect() {
            match self.destination_for(&rule, path, host) {
                Some(destination) => RedirectAction::Redirect {
                    location: destination.as_location().to_string(),
                    kind: rule.kind,
                    rule_id: rule.id,
                },
                None => return RedirectAction::PassThrough,
            }
        } else {
            RedirectAction::Terminal {
                kind: rule.kind,
                rule_id: rule.id,
            }
        };

        metrics::counter!("redirects_served_total", "status" => rule.kind.to_string())
            .increment(1);
        self.record_hit(&rule);
        action
    }

    /// Drops the cached rules so the next lookup reloads them.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    /// Parses the rule destination, rejecting unusable or looping targets.
    fn destination_for(
        &self,
        rule: &RedirectRule,
        path: &str,
        host: Option<&str>,
    ) -> Option<Destination> {
        let destination = match Destination::parse(&rule.destination) {
            Ok(destination) => destination,
            Err(e) => {
                warn!(
                    "Ignoring redirect {} ({}): invalid destination {:?}: {}",
                    rule.id, rule.source, rule.destination, e
                );
                return None;
            }
        };

        if destination.loops_back_to(path, host) {
            warn!(
                "Ignoring redirect {} ({} -> {}): destination loops back to {}",
                rule.id, rule.source, rule.destination, path
            );
            return None;
        }

        Some(destination)
    }

    /// Returns a fresh snapshot, rebuilding it if expired.
    ///
    /// While a failed rebuild's retry window is open the last snapshot (or an
    /// empty one) is served without touching the store.
    async fn snapshot(&self) -> Arc<RedirectSnapshot> {
        if let Some(snapshot) = self.cache.fresh() {
            return snapshot;
        }
        if self.cache.backing_off() {
            return self.cache.fallback();
        }

        let (_guard, generation) = self.cache.refresh_gate().await;

        // Another task may have rebuilt it, or failed to, while we waited.
        if let Some(snapshot) = self.cache.fresh() {
            return snapshot;
        }
        if self.cache.backing_off() {
            return self.cache.fallback();
        }

        match self.repository.list_active().await {
            Ok(rules) => {
                metrics::counter!("redirect_cache_refresh_total").increment(1);
                self.cache.replace(generation, rules)
            }
            Err(e) => {
                metrics::counter!("redirect_cache_refresh_failed_total").increment(1);
                self.cache.mark_failed();
                let fallback = self.cache.fallback();
                warn!(
                    "Failed to load redirect rules, using {} snapshot: {}",
                    if fallback.is_empty() { "empty" } else { "stale" },
                    e
                );
                fallback
            }
        }
    }

    /// Queues a hit for the background worker without waiting.
    fn record_hit(&self, rule: &RedirectRule) {
        match self
            .hit_sender
            .try_send(HitEvent::new(rule.id, rule.source.clone()))
        {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                metrics::counter!("redirect_hits_dropped_total").increment(1);
                debug!("Hit queue full, dropping hit for redirect {}", event.redirect_id);
            }
            Err(TrySendError::Closed(event)) => {
                metrics::counter!("redirect_hits_dropped_total").increment(1);
                warn!("Hit queue closed, dropping hit for redirect {}", event.redirect_id);
            }
        }
    }
}
