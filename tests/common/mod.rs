#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use redirect_resolver::application::services::{RedirectResolver, RedirectService};
use redirect_resolver::domain::entities::{NewRedirect, RedirectKind, RedirectPatch, RedirectRule};
use redirect_resolver::domain::hit_event::HitEvent;
use redirect_resolver::domain::repositories::RedirectRepository;
use redirect_resolver::error::AppError;
use redirect_resolver::infrastructure::cache::{ManualClock, RedirectCache};
use redirect_resolver::infrastructure::persistence::PgRedirectRepository;
use redirect_resolver::state::AppState;
use serde_json::json;
use sqlx::PgPool;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

pub const ADMIN_TOKEN: &str = "test-admin-token-0123456789";
pub const CACHE_TTL: Duration = Duration::from_secs(30);

/// Rule store backed by a `Vec`, with switches to simulate an outage and a
/// slow connection.
#[derive(Default)]
pub struct InMemoryRedirectRepository {
    rules: Mutex<Vec<RedirectRule>>,
    failing: AtomicBool,
    list_active_delay: Mutex<Option<Duration>>,
    list_active_calls: AtomicUsize,
}

impl InMemoryRedirectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a rule directly, bypassing validation.
    pub fn insert(&self, source: &str, destination: &str, kind: RedirectKind, active: bool) -> i64 {
        let mut rules = self.rules.lock().unwrap();
        let id = rules.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let now = Utc::now();
        rules.push(RedirectRule::new(
            id,
            source.to_string(),
            destination.to_string(),
            kind,
            active,
            0,
            now,
            now,
        ));
        id
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes every `list_active` call take `delay` before answering.
    pub fn set_list_active_delay(&self, delay: Duration) {
        *self.list_active_delay.lock().unwrap() = Some(delay);
    }

    pub fn list_active_calls(&self) -> usize {
        self.list_active_calls.load(Ordering::SeqCst)
    }

    pub fn hits(&self, id: i64) -> i64 {
        self.rules
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.hits)
            .unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(AppError::internal("Database error", json!({})))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RedirectRepository for InMemoryRedirectRepository {
    async fn list_active(&self) -> Result<Vec<RedirectRule>, AppError> {
        self.list_active_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.list_active_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_available()?;
        let mut rules: Vec<_> = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.is_active)
            .cloned()
            .collect();
        rules.sort_by_key(|r| r.id);
        Ok(rules)
    }

    async fn list(&self, active: Option<bool>) -> Result<Vec<RedirectRule>, AppError> {
        self.check_available()?;
        let mut rules: Vec<_> = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .filter(|r| active.is_none_or(|a| r.is_active == a))
            .cloned()
            .collect();
        rules.sort_by_key(|r| std::cmp::Reverse(r.id));
        Ok(rules)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RedirectRule>, AppError> {
        self.check_available()?;
        Ok(self.rules.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_source(&self, source: &str) -> Result<Option<RedirectRule>, AppError> {
        self.check_available()?;
        Ok(self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.source == source)
            .cloned())
    }

    async fn create(&self, new_redirect: NewRedirect) -> Result<RedirectRule, AppError> {
        self.check_available()?;
        if self.find_by_source(&new_redirect.source).await?.is_some() {
            return Err(AppError::conflict("Unique constraint violation", json!({})));
        }
        let id = self.insert(
            &new_redirect.source,
            &new_redirect.destination,
            new_redirect.kind,
            new_redirect.is_active,
        );
        Ok(self.find_by_id(id).await?.unwrap())
    }

    async fn update(&self, id: i64, patch: RedirectPatch) -> Result<RedirectRule, AppError> {
        self.check_available()?;
        let mut rules = self.rules.lock().unwrap();
        let rule = rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::not_found("Redirect not found", json!({ "id": id })))?;

        if let Some(destination) = patch.destination {
            rule.destination = destination;
        }
        if let Some(kind) = patch.kind {
            rule.kind = kind;
        }
        if let Some(is_active) = patch.is_active {
            rule.is_active = is_active;
        }
        rule.updated_at = Utc::now();
        Ok(rule.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        self.check_available()?;
        let mut rules = self.rules.lock().unwrap();
        let before = rules.len();
        rules.retain(|r| r.id != id);
        Ok(rules.len() != before)
    }

    async fn increment_hits(&self, id: i64) -> Result<(), AppError> {
        self.check_available()?;
        if let Some(rule) = self.rules.lock().unwrap().iter_mut().find(|r| r.id == id) {
            rule.hits += 1;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check_available()
    }
}

/// Everything a test needs to drive the app and observe side effects.
pub struct TestContext {
    pub state: AppState,
    pub repository: Arc<InMemoryRedirectRepository>,
    pub clock: Arc<ManualClock>,
    pub hits: mpsc::Receiver<HitEvent>,
}

impl TestContext {
    /// Drains queued hit events without waiting.
    pub fn drain_hits(&mut self) -> Vec<HitEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.hits.try_recv() {
            events.push(event);
        }
        events
    }
}

/// State over an in-memory repository with a manual clock and the admin API enabled.
pub fn create_test_context() -> TestContext {
    let repository = Arc::new(InMemoryRedirectRepository::new());
    let clock = Arc::new(ManualClock::new());
    let (tx, rx) = mpsc::channel(100);

    let dyn_repo: Arc<dyn RedirectRepository> = repository.clone();
    let cache = Arc::new(RedirectCache::new(CACHE_TTL, clock.clone()));
    let resolver = Arc::new(RedirectResolver::new(dyn_repo.clone(), cache, tx.clone()));
    let redirect_service = Arc::new(RedirectService::new(dyn_repo));

    let state = AppState::new(redirect_service, resolver, Some(ADMIN_TOKEN), tx);

    TestContext {
        state,
        repository,
        clock,
        hits: rx,
    }
}

/// State over PostgreSQL, for handler tests that exercise the real queries.
pub fn create_pg_state(pool: PgPool) -> (AppState, mpsc::Receiver<HitEvent>) {
    let (tx, rx) = mpsc::channel(100);

    let repository: Arc<dyn RedirectRepository> =
        Arc::new(PgRedirectRepository::new(Arc::new(pool)));
    let cache = Arc::new(RedirectCache::with_system_clock(CACHE_TTL));
    let resolver = Arc::new(RedirectResolver::new(repository.clone(), cache, tx.clone()));
    let redirect_service = Arc::new(RedirectService::new(repository));

    let state = AppState::new(redirect_service, resolver, Some(ADMIN_TOKEN), tx);

    (state, rx)
}

pub async fn create_test_redirect(
    pool: &PgPool,
    source: &str,
    destination: &str,
    redirect_type: i16,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO redirects (source, destination, redirect_type) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(source)
    .bind(destination)
    .bind(redirect_type)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn get_hits(pool: &PgPool, id: i64) -> i64 {
    sqlx::query_scalar("SELECT hits FROM redirects WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}
