//! Background worker that persists redirect hit counters.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info};

use crate::domain::hit_event::HitEvent;
use crate::domain::repositories::RedirectRepository;

/// Attempts per hit, including the first one.
const MAX_ATTEMPTS: usize = 3;

/// Drains the hit queue until every sender is dropped.
///
/// Each event is handled in its own task, at most `concurrency` at a time.
/// Increments are retried with jittered exponential backoff; a hit that still
/// fails is logged and counted, never surfaced to a request.
pub async fn run_hit_worker<R>(
    mut rx: mpsc::Receiver<HitEvent>,
    repository: Arc<R>,
    concurrency: usize,
) where
    R: RedirectRepository + ?Sized + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let repository = repository.clone();
        tokio::spawn(async move {
            record_hit(repository.as_ref(), &event).await;
            drop(permit);
        });
    }

    info!("Hit queue closed, worker stopping");
}

/// Increments the hit counter for one event with retries.
pub async fn record_hit<R>(repository: &R, event: &HitEvent)
where
    R: RedirectRepository + ?Sized,
{
    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(std::time::Duration::from_millis(500))
        .map(jitter)
        .take(MAX_ATTEMPTS - 1);

    let result = Retry::start(strategy, || repository.increment_hits(event.redirect_id)).await;

    match result {
        Ok(()) => debug!("Hit recorded for redirect {} ({})", event.redirect_id, event.source),
        Err(e) => {
            metrics::counter!("redirect_hits_failed_total").increment(1);
            error!(
                "Failed to record hit for redirect {} ({}): {}",
                event.redirect_id, event.source, e
            );
        }
    }
}
