//! Hit event model for asynchronous hit counting.

/// A served redirect, queued for hit counting.
///
/// Created by the resolver after a match and sent to a bounded channel with
/// `try_send`, so recording a hit never delays the redirect response.
/// Processed by [`crate::domain::hit_worker::run_hit_worker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitEvent {
    pub redirect_id: i64,
    pub source: String,
}

impl HitEvent {
    pub fn new(redirect_id: i64, source: impl Into<String>) -> Self {
        Self {
            redirect_id,
            source: source.into(),
        }
    }
}
