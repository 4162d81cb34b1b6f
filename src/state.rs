//! Shared application state injected into every handler.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::middleware::auth::AdminToken;
use crate::application::services::{RedirectResolver, RedirectService};
use crate::domain::hit_event::HitEvent;
use crate::domain::repositories::RedirectRepository;

/// Services and channels shared across requests.
///
/// Cloning is cheap: every field is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub redirect_service: Arc<RedirectService<dyn RedirectRepository>>,
    pub resolver: Arc<RedirectResolver<dyn RedirectRepository>>,
    /// `None` disables the admin API.
    pub admin_token: Option<Arc<AdminToken>>,
    pub hit_sender: mpsc::Sender<HitEvent>,
}

impl AppState {
    pub fn new(
        redirect_service: Arc<RedirectService<dyn RedirectRepository>>,
        resolver: Arc<RedirectResolver<dyn RedirectRepository>>,
        admin_token: Option<&str>,
        hit_sender: mpsc::Sender<HitEvent>,
    ) -> Self {
        Self {
            redirect_service,
            resolver,
            admin_token: admin_token.map(|token| Arc::new(AdminToken::new(token))),
            hit_sender,
        }
    }
}
