//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /api/redirect-check` - Rule lookup for a path (public)
//! - `GET  /api/health`         - Health check (public)
//! - `/api/redirects*`          - Admin API (Bearer token required)
//! - anything else              - Redirect rule or 404
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Redirects** - Matching `GET`/`HEAD` requests answered before routing
//! - **Rate limiting** - Per-IP token bucket on the admin API
//! - **Authentication** - Bearer token on the admin API
//!
//! Paths are not normalized here: the resolver needs to see trailing slashes
//! to try its candidate variants in order.

use crate::api;
use crate::api::handlers::not_found_handler;
use crate::api::middleware::{auth, rate_limit, redirect, tracing};
use crate::state::AppState;
use axum::{Router, middleware};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn app_router(state: AppState, behind_proxy: bool) -> Router {
    let admin_router = rate_limit::apply(
        api::routes::protected_routes()
            .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer)),
        behind_proxy,
    );

    let api_router = api::routes::public_routes().merge(admin_router);

    Router::new()
        .nest("/api", api_router)
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(state.clone(), redirect::layer))
        .with_state(state)
        .layer(tracing::layer())
}
