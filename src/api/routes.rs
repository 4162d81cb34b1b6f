//! API route configuration.

use crate::api::handlers::{
    create_redirect_handler, delete_redirect_handler, get_redirect_handler, health_handler,
    redirect_check_handler, redirect_list_handler, update_redirect_handler,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Unauthenticated API routes.
///
/// # Endpoints
///
/// - `GET /redirect-check?path=` - Rule matching a path, or `null`
/// - `GET /health`               - Health check: DB, hit queue, redirect cache
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/redirect-check", get(redirect_check_handler))
        .route("/health", get(health_handler))
}

/// Admin routes, protected by Bearer token authentication
/// ([`crate::api::middleware::auth`]).
///
/// # Endpoints
///
/// - `GET    /redirects`       - List rules (`?active=` filter)
/// - `POST   /redirects`       - Create a rule
/// - `GET    /redirects/{id}`  - Fetch a rule
/// - `PATCH  /redirects/{id}`  - Partially update a rule
/// - `DELETE /redirects/{id}`  - Delete a rule
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/redirects",
            get(redirect_list_handler).post(create_redirect_handler),
        )
        .route(
            "/redirects/{id}",
            get(get_redirect_handler)
                .patch(update_redirect_handler)
                .delete(delete_redirect_handler),
        )
}
