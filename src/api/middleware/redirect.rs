//! Edge middleware applying redirect rules before normal routing.
//!
//! Runs in front of every route. `GET`/`HEAD` requests whose path matches an
//! active rule are answered here; everything else continues down the stack.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::application::services::RedirectAction;
use crate::domain::entities::RedirectKind;
use crate::state::AppState;
use crate::utils::request_host::request_host;

const LEGAL_REASONS_BODY: &str = "Unavailable For Legal Reasons";

/// Answers matched requests with the rule's status.
///
/// # Responses
///
/// - **301/302/307/308**: empty body, `Location` set to the destination
/// - **410 Gone**: empty body
/// - **451 Unavailable For Legal Reasons**: plain-text body
///
/// Unmatched, skipped and non-`GET`/`HEAD` requests pass through untouched, as
/// do all requests while the rule set cannot be loaded.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/api/health", get(health_handler))
///     .layer(middleware::from_fn_with_state(state.clone(), redirect::layer))
///     .with_state(state);
/// ```
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let host = request_host(req.headers());
    let action = st
        .resolver
        .apply(req.method(), req.uri().path(), host.as_deref())
        .await;

    match action_response(action) {
        Some(response) => response,
        None => next.run(req).await,
    }
}

/// Converts an action into the response that ends the request, or `None`
/// when the request should continue.
pub fn action_response(action: RedirectAction) -> Option<Response> {
    match action {
        RedirectAction::PassThrough => None,
        RedirectAction::Redirect {
            location,
            kind,
            rule_id,
        } => {
            let Ok(location_header) = HeaderValue::from_str(&location) else {
                warn!(rule_id, location, "Redirect destination is not a valid header value");
                return None;
            };

            debug!(rule_id, status = %kind, location, "Serving redirect");
            Some((status_for(kind), [(header::LOCATION, location_header)]).into_response())
        }
        RedirectAction::Terminal { kind, rule_id } => {
            debug!(rule_id, status = %kind, "Serving terminal rule");
            Some(match kind {
                RedirectKind::UnavailableForLegalReasons => {
                    (status_for(kind), LEGAL_REASONS_BODY).into_response()
                }
                _ => status_for(kind).into_response(),
            })
        }
    }
}

fn status_for(kind: RedirectKind) -> StatusCode {
    match kind {
        RedirectKind::MovedPermanently => StatusCode::MOVED_PERMANENTLY,
        RedirectKind::Found => StatusCode::FOUND,
        RedirectKind::TemporaryRedirect => StatusCode::TEMPORARY_REDIRECT,
        RedirectKind::PermanentRedirect => StatusCode::PERMANENT_REDIRECT,
        RedirectKind::Gone => StatusCode::GONE,
        RedirectKind::UnavailableForLegalReasons => StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS,
    }
}
