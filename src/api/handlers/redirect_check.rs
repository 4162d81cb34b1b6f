//! Handler for the redirect check endpoint.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use tracing::debug;

use crate::api::dto::redirect::{RedirectCheckQuery, RedirectCheckResponse};
use crate::state::AppState;

/// Looks up the rule that applies to a path.
///
/// # Endpoint
///
/// `GET /api/redirect-check?path=/old-page`
///
/// # Behavior
///
/// - Anything after `?` or `#` in `path` is ignored
/// - A missing, empty or unparseable `path` yields `{"redirect": null}`
/// - Rules whose destination leads back to `path` yield `null`
/// - A match records a hit
///
/// Never fails: lookup errors fall back to the cached or an empty rule set.
///
/// # Response
///
/// ```json
/// { "redirect": { "id": 1, "source": "/old-page", "destination": "/new-page", "type": 301, ... } }
/// ```
pub async fn redirect_check_handler(
    State(state): State<AppState>,
    query: Result<Query<RedirectCheckQuery>, QueryRejection>,
) -> Json<RedirectCheckResponse> {
    let path = match query {
        Ok(Query(RedirectCheckQuery { path: Some(path) })) => path,
        Ok(_) => return Json(RedirectCheckResponse { redirect: None }),
        Err(rejection) => {
            debug!("Ignoring malformed redirect check query: {}", rejection);
            return Json(RedirectCheckResponse { redirect: None });
        }
    };

    let path = strip_query_and_fragment(&path).trim();
    if path.is_empty() {
        return Json(RedirectCheckResponse { redirect: None });
    }

    let redirect = state.resolver.check(path).await.map(Into::into);
    Json(RedirectCheckResponse { redirect })
}

fn strip_query_and_fragment(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or_default()
}
