//! Handlers for redirect rule management endpoints.
//!
//! Every successful mutation invalidates the local redirect cache so the
//! change is visible to the next request on this instance.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::redirect::{
    CreateRedirectRequest, ListRedirectsQuery, RedirectDto, RedirectListResponse,
    UpdateRedirectRequest,
};
use crate::error::AppError;
use crate::state::AppState;

/// Lists redirect rules, newest first.
///
/// # Endpoint
///
/// `GET /api/redirects[?active=true|false]`
pub async fn redirect_list_handler(
    State(state): State<AppState>,
    Query(query): Query<ListRedirectsQuery>,
) -> Result<Json<RedirectListResponse>, AppError> {
    let rules = state.redirect_service.list(query.active).await?;

    Ok(Json(RedirectListResponse {
        items: rules.into_iter().map(RedirectDto::from).collect(),
    }))
}

/// Returns a single rule.
///
/// # Endpoint
///
/// `GET /api/redirects/{id}`
///
/// # Errors
///
/// Returns 404 if the rule does not exist.
pub async fn get_redirect_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<RedirectDto>, AppError> {
    let rule = state.redirect_service.get(id).await?;
    Ok(Json(rule.into()))
}

/// Creates a rule.
///
/// # Endpoint
///
/// `POST /api/redirects`
///
/// ```json
/// { "source": "/old", "destination": "/new", "type": 301, "isActive": true }
/// ```
///
/// `type` defaults to 301 and `isActive` to `true`.
///
/// # Errors
///
/// Returns 400 if the source, destination or type is invalid, or if the
/// destination leads back to the source.
/// Returns 409 if a rule with the same source exists.
pub async fn create_redirect_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateRedirectRequest>,
) -> Result<(StatusCode, Json<RedirectDto>), AppError> {
    payload.validate()?;

    let rule = state.redirect_service.create(payload.into()).await?;
    state.resolver.invalidate();

    tracing::info!(id = rule.id, source = %rule.source, "Redirect created");

    Ok((StatusCode::CREATED, Json(rule.into())))
}

/// Partially updates a rule.
///
/// # Endpoint
///
/// `PATCH /api/redirects/{id}`
///
/// Accepts any of `destination`, `type` and `isActive`. The merged rule is
/// validated as a whole, so switching to 410/451 clears the destination and
/// switching back requires one.
///
/// # Errors
///
/// Returns 400 if no field is given or the merged rule is invalid.
/// Returns 404 if the rule does not exist.
pub async fn update_redirect_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateRedirectRequest>,
) -> Result<Json<RedirectDto>, AppError> {
    payload.validate()?;

    let rule = state.redirect_service.update(id, payload.into()).await?;
    state.resolver.invalidate();

    tracing::info!(id = rule.id, source = %rule.source, "Redirect updated");

    Ok(Json(rule.into()))
}

/// Deletes a rule.
///
/// # Endpoint
///
/// `DELETE /api/redirects/{id}`
///
/// # Errors
///
/// Returns 404 if the rule does not exist.
pub async fn delete_redirect_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.redirect_service.delete(id).await?;
    state.resolver.invalidate();

    tracing::info!(id, "Redirect deleted");

    Ok(StatusCode::NO_CONTENT)
}
