//! Fallback for requests no route and no redirect rule claimed.

use serde_json::json;

use crate::error::AppError;

/// Responds `404 Not Found` with the standard error body.
pub async fn not_found_handler() -> AppError {
    AppError::not_found("Not found", json!({}))
}
