//! DTOs for redirect rules: admin CRUD and the check endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::{RedirectInput, RedirectUpdate, redirect_service::MAX_PATH_LENGTH};
use crate::domain::entities::RedirectRule;

/// Status used when a create request omits `type`.
const DEFAULT_REDIRECT_TYPE: u16 = 301;

fn default_redirect_type() -> u16 {
    DEFAULT_REDIRECT_TYPE
}

fn default_true() -> bool {
    true
}

/// A redirect rule as exposed over HTTP.
///
/// ```json
/// {
///   "id": 1,
///   "source": "/old",
///   "destination": "/new",
///   "type": 301,
///   "isActive": true,
///   "hits": 42,
///   "createdAt": "2025-01-01T00:00:00Z",
///   "updatedAt": "2025-01-01T00:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RedirectDto {
    pub id: i64,
    pub source: String,
    pub destination: String,
    #[serde(rename = "type")]
    pub redirect_type: u16,
    pub is_active: bool,
    pub hits: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RedirectRule> for RedirectDto {
    fn from(rule: RedirectRule) -> Self {
        Self {
            id: rule.id,
            source: rule.source,
            destination: rule.destination,
            redirect_type: rule.kind.status_code(),
            is_active: rule.is_active,
            hits: rule.hits,
            created_at: rule.created_at,
            updated_at: rule.updated_at,
        }
    }
}

/// Response for `GET /api/redirect-check`.
///
/// `redirect` is `null` when nothing matches.
#[derive(Debug, Serialize, Deserialize)]
pub struct RedirectCheckResponse {
    pub redirect: Option<RedirectDto>,
}

/// Query string of `GET /api/redirect-check`.
#[derive(Debug, Deserialize)]
pub struct RedirectCheckQuery {
    pub path: Option<String>,
}

/// Query string of `GET /api/redirects`.
#[derive(Debug, Deserialize)]
pub struct ListRedirectsQuery {
    /// Filters by `isActive` when present.
    pub active: Option<bool>,
}

/// Response containing a list of rules.
#[derive(Debug, Serialize)]
pub struct RedirectListResponse {
    pub items: Vec<RedirectDto>,
}

/// Request body for `POST /api/redirects`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRedirectRequest {
    #[validate(length(min = 1, max = MAX_PATH_LENGTH))]
    pub source: String,

    /// Required for 301/302/307/308; ignored for 410/451.
    #[validate(length(max = MAX_PATH_LENGTH))]
    pub destination: Option<String>,

    #[serde(rename = "type", default = "default_redirect_type")]
    pub redirect_type: u16,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl From<CreateRedirectRequest> for RedirectInput {
    fn from(req: CreateRedirectRequest) -> Self {
        Self {
            source: req.source,
            destination: req.destination,
            status: req.redirect_type,
            is_active: req.is_active,
        }
    }
}

/// Request body for `PATCH /api/redirects/{id}`.
///
/// All fields are optional; only provided fields are changed. The source is
/// immutable: delete and recreate the rule to move it.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRedirectRequest {
    #[validate(length(max = MAX_PATH_LENGTH))]
    pub destination: Option<String>,

    #[serde(rename = "type")]
    pub redirect_type: Option<u16>,

    pub is_active: Option<bool>,
}

impl From<UpdateRedirectRequest> for RedirectUpdate {
    fn from(req: UpdateRedirectRequest) -> Self {
        Self {
            destination: req.destination,
            status: req.redirect_type,
            is_active: req.is_active,
        }
    }
}
