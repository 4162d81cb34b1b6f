//! Redirect rule management service.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::json;

use crate::domain::entities::{NewRedirect, RedirectKind, RedirectPatch, RedirectRule};
use crate::domain::repositories::RedirectRepository;
use crate::error::AppError;
use crate::utils::destination::Destination;
use crate::utils::path::{normalize_path, same_target, should_skip};

/// Longest accepted source or destination.
pub const MAX_PATH_LENGTH: u64 = 2048;

/// A normalized source path: no whitespace, query string or fragment.
static SOURCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/[^\s?#]*$").expect("source regex is valid"));

/// Unvalidated input for a new rule.
#[derive(Debug, Clone)]
pub struct RedirectInput {
    pub source: String,
    pub destination: Option<String>,
    pub status: u16,
    pub is_active: bool,
}

/// Unvalidated partial update.
#[derive(Debug, Clone, Default)]
pub struct RedirectUpdate {
    pub destination: Option<String>,
    pub status: Option<u16>,
    pub is_active: Option<bool>,
}

/// Service for creating, listing, updating and deleting redirect rules.
///
/// Enforces the storage invariants before anything reaches the repository:
/// canonical source paths, safe destinations, supported status codes, and no
/// rule whose destination leads back to its own source.
pub struct RedirectService<R: RedirectRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: RedirectRepository + ?Sized> RedirectService<R> {
    /// Creates a new redirect service.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Creates a rule.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the source, destination or status
    /// is invalid, or if the destination loops back to the source.
    /// Returns [`AppError::Conflict`] if a rule with the same source exists.
    pub async fn create(&self, input: RedirectInput) -> Result<RedirectRule, AppError> {
        let source = validate_source(&input.source)?;
        let kind = parse_kind(input.status)?;
        let destination = validate_destination(&source, input.destination.as_deref(), kind)?;

        if self.repository.find_by_source(&source).await?.is_some() {
            return Err(AppError::conflict(
                "Redirect source already exists",
                json!({ "source": source }),
            ));
        }

        self.repository
            .create(NewRedirect {
                source,
                destination,
                kind,
                is_active: input.is_active,
            })
            .await
    }

    /// Lists rules, optionally filtered by active state.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list(&self, active: Option<bool>) -> Result<Vec<RedirectRule>, AppError> {
        self.repository.list(active).await
    }

    /// Retrieves a rule by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no rule has this id.
    pub async fn get(&self, id: i64) -> Result<RedirectRule, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Redirect not found", json!({ "id": id })))
    }

    /// Looks up a rule by source path; the path is normalized first.
    pub async fn find_by_source(&self, source: &str) -> Result<Option<RedirectRule>, AppError> {
        self.repository.find_by_source(&normalize_path(source)).await
    }

    /// Applies a partial update.
    ///
    /// The merged rule is validated as a whole: switching a rule to 410 clears
    /// its destination, and switching a 410 rule to a redirect requires one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no rule has this id.
    /// Returns [`AppError::Validation`] if the update is empty or invalid.
    pub async fn update(&self, id: i64, update: RedirectUpdate) -> Result<RedirectRule, AppError> {
        if update.destination.is_none() && update.status.is_none() && update.is_active.is_none() {
            return Err(AppError::bad_request(
                "Nothing to update",
                json!({ "fields": ["destination", "type", "isActive"] }),
            ));
        }

        let existing = self.get(id).await?;

        let kind = match update.status {
            Some(status) => parse_kind(status)?,
            None => existing.kind,
        };

        let mut patch = RedirectPatch {
            kind: update.status.map(|_| kind),
            is_active: update.is_active,
            ..Default::default()
        };

        if update.destination.is_some() || update.status.is_some() {
            let destination = update
                .destination
                .as_deref()
                .unwrap_or(&existing.destination);
            let destination = validate_destination(&existing.source, Some(destination), kind)?;
            if destination != existing.destination {
                patch.destination = Some(destination);
            }
        }

        self.repository.update(id, patch).await
    }

    /// Deletes a rule.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no rule has this id.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::not_found(
                "Redirect not found",
                json!({ "id": id }),
            ))
        }
    }

    /// Checks repository connectivity.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the store is unreachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }
}

fn parse_kind(status: u16) -> Result<RedirectKind, AppError> {
    RedirectKind::try_from(status).map_err(|code| {
        AppError::bad_request(
            "Unsupported redirect type",
            json!({
                "type": code,
                "allowed": RedirectKind::ALL.map(RedirectKind::status_code),
            }),
        )
    })
}

/// Normalizes and checks a source path.
fn validate_source(source: &str) -> Result<String, AppError> {
    let source = normalize_path(source);

    if source.len() as u64 > MAX_PATH_LENGTH {
        return Err(AppError::bad_request(
            "Source path is too long",
            json!({ "max": MAX_PATH_LENGTH }),
        ));
    }

    if !SOURCE_REGEX.is_match(&source) {
        return Err(AppError::bad_request(
            "Invalid source path",
            json!({ "source": source, "hint": "No whitespace, query string or fragment" }),
        ));
    }

    if should_skip(&source) {
        return Err(AppError::bad_request(
            "Source path is never redirected",
            json!({
                "source": source,
                "hint": "Framework, API, favicon and SEO paths and paths containing a dot are served directly",
            }),
        ));
    }

    Ok(source)
}

/// Normalizes a destination for `kind`, rejecting self-loops.
///
/// Terminal kinds (410, 451) never carry a destination.
fn validate_destination(
    source: &str,
    destination: Option<&str>,
    kind: RedirectKind,
) -> Result<String, AppError> {
    if !kind.is_redirect() {
        return Ok(String::new());
    }

    let raw = destination.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(AppError::bad_request(
            "Destination is required for redirects",
            json!({ "type": kind.status_code() }),
        ));
    }

    if raw.len() as u64 > MAX_PATH_LENGTH {
        return Err(AppError::bad_request(
            "Destination is too long",
            json!({ "max": MAX_PATH_LENGTH }),
        ));
    }

    let parsed = Destination::parse(raw).map_err(|e| {
        AppError::bad_request("Invalid destination", json!({ "reason": e.to_string() }))
    })?;

    if let Destination::Path(path) = &parsed
        && same_target(source, path)
    {
        return Err(AppError::bad_request(
            "Source and destination must differ",
            json!({ "source": source, "destination": path }),
        ));
    }

    Ok(parsed.as_location().to_string())
}
