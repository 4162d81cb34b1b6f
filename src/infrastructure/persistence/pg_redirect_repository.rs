//! PostgreSQL implementation of redirect repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewRedirect, RedirectKind, RedirectPatch, RedirectRule};
use crate::domain::repositories::RedirectRepository;
use crate::error::AppError;

const SELECT_COLUMNS: &str =
    "id, source, destination, redirect_type, is_active, hits, created_at, updated_at";

/// Raw `redirects` row as returned by SQLx.
#[derive(Debug, sqlx::FromRow)]
struct RedirectRow {
    id: i64,
    source: String,
    destination: String,
    redirect_type: i16,
    is_active: bool,
    hits: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RedirectRow> for RedirectRule {
    type Error = AppError;

    fn try_from(row: RedirectRow) -> Result<Self, Self::Error> {
        let kind = RedirectKind::try_from(row.redirect_type).map_err(|code| {
            AppError::internal(
                "Unsupported redirect type in storage",
                json!({ "id": row.id, "redirect_type": code }),
            )
        })?;

        Ok(RedirectRule::new(
            row.id,
            row.source,
            row.destination,
            kind,
            row.is_active,
            row.hits,
            row.created_at,
            row.updated_at,
        ))
    }
}

fn into_rules(rows: Vec<RedirectRow>) -> Result<Vec<RedirectRule>, AppError> {
    rows.into_iter().map(RedirectRule::try_from).collect()
}

/// PostgreSQL repository for redirect rules.
///
/// Queries are bound with SQLx parameters; no user input is interpolated.
pub struct PgRedirectRepository {
    pool: Arc<PgPool>,
}

impl PgRedirectRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RedirectRepository for PgRedirectRepository {
    async fn list_active(&self) -> Result<Vec<RedirectRule>, AppError> {
        let rows = sqlx::query_as::<_, RedirectRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM redirects WHERE is_active ORDER BY id"
        ))
        .fetch_all(self.pool.as_ref())
        .await?;

        into_rules(rows)
    }

    async fn list(&self, active: Option<bool>) -> Result<Vec<RedirectRule>, AppError> {
        let rows = sqlx::query_as::<_, RedirectRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM redirects \
             WHERE ($1::boolean IS NULL OR is_active = $1) \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(active)
        .fetch_all(self.pool.as_ref())
        .await?;

        into_rules(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RedirectRule>, AppError> {
        let row = sqlx::query_as::<_, RedirectRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM redirects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(RedirectRule::try_from).transpose()
    }

    async fn find_by_source(&self, source: &str) -> Result<Option<RedirectRule>, AppError> {
        let row = sqlx::query_as::<_, RedirectRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM redirects WHERE source = $1"
        ))
        .bind(source)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(RedirectRule::try_from).transpose()
    }

    async fn create(&self, new_redirect: NewRedirect) -> Result<RedirectRule, AppError> {
        let row = sqlx::query_as::<_, RedirectRow>(&format!(
            "INSERT INTO redirects (source, destination, redirect_type, is_active) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(&new_redirect.source)
        .bind(&new_redirect.destination)
        .bind(new_redirect.kind.status_code() as i16)
        .bind(new_redirect.is_active)
        .fetch_one(self.pool.as_ref())
        .await?;

        row.try_into()
    }

    async fn update(&self, id: i64, patch: RedirectPatch) -> Result<RedirectRule, AppError> {
        let row = sqlx::query_as::<_, RedirectRow>(&format!(
            "UPDATE redirects SET \
                destination   = COALESCE($2, destination), \
                redirect_type = COALESCE($3, redirect_type), \
                is_active     = COALESCE($4, is_active), \
                updated_at    = NOW() \
             WHERE id = $1 \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.destination)
        .bind(patch.kind.map(|kind| kind.status_code() as i16))
        .bind(patch.is_active)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(RedirectRule::try_from)
            .transpose()?
            .ok_or_else(|| AppError::not_found("Redirect not found", json!({ "id": id })))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM redirects WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_hits(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE redirects SET hits = hits + 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
