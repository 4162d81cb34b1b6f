//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx.
//!
//! - [`PgRedirectRepository`] - Redirect rule storage and hit counters

pub mod pg_redirect_repository;

pub use pg_redirect_repository::PgRedirectRepository;
