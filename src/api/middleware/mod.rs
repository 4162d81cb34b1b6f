//! HTTP middleware for request processing and protection.
//!
//! Provides admin authentication, rate limiting, the redirect edge layer and
//! observability middleware.

pub mod auth;
pub mod rate_limit;
pub mod redirect;
pub mod tracing;
