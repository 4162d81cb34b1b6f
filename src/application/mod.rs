//! Application layer services implementing business logic.
//!
//! Services consume repository traits and provide a clean API for HTTP
//! handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::redirect_resolver::RedirectResolver`] - Request-time redirect matching over the snapshot cache
//! - [`services::redirect_service::RedirectService`] - Rule management and validation
//! - [`services::link_checker::LinkChecker`] - Broken destination scanner

pub mod services;
