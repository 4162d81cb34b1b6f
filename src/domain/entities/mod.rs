//! Core domain entities.
//!
//! Entities are plain data structures; persistence and validation live in the
//! infrastructure and application layers.
//!
//! - [`RedirectRule`] - A stored redirect rule
//! - [`NewRedirect`] - Validated input for creating a rule
//! - [`RedirectPatch`] - Partial update of a rule
//! - [`RedirectKind`] - HTTP status semantics of a rule

pub mod redirect;

pub use redirect::{NewRedirect, RedirectKind, RedirectPatch, RedirectRule};
