//! Business logic services for the application layer.

pub mod link_checker;
pub mod redirect_resolver;
pub mod redirect_service;

pub use link_checker::{LinkChecker, LinkReport, LinkStatus};
pub use redirect_resolver::{RedirectAction, RedirectResolver};
pub use redirect_service::{RedirectInput, RedirectService, RedirectUpdate};
