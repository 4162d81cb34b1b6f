//! Utility functions for path handling and request inspection.
//!
//! - [`path`] - Path normalization, lookup candidates and skip rules
//! - [`destination`] - Redirect destination parsing and loop detection
//! - [`request_host`] - Host extraction from HTTP headers

pub mod destination;
pub mod path;
pub mod request_host;
