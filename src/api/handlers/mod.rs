//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod not_found;
pub mod redirect_check;
pub mod redirects;

pub use health::health_handler;
pub use not_found::not_found_handler;
pub use redirect_check::redirect_check_handler;
pub use redirects::{
    create_redirect_handler, delete_redirect_handler, get_redirect_handler,
    redirect_list_handler, update_redirect_handler,
};
