//! In-process caching of redirect rules.
//!
//! - [`RedirectCache`] - TTL snapshot cache with a single-writer rebuild gate
//! - [`Clock`] - Injectable time source ([`SystemClock`], [`ManualClock`])

mod clock;
mod redirect_cache;

pub use clock::{Clock, ManualClock, SystemClock};
pub use redirect_cache::{CacheStats, REFRESH_RETRY_DELAY, RedirectCache, RedirectSnapshot};
