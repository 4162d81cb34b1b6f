//! Domain layer containing business entities and logic.
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Data access trait definitions
//! - [`hit_event`] - Hit counting event model
//! - [`hit_worker`] - Asynchronous hit counter worker
//!
//! # Hit Counting Flow
//!
//! 1. The resolver matches a rule for a request
//! 2. A [`hit_event::HitEvent`] is offered to a bounded channel (never awaited)
//! 3. [`hit_worker::run_hit_worker`] increments the counter with retries
//! 4. Failures are logged; the redirect response is already gone

pub mod entities;
pub mod hit_event;
pub mod hit_worker;
pub mod repositories;
