//! Service Layer
//!
//! Application service that drives the domain through the
//! [`crate::ports::BlockingApi`] port and records metrics.

pub mod blocking_service;

pub use blocking_service::{BlockingService, PARALLEL_THRESHOLD};
