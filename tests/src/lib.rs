//! # PPRL Blocking Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs        # Shared datasets, configs and log setup
//! └── integration/       # End-to-end blocking flows
//!     ├── scenarios.rs   # Reference scenarios for both algorithms
//!     ├── multiparty.rs  # K-of-N merging across more than two parties
//!     └── properties.rs  # Invariants over synthetic data
//!
//! benches/
//! └── blocking_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p pprl-tests
//!
//! # By category
//! cargo test -p pprl-tests integration::scenarios
//!
//! # With engine logs
//! RUST_LOG=pprl_blocking=debug cargo test -p pprl-tests -- --nocapture
//!
//! # Benchmarks
//! cargo bench -p pprl-tests
//! ```

pub mod fixtures;
pub mod integration;
