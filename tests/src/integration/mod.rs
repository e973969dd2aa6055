//! # Integration Tests
//!
//! Drive the engine through [`pprl_blocking::BlockingService`] the way a
//! linkage coordinator would: build every party, merge, assess.

pub mod multiparty;
pub mod properties;
pub mod scenarios;
