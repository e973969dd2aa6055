//! Ports Layer
//!
//! Defines the driving port through which a coordinator builds, merges and
//! assesses blocks. The engine has no driven ports: parties hand over their
//! records and the merger runs on blocks already collected.

pub mod inbound;

pub use inbound::{BlockingApi, Dataset};
