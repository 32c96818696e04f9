//! Integration test utilities
//!
//! Runs a real gateway on an ephemeral port over the in-memory store and
//! drives it with WebSocket clients.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
