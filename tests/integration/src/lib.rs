//! Integration test utilities for the synchronization client
//!
//! Provides a scripted in-memory transport and helpers for driving the
//! client through connect/disconnect/replay scenarios without a server.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
