//! Connection state machine
//!
//! Owns the transport handle, drives state transitions, reconnects with
//! backoff, and coordinates the queue, debouncer, presence cache, heartbeat,
//! and bus.

mod backoff;
mod client;

pub use client::SyncClient;

pub(crate) use client::ClientInner;
