//! Tracing and logging setup
//!
//! Configures the `tracing` subscriber with environment-based filtering.

mod tracing_setup;

pub use tracing_setup::{init_tracing, init_tracing_with_config, TracingConfig};
