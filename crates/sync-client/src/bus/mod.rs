//! Event bus

mod event_bus;

pub use event_bus::{EventBus, DEFAULT_BUS_CAPACITY};
