//! Reconnection backoff schedule

use rand::Rng;
use std::time::Duration;

use crate::config::ReconnectConfig;

/// Delay before the given dial attempt (1-based)
///
/// Exponential from the initial delay, capped, with up to 10% jitter so a
/// fleet of clients does not redial in lockstep after a server restart.
pub(crate) fn delay_for_attempt(config: &ReconnectConfig, attempt: u32) -> Duration {
    let initial = config.initial_delay_ms.max(1);
    let cap = config.max_delay_ms.max(initial);

    let exponent = attempt.saturating_sub(1).min(16);
    let base = initial.saturating_mul(1u64 << exponent).min(cap);

    let jitter = rand::thread_rng().gen_range(0..=base / 10);
    Duration::from_millis(base + jitter)
}
