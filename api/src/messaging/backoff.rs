use crate::config::ReconnectConfig;
use rand::Rng;
use std::time::Duration;

/// Exponential reconnect delay with optional jitter.
///
/// The un-jittered delay for attempt `k` is `initial * multiplier^k`, capped
/// at `max`. With jitter the delay is drawn uniformly from `[d/2, d]`.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial_ms: u64,
    max_ms: u64,
    multiplier: f64,
    jitter: bool,
    attempt: u32,
}

impl Backoff {
    pub fn new(config: &ReconnectConfig) -> Self {
        let initial_ms = config.initial_delay_ms.max(1);
        Self {
            initial_ms,
            max_ms: config.max_delay_ms.max(initial_ms),
            multiplier: if config.multiplier >= 1.0 { config.multiplier } else { 1.0 },
            jitter: config.jitter,
            attempt: 0,
        }
    }

    /// Delay before the next reconnect attempt.
    pub fn next_delay(&mut self) -> Duration {
        let base = self.base_ms();
        self.attempt = self.attempt.saturating_add(1);

        let ms = if self.jitter {
            rand::rng().random_range(base / 2..=base)
        } else {
            base
        };
        Duration::from_millis(ms)
    }

    /// Consecutive failures since the last [`reset`](Backoff::reset).
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    fn base_ms(&self) -> u64 {
        let exp = i32::try_from(self.attempt).unwrap_or(i32::MAX);
        let scaled = self.initial_ms as f64 * self.multiplier.powi(exp);
        scaled.min(self.max_ms as f64) as u64
    }
}
