// BLUE adjusts a single drop probability from one bit of feedback: the queue overflowed, or the
// link went idle with nothing to send. Either event moves the probability by a fixed step, at
// most once per freeze interval.

use tracing::debug;

use super::{Estimator, QueueState, UpdateCause};
use crate::config::BlueConfig;

#[derive(Clone, Debug)]
pub struct Blue {
    increment: f64,
    decrement: f64,
    freeze_interval_ms: u64,
    initial_probability: f64,
    drop_probability: f64,
    last_update_ms: u64,
}

impl Blue {
    /// Creates a new estimator whose freeze interval begins at `start_ms`.
    ///
    /// The configuration is assumed to have been validated.
    pub fn new(config: &BlueConfig, start_ms: u64) -> Self {
        Self {
            increment: config.increment,
            decrement: config.decrement,
            freeze_interval_ms: config.freeze_interval_ms,
            initial_probability: config.initial_probability,
            drop_probability: config.initial_probability,
            last_update_ms: start_ms,
        }
    }

    fn frozen(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_update_ms) < self.freeze_interval_ms
    }

    fn update(&mut self, now_ms: u64, cause: UpdateCause) -> Option<f64> {
        if self.frozen(now_ms) {
            // Too soon since the last adjustment
            return None;
        }

        let previous = self.drop_probability;

        self.drop_probability = match cause {
            UpdateCause::Overflow => (previous + self.increment).min(1.0),
            UpdateCause::Underflow => (previous - self.decrement).max(0.0),
        };
        self.last_update_ms = now_ms;

        debug!(
            now_ms,
            ?cause,
            previous,
            drop_probability = self.drop_probability,
            "updated drop probability"
        );

        Some(previous)
    }

    pub fn last_update_ms(&self) -> u64 {
        self.last_update_ms
    }
}

impl Estimator for Blue {
    fn observe(&mut self, _state: &QueueState) {}

    fn on_overflow(&mut self, now_ms: u64) -> Option<f64> {
        self.update(now_ms, UpdateCause::Overflow)
    }

    fn on_underflow(&mut self, now_ms: u64) -> Option<f64> {
        self.update(now_ms, UpdateCause::Underflow)
    }

    fn drop_probability(&self) -> f64 {
        self.drop_probability
    }

    fn reset(&mut self, now_ms: u64) {
        self.drop_probability = self.initial_probability;
        self.last_update_ms = now_ms;
    }
}
