mod blue;
mod threshold;

use super::config::EstimatorConfig;
use super::event::UpdateCause;
use super::queue::QueueState;

pub use blue::Blue;
pub use threshold::Threshold;

/// A congestion estimator maintains the drop probability consulted by the controller.
pub trait Estimator {
    /// Called with the queue state on every arrival, before any capacity check, and again
    /// whenever occupancy changes or the estimator is reset.
    fn observe(&mut self, state: &QueueState);

    /// Called when an arrival finds the queue full. Returns the previous probability if an
    /// adjustment was made.
    fn on_overflow(&mut self, now_ms: u64) -> Option<f64>;

    /// Called when a dequeue attempt finds the queue empty. Returns the previous probability if an
    /// adjustment was made.
    fn on_underflow(&mut self, now_ms: u64) -> Option<f64>;

    /// Current drop probability, always in [0, 1].
    fn drop_probability(&self) -> f64;

    /// Restores the initial state, with `now_ms` as the new start of run.
    fn reset(&mut self, now_ms: u64);
}

/// The estimator variant selected by configuration.
#[derive(Clone, Debug)]
pub enum Policy {
    Blue(Blue),
    Threshold(Threshold),
}

impl Policy {
    pub fn new(config: &EstimatorConfig, start_ms: u64) -> Self {
        match config {
            EstimatorConfig::Blue(config) => Self::Blue(Blue::new(config, start_ms)),
            EstimatorConfig::Threshold(config) => Self::Threshold(Threshold::new(config)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Blue(_) => "blue",
            Self::Threshold(_) => "threshold",
        }
    }
}

impl Estimator for Policy {
    fn observe(&mut self, state: &QueueState) {
        match self {
            Self::Blue(e) => e.observe(state),
            Self::Threshold(e) => e.observe(state),
        }
    }

    fn on_overflow(&mut self, now_ms: u64) -> Option<f64> {
        match self {
            Self::Blue(e) => e.on_overflow(now_ms),
            Self::Threshold(e) => e.on_overflow(now_ms),
        }
    }

    fn on_underflow(&mut self, now_ms: u64) -> Option<f64> {
        match self {
            Self::Blue(e) => e.on_underflow(now_ms),
            Self::Threshold(e) => e.on_underflow(now_ms),
        }
    }

    fn drop_probability(&self) -> f64 {
        match self {
            Self::Blue(e) => e.drop_probability(),
            Self::Threshold(e) => e.drop_probability(),
        }
    }

    fn reset(&mut self, now_ms: u64) {
        match self {
            Self::Blue(e) => e.reset(now_ms),
            Self::Threshold(e) => e.reset(now_ms),
        }
    }
}
