use tracing::trace;

use super::{Estimator, QueueState};
use crate::config::{Slope, ThresholdConfig};

/// Piecewise-linear mapping from average occupancy to drop probability.
///
/// With [`Slope::Single`] this is the classic RED ramp:
///
/// ```text
///   0                                          avg <  min_th
///   max_p * (avg - min_th) / (max_th - min_th)  min_th <= avg < max_th
///   1                                          avg >= max_th
/// ```
///
/// [`Slope::Double`] splits the ramp at `mid_th` into two segments with independent slopes:
///
/// ```text
///   alpha = (max_p - gamma) / (mid_th - min_th)
///   beta  = gamma / (max_th - mid_th)
///
///   0                                 avg <  min_th
///   alpha * (avg - min_th)            min_th <= avg < mid_th
///   (1 - gamma) + beta * (avg - mid)  mid_th <= avg < max_th
///   1                                 avg >= max_th
/// ```
///
/// A boundary value always belongs to the segment above it.
#[derive(Clone, Debug)]
pub struct Threshold {
    min_th: f64,
    max_th: f64,
    max_probability: f64,
    slope: Slope,
    average: f64,
}

impl Threshold {
    /// The configuration is assumed to have been validated.
    pub fn new(config: &ThresholdConfig) -> Self {
        Self {
            min_th: config.min_th,
            max_th: config.max_th,
            max_probability: config.max_probability,
            slope: config.slope,
            average: 0.0,
        }
    }

    pub fn probability(&self, avg: f64) -> f64 {
        if avg < self.min_th {
            return 0.0;
        }

        if avg >= self.max_th {
            return 1.0;
        }

        match self.slope {
            Slope::Single => {
                self.max_probability * (avg - self.min_th) / (self.max_th - self.min_th)
            }
            Slope::Double { mid_th, gamma } => {
                if avg < mid_th {
                    let alpha = (self.max_probability - gamma) / (mid_th - self.min_th);
                    alpha * (avg - self.min_th)
                } else {
                    let beta = gamma / (self.max_th - mid_th);
                    (1.0 - gamma) + beta * (avg - mid_th)
                }
            }
        }
    }

    /// Occupancy most recently observed.
    pub fn average(&self) -> f64 {
        self.average
    }
}

impl Estimator for Threshold {
    fn observe(&mut self, state: &QueueState) {
        // No smoothing: the average tracks instantaneous occupancy
        self.average = state.occupancy as f64;

        trace!(average = self.average, "observed occupancy");
    }

    fn on_overflow(&mut self, _now_ms: u64) -> Option<f64> {
        None
    }

    fn on_underflow(&mut self, _now_ms: u64) -> Option<f64> {
        None
    }

    fn drop_probability(&self) -> f64 {
        self.probability(self.average)
    }

    fn reset(&mut self, _now_ms: u64) {
        self.average = 0.0;
    }
}
