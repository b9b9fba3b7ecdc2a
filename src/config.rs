#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::queue::QueueSize;

const BLUE_INCREMENT_DEFAULT: f64 = 0.0205;
const BLUE_DECREMENT_DEFAULT: f64 = 0.00025;
const BLUE_FREEZE_INTERVAL_DEFAULT_MS: u64 = 100;

const MIN_TH_DEFAULT: f64 = 5.0;
const MID_TH_DEFAULT: f64 = 10.0;
const MAX_TH_DEFAULT: f64 = 15.0;
const MAX_PROBABILITY_DEFAULT: f64 = 1.0;
const GAMMA_DEFAULT: f64 = 0.5;

const SEED_DEFAULT: u64 = 1;

/// Configuration for the BLUE estimator.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct BlueConfig {
    /// Amount added to the drop probability on overflow.
    ///
    /// Valid range: (0, 1] \
    /// Default value: 0.0205
    pub increment: f64,

    /// Amount subtracted from the drop probability on underflow.
    ///
    /// Valid range: (0, 1] \
    /// Default value: 0.00025
    pub decrement: f64,

    /// Minimum time between two adjustments of the drop probability, in milliseconds.
    ///
    /// Default value: 100
    pub freeze_interval_ms: u64,

    /// Drop probability at the start of a run.
    ///
    /// Valid range: [0, 1] \
    /// Default value: 0
    pub initial_probability: f64,
}

impl Default for BlueConfig {
    fn default() -> Self {
        Self {
            increment: BLUE_INCREMENT_DEFAULT,
            decrement: BLUE_DECREMENT_DEFAULT,
            freeze_interval_ms: BLUE_FREEZE_INTERVAL_DEFAULT_MS,
            initial_probability: 0.0,
        }
    }
}

impl BlueConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_rate("increment", self.increment)?;
        check_rate("decrement", self.decrement)?;
        check_probability("initial_probability", self.initial_probability)?;

        Ok(())
    }
}

/// Shape of the threshold estimator's ramp between `min_th` and `max_th`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Slope {
    /// One linear segment rising to `max_probability`.
    Single,
    /// Two segments split at `mid_th`; `gamma` scales the second one.
    Double { mid_th: f64, gamma: f64 },
}

/// Configuration for the threshold estimator. Thresholds are in the unit of the queue size.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct ThresholdConfig {
    /// Occupancy below which nothing is dropped.
    ///
    /// Default value: 5
    pub min_th: f64,

    /// Occupancy at and above which everything is dropped.
    ///
    /// Default value: 15
    pub max_th: f64,

    /// Valid range: [0, 1] \
    /// Default value: 1
    pub max_probability: f64,

    /// Default value: `Double { mid_th: 10, gamma: 0.5 }`
    pub slope: Slope,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::double_slope(
            MIN_TH_DEFAULT,
            MID_TH_DEFAULT,
            MAX_TH_DEFAULT,
            MAX_PROBABILITY_DEFAULT,
            GAMMA_DEFAULT,
        )
    }
}

impl ThresholdConfig {
    pub fn red(min_th: f64, max_th: f64, max_probability: f64) -> Self {
        Self {
            min_th,
            max_th,
            max_probability,
            slope: Slope::Single,
        }
    }

    pub fn double_slope(
        min_th: f64,
        mid_th: f64,
        max_th: f64,
        max_probability: f64,
        gamma: f64,
    ) -> Self {
        Self {
            min_th,
            max_th,
            max_probability,
            slope: Slope::Double { mid_th, gamma },
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_threshold("min_th", self.min_th)?;
        check_threshold("max_th", self.max_th)?;
        check_probability("max_probability", self.max_probability)?;

        match self.slope {
            Slope::Single => {
                if !(self.min_th < self.max_th) {
                    return Err(ConfigError::ThresholdsNotIncreasing {
                        thresholds: vec![self.min_th, self.max_th],
                    });
                }
            }
            Slope::Double { mid_th, gamma } => {
                check_threshold("mid_th", mid_th)?;
                check_probability("gamma", gamma)?;

                if !(self.min_th < mid_th && mid_th < self.max_th) {
                    return Err(ConfigError::ThresholdsNotIncreasing {
                        thresholds: vec![self.min_th, mid_th, self.max_th],
                    });
                }

                if gamma > self.max_probability {
                    return Err(ConfigError::SlopeInverted {
                        max_probability: self.max_probability,
                        gamma,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Selects and configures the congestion estimator.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
#[derive(Clone, Debug, PartialEq)]
pub enum EstimatorConfig {
    Blue(BlueConfig),
    Threshold(ThresholdConfig),
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self::Blue(Default::default())
    }
}

impl EstimatorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Blue(config) => config.validate(),
            Self::Threshold(config) => config.validate(),
        }
    }
}

/// Storage layout requested by the host. The controller supports only a single flat FIFO.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    /// Number of internal storage queues. Zero is provisioned as one.
    ///
    /// Default value: 1
    pub internal_queues: usize,

    /// Number of attached classes (child queues).
    ///
    /// Default value: 0
    pub classes: usize,

    /// Number of attached packet filters (classifiers).
    ///
    /// Default value: 0
    pub packet_filters: usize,
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            internal_queues: 1,
            classes: 0,
            packet_filters: 0,
        }
    }
}

impl Topology {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.classes > 0 {
            return Err(ConfigError::UnsupportedTopology(format!(
                "{} classes attached, none supported",
                self.classes
            )));
        }

        if self.packet_filters > 0 {
            return Err(ConfigError::UnsupportedTopology(format!(
                "{} packet filters attached, none supported",
                self.packet_filters
            )));
        }

        if self.internal_queues > 1 {
            return Err(ConfigError::UnsupportedTopology(format!(
                "{} internal queues requested, exactly one supported",
                self.internal_queues
            )));
        }

        Ok(())
    }
}

/// Configuration for a [`Controller`](crate::Controller) object.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Queue capacity, in packets or bytes.
    ///
    /// Minimum value: 1 \
    /// Default value: 100p
    pub max_size: QueueSize,

    /// Estimator variant and its parameters.
    ///
    /// Default value: BLUE with default parameters
    pub estimator: EstimatorConfig,

    /// Requested storage layout.
    pub topology: Topology,

    /// When set, arrivals below capacity are also dropped with the current drop probability.
    ///
    /// Default value: false
    pub early_drop: bool,

    /// Run seed for the random source.
    ///
    /// Default value: 1
    pub seed: u64,

    /// Stream index within the run seed.
    ///
    /// Default value: 0
    pub stream: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: Default::default(),
            estimator: Default::default(),
            topology: Default::default(),
            early_drop: false,
            seed: SEED_DEFAULT,
            stream: 0,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_size.value == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        self.topology.validate()?;
        self.estimator.validate()?;

        Ok(())
    }
}

fn check_rate(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::RateOutOfRange { name, value })
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}

fn check_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold { name, value })
    }
}
