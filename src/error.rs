/// Produced by [`Config::validate`](crate::config::Config::validate) when a configuration cannot
/// be used to build a controller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("max_size must not be zero")]
    ZeroCapacity,
    #[error("{name} must lie in (0, 1] (found: {value})")]
    RateOutOfRange { name: &'static str, value: f64 },
    #[error("{name} must lie in [0, 1] (found: {value})")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },
    #[error("{name} must be finite and non-negative (found: {value})")]
    InvalidThreshold { name: &'static str, value: f64 },
    #[error("thresholds must be strictly increasing (found: {thresholds:?})")]
    ThresholdsNotIncreasing { thresholds: Vec<f64> },
    #[error("gamma ({gamma}) must not exceed max_probability ({max_probability})")]
    SlopeInverted { max_probability: f64, gamma: f64 },
    #[error("unsupported queue topology: {0}")]
    UnsupportedTopology(String),
    #[error("invalid queue size {0:?}: expected a count followed by p, B, KB or MB")]
    InvalidQueueSize(String),
}
