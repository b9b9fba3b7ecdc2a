#![allow(dead_code)]

use blue_aqm::{BlueConfig, Config, EstimatorConfig, QueueSize, RandomSource, ThresholdConfig};

// Returns a fixed sample
pub struct Fixed(pub f64);

impl RandomSource for Fixed {
    fn next_uniform(&mut self) -> f64 {
        self.0
    }

    fn assign_stream(&mut self, _stream: u64) -> u64 {
        1
    }
}

pub fn packet(len: usize) -> Box<[u8]> {
    vec![0u8; len].into_boxed_slice()
}

pub fn assert_near(value: f64, expected: f64) {
    if (value - expected).abs() > 1e-9 {
        panic!("expected value near {}, found {}", expected, value);
    }
}

pub fn blue(
    max_size: QueueSize,
    increment: f64,
    decrement: f64,
    freeze_interval_ms: u64,
) -> Config {
    Config {
        max_size,
        estimator: EstimatorConfig::Blue(BlueConfig {
            increment,
            decrement,
            freeze_interval_ms,
            initial_probability: 0.0,
        }),
        ..Default::default()
    }
}

pub fn double_slope(max_size: QueueSize) -> Config {
    Config {
        max_size,
        estimator: EstimatorConfig::Threshold(ThresholdConfig::double_slope(
            5.0, 10.0, 15.0, 1.0, 0.5,
        )),
        ..Default::default()
    }
}
