mod common;

use blue_aqm::estimator::Threshold;
use blue_aqm::{
    AdmitResult, BlueConfig, Config, Controller, DropReason, EstimatorConfig, Event, QueueSize,
    ThresholdConfig, UpdateCause,
};
use common::*;

#[test]
fn overflow_raises_probability() {
    let config = blue(QueueSize::packets(100), 0.02, 0.002, 100);
    let mut ctl = Controller::with_sink(config, Vec::<Event>::new()).unwrap();

    for _ in 0..100 {
        assert!(ctl.enqueue(packet(512), 0).is_admitted());
    }

    // Hold the queue full for one second, with arrivals every 50 ms. Only those at least 100 ms
    // after the previous adjustment count.
    for i in 1..=20 {
        let result = ctl.enqueue(packet(512), i * 50);
        assert!(!result.is_admitted());
    }

    assert_eq!(ctl.current_size(), 100);
    assert!((ctl.drop_probability() - 0.2).abs() < 1e-9);

    let updates = ctl
        .sink()
        .iter()
        .filter(|e| {
            matches!(
                e,
                Event::ProbabilityChanged {
                    cause: UpdateCause::Overflow,
                    ..
                }
            )
        })
        .count();
    assert_eq!(updates, 10);

    let stats = ctl.stats();
    assert_eq!(stats.forced_drop_packets + stats.probabilistic_drop_packets, 20);
    assert_eq!(stats.internal_queue_drops, 0);
}

#[test]
fn underflow_lowers_probability() {
    let config = Config {
        max_size: QueueSize::packets(100),
        estimator: EstimatorConfig::Blue(BlueConfig {
            increment: 0.02,
            decrement: 0.002,
            freeze_interval_ms: 100,
            initial_probability: 0.5,
        }),
        ..Default::default()
    };
    let mut ctl: Controller<Box<[u8]>> = Controller::new(config).unwrap();

    for n in 1..=50u64 {
        assert!(ctl.dequeue(n * 100).is_none());
        assert_near(ctl.drop_probability(), 0.5 - 0.002 * n as f64);
    }

    // Keeps decreasing down to zero, not below
    for n in 51..=400u64 {
        assert!(ctl.dequeue(n * 100).is_none());
    }
    assert_eq!(ctl.drop_probability(), 0.0);
}

#[test]
fn double_slope_values() {
    let th = Threshold::new(&ThresholdConfig::double_slope(5.0, 10.0, 15.0, 1.0, 0.5));

    assert_near(th.probability(5.0), 0.0);
    assert_near(th.probability(10.0), 0.5);
    assert_near(th.probability(15.0), 1.0);
    assert_near(th.probability(7.5), 0.25);
    assert_near(th.probability(12.5), 0.75);
}

#[test]
fn double_slope_through_controller() {
    let mut ctl = Controller::with_parts(double_slope(QueueSize::packets(50)), Fixed(0.5), ())
        .unwrap();

    let expected = [
        (5, 0.0),
        (6, 0.1),
        (10, 0.5),
        (11, 0.6),
        (14, 0.9),
        (15, 1.0),
        (30, 1.0),
    ];

    let mut queued = 0;
    for (occupancy, p) in expected {
        while queued < occupancy {
            assert!(ctl.enqueue(packet(64), 0).is_admitted());
            queued += 1;
        }

        assert_near(ctl.drop_probability(), p);
    }

    // Draining walks back down the same curve
    for (occupancy, p) in expected.iter().rev().skip(1) {
        while queued > *occupancy {
            assert!(ctl.dequeue(1).is_some());
            queued -= 1;
        }

        assert_near(ctl.drop_probability(), *p);
    }

    while ctl.dequeue(2).is_some() {}
    assert_eq!(ctl.drop_probability(), 0.0);
}

#[test]
fn full_queue_always_rejects() {
    for u in [0.0, 0.1, 0.5, 0.999_999] {
        let config = Config {
            estimator: EstimatorConfig::Blue(BlueConfig {
                initial_probability: 0.5,
                ..Default::default()
            }),
            ..blue(QueueSize::packets(10), 0.02, 0.002, 100)
        };
        let mut ctl = Controller::with_parts(config, Fixed(u), ()).unwrap();

        for _ in 0..10 {
            assert!(ctl.enqueue(packet(100), 0).is_admitted());
        }

        let expected = if u <= 0.5 {
            DropReason::ProbabilisticDrop
        } else {
            DropReason::ForcedDrop
        };

        for t in 0..5 {
            assert_eq!(ctl.enqueue(packet(100), t), AdmitResult::Rejected(expected));
            assert_eq!(ctl.current_size(), 10);
        }
    }
}

#[test]
fn full_byte_queue_always_rejects() {
    for u in [0.0, 0.999_999] {
        let mut ctl =
            Controller::with_parts(blue(QueueSize::bytes(1024), 0.5, 0.5, 0), Fixed(u), ())
                .unwrap();

        assert!(ctl.enqueue(packet(1024), 0).is_admitted());

        for size in [0, 1, 1024] {
            assert!(!ctl.enqueue(packet(size), 1).is_admitted());
        }

        assert_eq!(ctl.current_size(), 1024);
        assert_eq!(ctl.stats().internal_queue_drops, 0);
    }
}

#[test]
fn dequeue_drains_in_order() {
    let mut ctl: Controller<Vec<u8>> = Controller::new(Config::default()).unwrap();

    for i in 0..5u8 {
        assert!(ctl.enqueue(vec![i; 1 + i as usize], 0).is_admitted());
    }

    assert_eq!(ctl.peek(), Some(&vec![0u8]));

    for i in 0..5u8 {
        assert_eq!(ctl.dequeue(1), Some(vec![i; 1 + i as usize]));
    }

    assert_eq!(ctl.dequeue(1), None);
    assert!(ctl.is_empty());
    assert_eq!(ctl.stats().sent_packets, 5);
    assert_eq!(ctl.stats().sent_bytes, 15);
}

#[test]
fn streams_are_reproducible() {
    let run = |stream: u64| {
        let config = Config {
            estimator: EstimatorConfig::Blue(BlueConfig {
                initial_probability: 0.5,
                ..Default::default()
            }),
            ..blue(QueueSize::packets(1), 0.02, 0.002, 100)
        };
        let mut ctl = Controller::with_sink(config, Vec::<Event>::new()).unwrap();
        assert_eq!(ctl.assign_stream(stream), 1);

        let _ = ctl.enqueue(packet(1), 0);
        (0..200)
            .map(|_| ctl.enqueue(packet(1), 0))
            .collect::<Vec<_>>()
    };

    assert_eq!(run(4), run(4));
    assert_ne!(run(4), run(5));

    let outcomes = run(4);
    let probabilistic = outcomes
        .iter()
        .filter(|r| **r == AdmitResult::Rejected(DropReason::ProbabilisticDrop))
        .count();

    // Roughly half, at p = 0.5
    assert!(probabilistic > 60 && probabilistic < 140);
}
