use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::config::Config;
use super::error::ConfigError;
use super::estimator::{Estimator, Policy};
use super::event::{Event, EventSink, UpdateCause};
use super::queue::{Fifo, Item, QueueState};
use super::random::{RandomSource, StreamRng};
use super::stats::Stats;

/// Classification of a rejected arrival.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The queue was full and the random draw did not select a probabilistic drop.
    ForcedDrop,
    /// The random draw fell within the current drop probability.
    ProbabilisticDrop,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ForcedDrop => "Forced drop",
            Self::ProbabilisticDrop => "Probabilistic drop",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`Controller::enqueue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdmitResult {
    Admitted,
    Rejected(DropReason),
}

impl AdmitResult {
    pub fn is_admitted(&self) -> bool {
        *self == Self::Admitted
    }
}

/// Admission controller for a single bottleneck queue.
///
/// Owns the storage queue, the estimator selected by configuration, a random source and an
/// event sink. Every call runs to completion; time is supplied by the caller and must not
/// decrease.
pub struct Controller<T, R = StreamRng, S = ()> {
    // Saved configuration
    config: Config,
    // Item storage
    queue: Fifo<T>,
    // Maintains the drop probability
    estimator: Policy,
    // Source of uniform samples for drop classification
    rng: R,
    // Receives structured events
    sink: S,
    // Counters for the current run
    stats: Stats,
}

impl<T> Controller<T>
where
    T: Item,
{
    /// Creates a controller seeded from `config.seed` and `config.stream`, discarding events.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let rng = StreamRng::new(config.seed, config.stream);
        Self::with_parts(config, rng, ())
    }
}

impl<T, S> Controller<T, StreamRng, S>
where
    T: Item,
    S: EventSink,
{
    /// Like [`Controller::new`], delivering events to `sink`.
    pub fn with_sink(config: Config, sink: S) -> Result<Self, ConfigError> {
        let rng = StreamRng::new(config.seed, config.stream);
        Self::with_parts(config, rng, sink)
    }
}

impl<T, R, S> Controller<T, R, S>
where
    T: Item,
    R: RandomSource,
    S: EventSink,
{
    pub fn with_parts(config: Config, rng: R, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;

        let estimator = Policy::new(&config.estimator, 0);

        info!(
            max_size = %config.max_size,
            estimator = estimator.name(),
            early_drop = config.early_drop,
            "initialized controller"
        );

        Ok(Self {
            queue: Fifo::new(config.max_size),
            estimator,
            rng,
            sink,
            stats: Stats::default(),
            config,
        })
    }

    /// Offers an arriving item to the queue.
    ///
    /// An item that would not fit is always rejected; the random draw only decides whether the
    /// rejection is reported as probabilistic or forced.
    pub fn enqueue(&mut self, item: T, now_ms: u64) -> AdmitResult {
        let size_bytes = item.size_bytes();
        self.stats.record_received(size_bytes);

        let state = self.queue.state();
        self.estimator.observe(&state);

        if state.occupancy >= state.capacity || !self.queue.fits(&item) {
            if let Some(previous) = self.estimator.on_overflow(now_ms) {
                self.emit_probability_change(now_ms, UpdateCause::Overflow, previous);
            }

            let drop_probability = self.estimator.drop_probability();
            let u = self.rng.next_uniform();

            let reason = if u <= drop_probability {
                DropReason::ProbabilisticDrop
            } else {
                DropReason::ForcedDrop
            };

            return self.reject(size_bytes, now_ms, reason, drop_probability);
        }

        if self.config.early_drop {
            let drop_probability = self.estimator.drop_probability();

            if drop_probability > 0.0 && self.rng.next_uniform() < drop_probability {
                return self.reject(
                    size_bytes,
                    now_ms,
                    DropReason::ProbabilisticDrop,
                    drop_probability,
                );
            }
        }

        if !self.queue.push(item) {
            // The capacity check above is stricter than the queue's own limit
            debug_assert!(false, "internal queue refused an item which fits");
            self.stats.internal_queue_drops += 1;
            return AdmitResult::Rejected(DropReason::ForcedDrop);
        }

        self.observe_queue();
        self.stats.record_admitted(size_bytes);
        self.sink.on_event(Event::Admitted { now_ms, size_bytes });

        trace!(
            packets = self.queue.len_packets(),
            bytes = self.queue.len_bytes(),
            "enqueued"
        );

        AdmitResult::Admitted
    }

    /// Removes the head item. An empty queue is reported to the estimator as an underflow.
    pub fn dequeue(&mut self, now_ms: u64) -> Option<T> {
        let Some(item) = self.queue.pop() else {
            trace!(now_ms, "queue empty");

            self.sink.on_event(Event::Underflow { now_ms });

            if let Some(previous) = self.estimator.on_underflow(now_ms) {
                self.emit_probability_change(now_ms, UpdateCause::Underflow, previous);
            }

            return None;
        };

        self.observe_queue();

        let size_bytes = item.size_bytes();
        self.stats.record_sent(size_bytes);
        self.sink.on_event(Event::Dequeued { now_ms, size_bytes });

        trace!(
            packets = self.queue.len_packets(),
            bytes = self.queue.len_bytes(),
            "dequeued"
        );

        Some(item)
    }

    pub fn peek(&self) -> Option<&T> {
        self.queue.peek()
    }

    /// Current drop probability, in [0, 1].
    pub fn drop_probability(&self) -> f64 {
        self.estimator.drop_probability()
    }

    /// Restarts the random source on the given stream. Returns the number of streams consumed.
    pub fn assign_stream(&mut self, stream: u64) -> u64 {
        self.rng.assign_stream(stream)
    }

    /// Restores the estimator's initial state, taking `now_ms` as the new start of run. Queued
    /// items and counters are kept.
    pub fn reset(&mut self, now_ms: u64) {
        self.estimator.reset(now_ms);
        self.observe_queue();
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn state(&self) -> QueueState {
        self.queue.state()
    }

    pub fn current_size(&self) -> usize {
        self.queue.current_size()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len_packets(&self) -> usize {
        self.queue.len_packets()
    }

    pub fn len_bytes(&self) -> usize {
        self.queue.len_bytes()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn estimator(&self) -> &Policy {
        &self.estimator
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    // Keeps occupancy-driven estimators in step with the queue between arrivals
    fn observe_queue(&mut self) {
        let state = self.queue.state();
        self.estimator.observe(&state);
    }

    fn reject(
        &mut self,
        size_bytes: usize,
        now_ms: u64,
        reason: DropReason,
        drop_probability: f64,
    ) -> AdmitResult {
        debug!(now_ms, %reason, drop_probability, "dropping packet");

        self.stats.record_drop(reason, size_bytes);
        self.sink.on_event(Event::Dropped {
            now_ms,
            size_bytes,
            reason,
            drop_probability,
        });

        AdmitResult::Rejected(reason)
    }

    fn emit_probability_change(&mut self, now_ms: u64, cause: UpdateCause, previous: f64) {
        self.sink.on_event(Event::ProbabilityChanged {
            now_ms,
            cause,
            previous,
            current: self.estimator.drop_probability(),
        });
    }
}
