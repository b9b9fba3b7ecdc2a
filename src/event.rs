use std::collections::VecDeque;

use super::controller::DropReason;

/// Which feedback signal triggered an estimator adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateCause {
    /// An arrival found the queue full.
    Overflow,
    /// A dequeue attempt found the queue empty.
    Underflow,
}

/// Represents a controller event.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Produced when an item has been stored in the queue.
    Admitted { now_ms: u64, size_bytes: usize },
    /// Produced when an arriving item has been rejected.
    Dropped {
        now_ms: u64,
        size_bytes: usize,
        reason: DropReason,
        drop_probability: f64,
    },
    /// Produced when an item has left the queue.
    Dequeued { now_ms: u64, size_bytes: usize },
    /// Produced when a dequeue attempt found the queue empty.
    Underflow { now_ms: u64 },
    /// Produced when the estimator adjusted its drop probability.
    ProbabilityChanged {
        now_ms: u64,
        cause: UpdateCause,
        previous: f64,
        current: f64,
    },
}

/// Receives controller events as they happen.
pub trait EventSink {
    fn on_event(&mut self, event: Event);
}

/// Discards all events.
impl EventSink for () {
    fn on_event(&mut self, _event: Event) {}
}

impl EventSink for Vec<Event> {
    fn on_event(&mut self, event: Event) {
        self.push(event);
    }
}

impl EventSink for VecDeque<Event> {
    fn on_event(&mut self, event: Event) {
        self.push_back(event);
    }
}
