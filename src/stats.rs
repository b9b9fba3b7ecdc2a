use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::controller::DropReason;

/// Counters accumulated by a controller over a run.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub received_packets: u64,
    pub received_bytes: u64,
    pub admitted_packets: u64,
    pub admitted_bytes: u64,
    pub sent_packets: u64,
    pub sent_bytes: u64,
    pub forced_drop_packets: u64,
    pub forced_drop_bytes: u64,
    pub probabilistic_drop_packets: u64,
    pub probabilistic_drop_bytes: u64,
    /// Items refused by the storage queue itself. Every over-capacity arrival is classified by
    /// the controller first, so this stays at zero.
    pub internal_queue_drops: u64,
}

impl Stats {
    pub fn dropped_packets(&self) -> u64 {
        self.forced_drop_packets + self.probabilistic_drop_packets + self.internal_queue_drops
    }

    pub fn dropped_bytes(&self) -> u64 {
        self.forced_drop_bytes + self.probabilistic_drop_bytes
    }

    pub fn drops(&self, reason: DropReason) -> u64 {
        match reason {
            DropReason::ForcedDrop => self.forced_drop_packets,
            DropReason::ProbabilisticDrop => self.probabilistic_drop_packets,
        }
    }

    pub(crate) fn record_received(&mut self, size_bytes: usize) {
        self.received_packets += 1;
        self.received_bytes += size_bytes as u64;
    }

    pub(crate) fn record_admitted(&mut self, size_bytes: usize) {
        self.admitted_packets += 1;
        self.admitted_bytes += size_bytes as u64;
    }

    pub(crate) fn record_sent(&mut self, size_bytes: usize) {
        self.sent_packets += 1;
        self.sent_bytes += size_bytes as u64;
    }

    pub(crate) fn record_drop(&mut self, reason: DropReason, size_bytes: usize) {
        match reason {
            DropReason::ForcedDrop => {
                self.forced_drop_packets += 1;
                self.forced_drop_bytes += size_bytes as u64;
            }
            DropReason::ProbabilisticDrop => {
                self.probabilistic_drop_packets += 1;
                self.probabilistic_drop_bytes += size_bytes as u64;
            }
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Packets/Bytes received: {} / {}",
            self.received_packets, self.received_bytes
        )?;
        writeln!(
            f,
            "Packets/Bytes enqueued: {} / {}",
            self.admitted_packets, self.admitted_bytes
        )?;
        writeln!(
            f,
            "Packets/Bytes dequeued: {} / {}",
            self.sent_packets, self.sent_bytes
        )?;
        writeln!(
            f,
            "Packets/Bytes dropped: {} / {}",
            self.dropped_packets(),
            self.dropped_bytes()
        )?;
        writeln!(
            f,
            "  {}: {} / {}",
            DropReason::ForcedDrop,
            self.forced_drop_packets,
            self.forced_drop_bytes
        )?;
        writeln!(
            f,
            "  {}: {} / {}",
            DropReason::ProbabilisticDrop,
            self.probabilistic_drop_packets,
            self.probabilistic_drop_bytes
        )?;
        write!(f, "  Queue full: {}", self.internal_queue_drops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals() {
        let mut stats = Stats::default();

        for size in [100, 200, 300] {
            stats.record_received(size);
        }
        stats.record_admitted(100);
        stats.record_drop(DropReason::ForcedDrop, 200);
        stats.record_drop(DropReason::ProbabilisticDrop, 300);
        stats.record_sent(100);

        assert_eq!(stats.received_bytes, 600);
        assert_eq!(stats.dropped_packets(), 2);
        assert_eq!(stats.dropped_bytes(), 500);
        assert_eq!(stats.drops(DropReason::ForcedDrop), 1);
        assert_eq!(stats.drops(DropReason::ProbabilisticDrop), 1);
        assert_eq!(stats.sent_bytes, 100);
    }

    #[test]
    fn report() {
        let mut stats = Stats::default();
        stats.record_received(512);
        stats.record_drop(DropReason::ProbabilisticDrop, 512);

        let report = stats.to_string();
        assert!(report.contains("Packets/Bytes received: 1 / 512"));
        assert!(report.contains("Probabilistic drop: 1 / 512"));
        assert!(report.contains("Forced drop: 0 / 0"));
        assert!(report.ends_with("Queue full: 0"));
    }
}
