use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Unit in which queue occupancy and capacity are measured.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeUnit {
    Packets,
    Bytes,
}

/// A queue size tagged with its unit.
///
/// Parses from and prints as a count followed by a suffix: `"100p"` for packets, `"51200B"` for
/// bytes. `KB` and `MB` (powers of 1000) are accepted when parsing byte sizes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueSize {
    pub unit: SizeUnit,
    pub value: usize,
}

impl QueueSize {
    pub const fn packets(value: usize) -> Self {
        Self {
            unit: SizeUnit::Packets,
            value,
        }
    }

    pub const fn bytes(value: usize) -> Self {
        Self {
            unit: SizeUnit::Bytes,
            value,
        }
    }
}

impl Default for QueueSize {
    fn default() -> Self {
        Self::packets(100)
    }
}

impl fmt::Display for QueueSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            SizeUnit::Packets => write!(f, "{}p", self.value),
            SizeUnit::Bytes => write!(f, "{}B", self.value),
        }
    }
}

impl FromStr for QueueSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, suffix) = trimmed.split_at(split);

        let invalid = || ConfigError::InvalidQueueSize(s.to_owned());

        let count: usize = digits.parse().map_err(|_| invalid())?;

        let (unit, multiplier) = match suffix {
            "p" => (SizeUnit::Packets, 1),
            "B" => (SizeUnit::Bytes, 1),
            "KB" => (SizeUnit::Bytes, 1_000),
            "MB" => (SizeUnit::Bytes, 1_000_000),
            _ => return Err(invalid()),
        };

        let value = count.checked_mul(multiplier).ok_or_else(invalid)?;

        Ok(Self { unit, value })
    }
}

impl TryFrom<String> for QueueSize {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<QueueSize> for String {
    fn from(size: QueueSize) -> Self {
        size.to_string()
    }
}

/// An opaque queued unit. Only its size is ever inspected.
pub trait Item {
    fn size_bytes(&self) -> usize;
}

impl Item for Box<[u8]> {
    fn size_bytes(&self) -> usize {
        self.len()
    }
}

impl Item for Vec<u8> {
    fn size_bytes(&self) -> usize {
        self.len()
    }
}

/// Read-only snapshot of queue occupancy handed to estimators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueState {
    pub occupancy: usize,
    pub capacity: usize,
    pub unit: SizeUnit,
}

impl QueueState {
    pub fn is_empty(&self) -> bool {
        self.occupancy == 0
    }
}

/// Plain FIFO storage with a hard ceiling.
///
/// Drop policy lives in the controller; the ceiling here only backs up the controller's own
/// capacity check, and a rejected push is reported to the caller as an internal queue drop.
pub struct Fifo<T> {
    items: VecDeque<T>,
    limit: QueueSize,
    // Sum of item sizes
    len_bytes: usize,
    // Occupancy charged against the limit
    len_units: usize,
}

impl<T> Fifo<T>
where
    T: Item,
{
    pub fn new(limit: QueueSize) -> Self {
        Self {
            items: VecDeque::new(),
            limit,
            len_bytes: 0,
            len_units: 0,
        }
    }

    /// Occupancy cost of `item` in the configured unit. An empty item costs one byte, so that a
    /// byte-limited queue also bounds the number of items it holds.
    pub fn units_of(&self, item: &T) -> usize {
        match self.limit.unit {
            SizeUnit::Packets => 1,
            SizeUnit::Bytes => item.size_bytes().max(1),
        }
    }

    /// Returns true if `item` could be pushed without exceeding the limit.
    pub fn fits(&self, item: &T) -> bool {
        self.current_size()
            .checked_add(self.units_of(item))
            .map_or(false, |size| size <= self.limit.value)
    }

    pub fn push(&mut self, item: T) -> bool {
        if !self.fits(&item) {
            return false;
        }

        self.len_units += self.units_of(&item);
        self.len_bytes += item.size_bytes();
        self.items.push_back(item);

        return true;
    }

    pub fn pop(&mut self) -> Option<T> {
        let item = self.items.pop_front()?;

        let units = self.units_of(&item);

        debug_assert!(self.len_bytes >= item.size_bytes());
        debug_assert!(self.len_units >= units);
        self.len_bytes -= item.size_bytes();
        self.len_units -= units;

        Some(item)
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    /// Current occupancy in the configured unit.
    pub fn current_size(&self) -> usize {
        match self.limit.unit {
            SizeUnit::Packets => self.items.len(),
            SizeUnit::Bytes => self.len_units,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len_packets(&self) -> usize {
        self.items.len()
    }

    pub fn len_bytes(&self) -> usize {
        self.len_bytes
    }

    pub fn limit(&self) -> QueueSize {
        self.limit
    }

    pub fn state(&self) -> QueueState {
        QueueState {
            occupancy: self.current_size(),
            capacity: self.limit.value,
            unit: self.limit.unit,
        }
    }
}
