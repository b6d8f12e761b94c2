//! Bounded rolling history of timestamped readings.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::constants::feed::HISTORY_LEN;

/// One charted point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub time: DateTime<Local>,
    pub value: f64,
}

/// Ring buffer keeping the most recent `capacity` entries, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingHistory<T> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T> RollingHistory<T> {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Append, evicting and returning the oldest entry when full.
    pub fn push(&mut self, entry: T) -> Option<T> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Default for RollingHistory<T> {
    fn default() -> Self {
        Self::new(HISTORY_LEN)
    }
}

impl<'a, T> IntoIterator for &'a RollingHistory<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl RollingHistory<Reading> {
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|r| r.value).collect()
    }
}
