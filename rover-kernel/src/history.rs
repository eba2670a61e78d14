//! Fixed-capacity rolling history of one metric.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// How a history is laid out when handed to a consumer.
///
/// Panel sparklines plot oldest-first; telemetry strip charts read newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    #[default]
    OldestFirst,
    NewestFirst,
}

#[derive(Debug, Clone)]
pub struct History {
    samples: VecDeque<f64>,
    capacity: NonZeroUsize,
    order: HistoryOrder,
}

impl History {
    pub fn new(capacity: NonZeroUsize, order: HistoryOrder) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.get()),
            capacity,
            order,
        }
    }

    /// Appends the newest sample, evicting the oldest once full.
    pub fn push(&mut self, value: f64) {
        if self.samples.len() == self.capacity.get() {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Copy of the samples in this history's configured order.
    pub fn snapshot(&self) -> Vec<f64> {
        match self.order {
            HistoryOrder::OldestFirst => self.samples.iter().copied().collect(),
            HistoryOrder::NewestFirst => self.samples.iter().rev().copied().collect(),
        }
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn order(&self) -> HistoryOrder {
        self.order
    }
}
