//! Rolling operator log fed by routine mission chatter.

use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use std::collections::VecDeque;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub id: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub message: String,
    pub kind: EventKind,
}

const MESSAGES: [&str; 8] = [
    "System health check completed.",
    "Battery level stable.",
    "Dust storm detected approaching.",
    "Communication link established.",
    "Autonomous navigation engaged.",
    "Sample analysis in progress.",
    "Solar panel efficiency optimal.",
    "Temperature sensors calibrated.",
];

const KINDS: [EventKind; 3] = [EventKind::Info, EventKind::Success, EventKind::Warning];

/// Newest-first log holding at most `capacity` entries.
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_id: u64,
    rng: StdRng,
}

impl EventLog {
    pub fn new(capacity: usize, rng: StdRng) -> Self {
        Self { entries: VecDeque::with_capacity(capacity), capacity, next_id: 1, rng }
    }

    pub fn tick(&mut self, now: OffsetDateTime) -> &LogEntry {
        let entry = LogEntry {
            id: self.next_id,
            time: now,
            message: MESSAGES[self.rng.gen_range(0..MESSAGES.len())].to_string(),
            kind: KINDS[self.rng.gen_range(0..KINDS.len())],
        };
        self.next_id += 1;
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
        &self.entries[0]
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
