//! Bounded in-memory journal

use heapless::Deque;

use super::{EventLog, LogEntry, LogEvent};

/// Keeps the most recent `N` entries, dropping the oldest when full
#[derive(Debug)]
pub struct EventRing<const N: usize> {
    entries: Deque<LogEntry, N>,
    /// Entries recorded since creation, including dropped ones
    total: u32,
}

impl<const N: usize> EventRing<N> {
    /// Create an empty journal
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
            total: 0,
        }
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is retained
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ever recorded
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Number of retained entries matching `pred`
    pub fn count(&self, pred: impl Fn(&LogEvent) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.event)).count()
    }

    /// Drop all retained entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<const N: usize> Default for EventRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventLog for EventRing<N> {
    fn record(&mut self, entry: LogEntry) {
        if self.entries.is_full() {
            self.entries.pop_front();
        }
        // Cannot fail after the pop above (N == 0 drops everything)
        let _ = self.entries.push_back(entry);
        self.total = self.total.wrapping_add(1);
    }
}
