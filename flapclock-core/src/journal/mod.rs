//! Event journal
//!
//! The orchestrator appends a [`LogEntry`] for every fault, quiet-hours
//! transition and re-home. Sinks decide what to do with them: keep a
//! bounded history ([`EventRing`]), forward to a transport (the firmware's
//! defmt sink) or drop them ([`NullLog`]).

mod entry;
mod ring;

pub use entry::{LogEntry, LogEvent};
pub use ring::EventRing;

/// Append-only sink for journal entries
pub trait EventLog {
    /// Record one entry
    fn record(&mut self, entry: LogEntry);
}

impl<L: EventLog + ?Sized> EventLog for &mut L {
    fn record(&mut self, entry: LogEntry) {
        (**self).record(entry)
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLog;

impl EventLog for NullLog {
    fn record(&mut self, _entry: LogEntry) {}
}
