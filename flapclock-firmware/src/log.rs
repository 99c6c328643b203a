//! Event log sink forwarding to defmt

use defmt::*;

use flapclock_core::journal::{EventLog, LogEntry, LogEvent};

/// Writes orchestrator events to the RTT log at a level matching severity
#[derive(Debug, Default, Clone, Copy)]
pub struct DefmtLog;

impl EventLog for DefmtLog {
    fn record(&mut self, entry: LogEntry) {
        let line = Display2Format(&entry);
        match entry.event {
            LogEvent::HomingFailed(_)
            | LogEvent::CatastrophicHomingFailure
            | LogEvent::AlignmentFailed
            | LogEvent::SystemError { .. } => error!("{}", line),
            LogEvent::DriftDetected(_)
            | LogEvent::AlignRetry { .. }
            | LogEvent::TimeUnavailable => warn!("{}", line),
            _ => info!("{}", line),
        }
    }
}
