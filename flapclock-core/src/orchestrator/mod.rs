//! Clock orchestration
//!
//! Owns both axes and turns wall-clock readings into flap moves. An external
//! loop calls [`ClockOrchestrator::tick`] at sub-millisecond cadence; each
//! tick services both step engines and then evaluates the current
//! [`ClockState`](crate::ClockState), issuing at most one flap-level command.

mod calibration;
mod clock;
mod fault;

#[cfg(test)]
mod scenarios;

pub use clock::ClockOrchestrator;
pub use fault::{Fault, FaultCode};

/// Lifetime counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockStats {
    /// Full re-homes started
    pub initializations: u32,
    /// Single-flap minute advances
    pub minute_advances: u32,
    /// Completed hourly minute alignments
    pub alignments: u32,
    /// Drift detections
    pub drift_events: u32,
    /// Re-homes at the hour-dial wrap
    pub scheduled_rehomes: u32,
}
