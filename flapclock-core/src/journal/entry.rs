//! Journal entry types

use core::fmt;

use crate::axis::Axis;
use crate::time::WallTime;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogEvent {
    /// Both axes homed
    Initialized,
    /// Endstop not found within the homing window
    HomingFailed(Axis),
    /// Homing failed while preparing an error display
    CatastrophicHomingFailure,
    /// Endstop triggered away from the home flap
    DriftDetected(Axis),
    /// Full re-home at the hour-dial wrap
    ScheduledRehome {
        /// Hour being entered
        hour: u8,
    },
    /// Alignment sweep completed without an endstop, sweep re-issued
    AlignRetry {
        /// Attempt number just started (2..)
        attempt: u8,
    },
    /// Alignment sweeps exhausted
    AlignmentFailed,
    /// Quiet schedule became active
    QuietStarted,
    /// Quiet hours ended
    QuietEnded,
    /// No wall-clock time after homing
    TimeUnavailable,
    /// Diagnostic code shown on the dials
    SystemError {
        /// Hours wheel flap
        hour_code: u8,
        /// Minutes wheel flap
        minute_code: u8,
    },
    /// Calibration mode entered
    CalibrationEntered,
    /// Calibration mode left
    CalibrationExited,
    /// Mechanical constant changed
    StepsPerFlapChanged {
        /// Axis affected
        axis: Axis,
        /// New value in thousandths of a step
        milli_steps: u32,
    },
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LogEvent::Initialized => f.write_str("homing complete"),
            LogEvent::HomingFailed(axis) => write!(f, "{} homing failed", axis.name()),
            LogEvent::CatastrophicHomingFailure => {
                f.write_str("homing failed during error display, halted")
            }
            LogEvent::DriftDetected(axis) => {
                write!(f, "{} drift detected, re-homing", axis.name())
            }
            LogEvent::ScheduledRehome { hour } => {
                write!(f, "scheduled re-home at hour {}", hour)
            }
            LogEvent::AlignRetry { attempt } => {
                write!(f, "minute align missed endstop, attempt {}", attempt)
            }
            LogEvent::AlignmentFailed => f.write_str("minute align failed"),
            LogEvent::QuietStarted => f.write_str("quiet hours started"),
            LogEvent::QuietEnded => f.write_str("quiet hours ended"),
            LogEvent::TimeUnavailable => f.write_str("time unavailable"),
            LogEvent::SystemError {
                hour_code,
                minute_code,
            } => write!(f, "system error {}-{}", hour_code, minute_code),
            LogEvent::CalibrationEntered => f.write_str("calibration mode"),
            LogEvent::CalibrationExited => f.write_str("calibration done"),
            LogEvent::StepsPerFlapChanged { axis, milli_steps } => write!(
                f,
                "{} steps/flap {}.{:03}",
                axis.name(),
                milli_steps / 1000,
                milli_steps % 1000
            ),
        }
    }
}

/// Timestamped journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogEntry {
    /// Wall time when recorded, if known
    pub stamp: Option<WallTime>,
    /// Event
    pub event: LogEvent,
}

impl LogEntry {
    /// Create an entry
    pub const fn new(stamp: Option<WallTime>, event: LogEvent) -> Self {
        Self { stamp, event }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stamp {
            Some(t) => write!(f, "[{}] {}", t, self.event),
            None => write!(f, "[--:--] {}", self.event),
        }
    }
}
