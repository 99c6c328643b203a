//! Events that trigger clock state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Homing
    /// Full re-home started (power-on, drift, scheduled, settings change)
    Rehome,
    /// Dials were moved to the live time
    Synced,

    // Running
    /// Minute wheel wrapped without a scheduled re-home
    MinuteWrapped,
    /// Minute wheel found its endstop during the alignment sweep
    Aligned,

    // Quiet hours
    /// A quiet schedule became active
    QuietStarted,
    /// No quiet schedule is active any more
    QuietEnded,

    // Maintenance
    /// Operator requested calibration mode
    EnterCalibration,
    /// Operator left calibration mode
    ExitCalibration,

    // Faults
    /// Unrecoverable fault; motion stops
    FaultDetected,
}
