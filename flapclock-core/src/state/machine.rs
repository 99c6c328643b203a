//! State machine definition

use super::events::Event;

/// Orchestrator modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockState {
    /// Homed or homing, dials not yet showing the live time
    #[default]
    Idle,
    /// Following the time source one minute at a time
    Running,
    /// Hourly minute-wheel sweep to the endstop in progress
    MinuteAlign,
    /// A quiet schedule is active; no step commands
    QuietMode,
    /// Operator maintenance; engines only move on explicit jog/home
    CalibrationMode,
    /// Halted after an unrecoverable fault; requires a restart
    ErrorState,
}

impl ClockState {
    /// Check if this is the terminal error state
    pub fn is_halted(&self) -> bool {
        matches!(self, ClockState::ErrorState)
    }

    /// Short name for logs and diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            ClockState::Idle => "idle",
            ClockState::Running => "running",
            ClockState::MinuteAlign => "minute-align",
            ClockState::QuietMode => "quiet",
            ClockState::CalibrationMode => "calibration",
            ClockState::ErrorState => "error",
        }
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use ClockState::*;
        use Event::*;

        match (self, event) {
            // ErrorState absorbs everything
            (ErrorState, _) => ErrorState,

            (_, FaultDetected) => ErrorState,

            // Calibration is only left explicitly
            (CalibrationMode, ExitCalibration) => Idle,
            (CalibrationMode, _) => CalibrationMode,
            (_, EnterCalibration) => CalibrationMode,

            (_, Rehome) => Idle,

            // Idle transitions
            (Idle, Synced) => Running,
            (Idle, QuietStarted) => QuietMode,

            // Running transitions
            (Running, MinuteWrapped) => MinuteAlign,
            (Running, QuietStarted) => QuietMode,

            // MinuteAlign transitions
            (MinuteAlign, Aligned) => Running,

            // QuietMode transitions
            (QuietMode, QuietEnded) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ClockState; 6] = [
        ClockState::Idle,
        ClockState::Running,
        ClockState::MinuteAlign,
        ClockState::QuietMode,
        ClockState::CalibrationMode,
        ClockState::ErrorState,
    ];

    #[test]
    fn test_boot_to_running() {
        let state = ClockState::default().transition(Event::Rehome);
        assert_eq!(state, ClockState::Idle);
        assert_eq!(state.transition(Event::Synced), ClockState::Running);
    }

    #[test]
    fn test_error_is_terminal() {
        let events = [
            Event::Rehome,
            Event::Synced,
            Event::MinuteWrapped,
            Event::Aligned,
            Event::QuietStarted,
            Event::QuietEnded,
            Event::EnterCalibration,
            Event::ExitCalibration,
            Event::FaultDetected,
        ];
        for event in events {
            assert_eq!(
                ClockState::ErrorState.transition(event),
                ClockState::ErrorState
            );
        }
    }

    #[test]
    fn test_fault_from_any_state() {
        for state in ALL {
            assert_eq!(
                state.transition(Event::FaultDetected),
                ClockState::ErrorState
            );
        }
    }

    #[test]
    fn test_hourly_alignment_flow() {
        let aligning = ClockState::Running.transition(Event::MinuteWrapped);
        assert_eq!(aligning, ClockState::MinuteAlign);
        assert_eq!(aligning.transition(Event::Aligned), ClockState::Running);
        // Quiet start does not interrupt a sweep
        assert_eq!(
            aligning.transition(Event::QuietStarted),
            ClockState::MinuteAlign
        );
    }

    #[test]
    fn test_quiet_flow() {
        let quiet = ClockState::Running.transition(Event::QuietStarted);
        assert_eq!(quiet, ClockState::QuietMode);
        let idle = quiet.transition(Event::QuietEnded);
        assert_eq!(idle, ClockState::Idle);
        assert_eq!(idle.transition(Event::Synced), ClockState::Running);
        // Synced is ignored while quiet
        assert_eq!(quiet.transition(Event::Synced), ClockState::QuietMode);
    }

    #[test]
    fn test_calibration_only_left_explicitly() {
        let cal = ClockState::Running.transition(Event::EnterCalibration);
        assert_eq!(cal, ClockState::CalibrationMode);
        assert_eq!(cal.transition(Event::Rehome), ClockState::CalibrationMode);
        assert_eq!(cal.transition(Event::Synced), ClockState::CalibrationMode);
        assert_eq!(cal.transition(Event::ExitCalibration), ClockState::Idle);
    }

    #[test]
    fn test_rehome_returns_to_idle() {
        for state in [
            ClockState::Idle,
            ClockState::Running,
            ClockState::MinuteAlign,
            ClockState::QuietMode,
        ] {
            assert_eq!(state.transition(Event::Rehome), ClockState::Idle);
        }
    }

    #[test]
    fn test_only_error_state_is_halted() {
        assert!(ClockState::ErrorState.is_halted());
        assert!(!ClockState::Idle.is_halted());
    }
}
