//! Fault taxonomy and dial error codes

use crate::axis::Axis;

/// Faults recorded by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Endstop not found within the homing window
    HomingTimeout(Axis),
    /// Endstop triggered away from the home flap; recovered by re-homing
    DriftDetected(Axis),
    /// Hourly minute alignment never found the endstop
    AlignmentFailed,
    /// Homing failed while preparing an error display; nothing is shown
    CatastrophicHomingFailure,
    /// A diagnostic code is shown on the dials
    SystemError {
        /// Hours wheel flap
        hour_code: u8,
        /// Minutes wheel flap
        minute_code: u8,
    },
}

/// Diagnostic digits shown on the dials while halted
///
/// The hours wheel shows the first digit and the minutes wheel the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultCode {
    /// Flap on the hours wheel
    pub hour_digit: u8,
    /// Flap on the minutes wheel
    pub minute_digit: u8,
}

impl FaultCode {
    /// Minutes axis failed to home
    pub const MINUTES_HOMING: FaultCode = FaultCode::new(1, 1);
    /// Hours axis failed to home
    pub const HOURS_HOMING: FaultCode = FaultCode::new(1, 2);
    /// Minute alignment exhausted its sweeps
    pub const ALIGNMENT: FaultCode = FaultCode::new(2, 1);
    /// No wall-clock time
    pub const TIME_UNAVAILABLE: FaultCode = FaultCode::new(3, 1);
    /// Network (time sync) unavailable
    pub const NETWORK_UNAVAILABLE: FaultCode = FaultCode::new(3, 2);

    /// Create a code
    pub const fn new(hour_digit: u8, minute_digit: u8) -> Self {
        Self {
            hour_digit,
            minute_digit,
        }
    }

    /// Homing failure code for an axis
    pub const fn homing(axis: Axis) -> Self {
        match axis {
            Axis::Minutes => Self::MINUTES_HOMING,
            Axis::Hours => Self::HOURS_HOMING,
        }
    }

    /// Target flap for the given wheel, reduced to the wheel size
    pub const fn flap(&self, axis: Axis) -> u8 {
        match axis {
            Axis::Minutes => self.minute_digit % axis.wheel_size(),
            Axis::Hours => self.hour_digit % axis.wheel_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_reduced_to_wheel() {
        let code = FaultCode::new(25, 61);
        assert_eq!(code.flap(Axis::Hours), 1);
        assert_eq!(code.flap(Axis::Minutes), 1);
        assert_eq!(FaultCode::HOURS_HOMING.flap(Axis::Minutes), 2);
    }

    #[test]
    fn test_homing_codes() {
        assert_eq!(FaultCode::homing(Axis::Minutes), FaultCode::new(1, 1));
        assert_eq!(FaultCode::homing(Axis::Hours), FaultCode::new(1, 2));
    }
}
