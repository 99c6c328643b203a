//! Calibration mode
//!
//! Maintenance operations for measuring the steps-per-flap constants. All of
//! them are refused unless the operator has entered calibration mode.

use flapclock_hal::{InputPin, Monotonic, OutputPin, Watchdog};

use super::ClockOrchestrator;
use crate::axis::Axis;
use crate::config::{CalibrationData, ConfigSource};
use crate::journal::{EventLog, LogEvent};
use crate::state::{ClockState, Event};
use crate::time::TimeSource;

impl<P, E, M, W, T, L, C> ClockOrchestrator<P, E, M, W, T, L, C>
where
    P: OutputPin,
    E: InputPin,
    M: Monotonic,
    W: Watchdog,
    T: TimeSource,
    L: EventLog,
    C: ConfigSource,
{
    /// Stop both engines and enter calibration mode
    ///
    /// Refused while halted.
    pub fn enter_calibration(&mut self) -> bool {
        if self.state.is_halted() {
            return false;
        }
        if self.is_calibrating() {
            return true;
        }

        self.minutes.stop();
        self.hours.stop();
        self.transition(Event::EnterCalibration);
        self.record(LogEvent::CalibrationEntered);
        true
    }

    /// Check if calibration mode is active
    pub fn is_calibrating(&self) -> bool {
        self.state == ClockState::CalibrationMode
    }

    /// Advance one axis by `flaps`
    pub fn jog(&mut self, axis: Axis, flaps: u8) -> bool {
        if !self.is_calibrating() {
            return false;
        }
        let (ctrl, clock, watchdog) = self.parts(axis);
        ctrl.advance_flaps(flaps, clock, watchdog)
    }

    /// Change an axis's steps-per-flap constant live
    ///
    /// Values below one step are rejected.
    pub fn set_steps_per_flap(&mut self, axis: Axis, steps_per_flap: f64) -> bool {
        if !self.is_calibrating() || !steps_per_flap.is_finite() || steps_per_flap < 1.0 {
            return false;
        }

        let (ctrl, _, _) = self.parts(axis);
        ctrl.set_steps_per_flap(steps_per_flap);
        self.record(LogEvent::StepsPerFlapChanged {
            axis,
            milli_steps: libm::round(steps_per_flap * 1000.0) as u32,
        });
        true
    }

    /// Home a single axis
    pub fn home_axis(&mut self, axis: Axis) -> bool {
        if !self.is_calibrating() {
            return false;
        }
        self.home(axis)
    }

    /// Measure one revolution of an axis sitting on its endstop
    pub fn measure_revolution(&mut self, axis: Axis) -> Option<u32> {
        if !self.is_calibrating() {
            return None;
        }
        let timeout_ms = self.config.with_config(|c| c.homing_timeout_ms);
        let (ctrl, clock, watchdog) = self.parts(axis);
        ctrl.measure_steps_per_revolution(timeout_ms, clock, watchdog)
    }

    /// Current constants as a record ready to persist
    pub fn calibration_data(&self) -> CalibrationData {
        CalibrationData::new(self.minutes.steps_per_flap(), self.hours.steps_per_flap())
    }

    /// Leave calibration mode and re-initialize
    pub fn exit_calibration(&mut self) -> bool {
        if !self.is_calibrating() {
            return false;
        }
        self.transition(Event::ExitCalibration);
        self.record(LogEvent::CalibrationExited);
        self.initialize()
    }
}
