//! Axis controller
//!
//! Wraps a [`StepEngine`] with homing, an endstop and a fractional step
//! accumulator, and exposes motion in whole flaps.
//!
//! Homing, flap draining and revolution measurement spin synchronously but
//! service the engine and the watchdog on every iteration; they never sleep.

use flapclock_hal::time::elapsed_since;
use flapclock_hal::{InputPin, Monotonic, OutputPin, Watchdog};

use super::Axis;
use crate::config::AxisConfig;
use crate::motion::{forward_flaps, StepAccumulator};
use crate::stepper::StepEngine;

/// Over-travel allowed when homing, in wheel revolutions
pub const HOMING_REVOLUTIONS: u32 = 3;

/// Sweep length for the hourly minute alignment, in wheel revolutions
pub const ALIGN_SWEEP_REVOLUTIONS: u32 = 2;

/// Slack on top of the nominal duration of a single flap move
const FLAP_TIMEOUT_MARGIN_MS: u32 = 2_000;

/// One wheel: engine, endstop and tracked flap
pub struct AxisController<P, E> {
    axis: Axis,
    engine: StepEngine<P>,
    endstop: E,
    endstop_active_low: bool,
    /// Believed flap index, authoritative only after homing or a drained move
    current_flap: u8,
    accumulator: StepAccumulator,
    speed: i32,
    homing_speed: i32,
}

impl<P: OutputPin, E: InputPin> AxisController<P, E> {
    /// Create an axis from its coil lines, endstop input and settings
    pub fn new(axis: Axis, lines: [P; 4], endstop: E, config: &AxisConfig) -> Self {
        let mut engine = StepEngine::new(lines, config.reversed);
        let speed = config.speed_steps_per_s as i32;
        engine.set_speed(speed);
        Self {
            axis,
            engine,
            endstop,
            endstop_active_low: config.endstop_active_low,
            current_flap: axis.home_flap(),
            accumulator: StepAccumulator::new(config.steps_per_flap),
            speed,
            homing_speed: config.homing_speed_steps_per_s as i32,
        }
    }

    /// Which wheel this is
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Underlying step engine
    pub fn engine(&self) -> &StepEngine<P> {
        &self.engine
    }

    /// Check if the endstop reads triggered right now
    pub fn endstop_triggered(&self) -> bool {
        self.endstop.is_high() != self.endstop_active_low
    }

    /// Believed flap index
    pub fn current_flap(&self) -> u8 {
        self.current_flap
    }

    /// Override the believed flap index
    pub fn set_current_flap(&mut self, flap: u8) {
        self.current_flap = flap % self.axis.wheel_size();
    }

    /// Carried rounding residual
    pub fn residual(&self) -> f64 {
        self.accumulator.residual()
    }

    /// Mechanical constant in use
    pub fn steps_per_flap(&self) -> f64 {
        self.accumulator.steps_per_flap()
    }

    /// Replace the mechanical constant; clears the residual
    pub fn set_steps_per_flap(&mut self, steps_per_flap: f64) {
        self.accumulator.set_steps_per_flap(steps_per_flap);
    }

    /// Nominal steps for one full wheel revolution
    pub fn steps_per_revolution(&self) -> u32 {
        libm::round(self.accumulator.steps_per_flap() * self.axis.wheel_size() as f64) as u32
    }

    /// Mark the wheel as sitting on its home flap
    pub fn reset_to_home(&mut self) {
        self.current_flap = self.axis.home_flap();
        self.accumulator.reset();
    }

    /// Check if a move is in progress
    pub fn is_moving(&self) -> bool {
        self.engine.is_moving()
    }

    /// Advance the engine one phase if due; returns whether still moving
    pub fn service(&mut self, now_us: u32) -> bool {
        self.engine.update(now_us)
    }

    /// Halt, de-energize and restore the flap speed
    pub fn stop(&mut self) {
        self.engine.stop();
        self.engine.set_speed(self.speed);
    }

    /// Start a non-blocking sweep at homing speed
    ///
    /// Drive it with [`service`](Self::service) and poll the endstop.
    pub fn start_sweep(&mut self, revolutions: u32, now_us: u32) {
        self.engine.set_speed(self.homing_speed);
        let steps = self.steps_per_revolution().saturating_mul(revolutions);
        self.engine.move_steps(steps.min(i32::MAX as u32) as i32, now_us);
    }

    /// Drive forward until the endstop triggers
    ///
    /// Commands [`HOMING_REVOLUTIONS`] of over-travel at homing speed. Fails
    /// when `timeout_ms` elapses or the over-travel completes without a
    /// trigger. On success the flap index and accumulator are reset.
    pub fn home_blocking<M: Monotonic, W: Watchdog>(
        &mut self,
        timeout_ms: u32,
        clock: &M,
        watchdog: &mut W,
    ) -> bool {
        let start_ms = clock.now_millis();
        self.start_sweep(HOMING_REVOLUTIONS, clock.now_micros());

        let found = loop {
            watchdog.feed();
            if self.endstop_triggered() {
                break true;
            }
            if elapsed_since(clock.now_millis(), start_ms) > timeout_ms {
                break false;
            }
            if !self.engine.update(clock.now_micros()) {
                break self.endstop_triggered();
            }
        };

        self.stop();
        if found {
            self.reset_to_home();
        }
        found
    }

    /// Advance `flaps` flaps forward, draining each move before the next
    ///
    /// Returns false if a move failed to finish in time; the flap index
    /// then reflects only the flaps completed.
    pub fn advance_flaps<M: Monotonic, W: Watchdog>(
        &mut self,
        flaps: u8,
        clock: &M,
        watchdog: &mut W,
    ) -> bool {
        let wheel = self.axis.wheel_size();
        for _ in 0..flaps {
            let steps = self.accumulator.next_flap();
            if !self.drain(steps, clock, watchdog) {
                return false;
            }
            self.current_flap = (self.current_flap + 1) % wheel;
        }
        true
    }

    /// Move forward to `target`, never backward
    ///
    /// The flap index is set to `target` afterwards regardless of outcome.
    pub fn move_to_flap<M: Monotonic, W: Watchdog>(
        &mut self,
        target: u8,
        clock: &M,
        watchdog: &mut W,
    ) -> bool {
        let wheel = self.axis.wheel_size();
        let flaps = forward_flaps(self.current_flap, target, wheel);
        let ok = self.advance_flaps(flaps, clock, watchdog);
        self.current_flap = target % wheel;
        ok
    }

    /// Count the steps in one full revolution, starting on the endstop
    ///
    /// Drives off the endstop and on until it triggers again. Returns `None`
    /// if not started on the endstop, on timeout, or if two revolutions pass
    /// without a re-trigger. Leaves the axis homed on success.
    pub fn measure_steps_per_revolution<M: Monotonic, W: Watchdog>(
        &mut self,
        timeout_ms: u32,
        clock: &M,
        watchdog: &mut W,
    ) -> Option<u32> {
        if !self.endstop_triggered() {
            return None;
        }

        let start_ms = clock.now_millis();
        self.start_sweep(2, clock.now_micros());

        let mut left_window = false;
        let steps = loop {
            watchdog.feed();
            if elapsed_since(clock.now_millis(), start_ms) > timeout_ms {
                break None;
            }
            let moving = self.engine.update(clock.now_micros());
            let triggered = self.endstop_triggered();
            if !left_window {
                left_window = !triggered;
            } else if triggered {
                break Some(self.engine.steps_moved());
            }
            if !moving {
                break None;
            }
        };

        self.stop();
        if steps.is_some() {
            self.reset_to_home();
        }
        steps
    }

    /// Time allowed for a move of `steps` at the current speed
    ///
    /// A stalled engine (no speed) gets only the margin.
    fn move_timeout_ms(&self, steps: i32) -> u32 {
        let nominal_ms = self.engine.interval_us().map_or(0, |interval| {
            steps.unsigned_abs() as u64 * interval as u64 / 1_000
        });
        (nominal_ms + FLAP_TIMEOUT_MARGIN_MS as u64).min(u32::MAX as u64) as u32
    }

    fn drain<M: Monotonic, W: Watchdog>(&mut self, steps: i32, clock: &M, watchdog: &mut W) -> bool {
        let timeout_ms = self.move_timeout_ms(steps);
        let start_ms = clock.now_millis();
        self.engine.move_steps(steps, clock.now_micros());
        loop {
            watchdog.feed();
            if !self.engine.update(clock.now_micros()) {
                return true;
            }
            if elapsed_since(clock.now_millis(), start_ms) > timeout_ms {
                self.engine.stop();
                return false;
            }
        }
    }
}
