//! Orchestrator state machine

use flapclock_hal::{InputPin, Monotonic, OutputPin, Watchdog};

use super::{ClockStats, Fault, FaultCode};
use crate::axis::{Axis, AxisController, ALIGN_SWEEP_REVOLUTIONS};
use crate::config::ConfigSource;
use crate::journal::{EventLog, LogEntry, LogEvent};
use crate::schedule::{is_rehome_boundary, DisplayMode};
use crate::state::{ClockState, Event};
use crate::time::{TimeSource, WallTime};

/// Two-axis split-flap clock
///
/// The orchestrator is the only mutator of both axes. Configuration is
/// borrowed through `C` on every use, never cached.
pub struct ClockOrchestrator<P, E, M, W, T, L, C> {
    pub(super) minutes: AxisController<P, E>,
    pub(super) hours: AxisController<P, E>,
    clock: M,
    watchdog: W,
    time: T,
    journal: L,
    pub(super) config: C,
    pub(super) state: ClockState,
    /// Both axes homed since the last re-home started
    homed: bool,
    /// Sweeps issued for the current minute alignment
    align_attempts: u8,
    last_fault: Option<Fault>,
    pub(super) stats: ClockStats,
}

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
    /// Create an orchestrator in `Idle`; call [`initialize`](Self::initialize)
    /// before the first tick
    pub fn new(
        minutes: AxisController<P, E>,
        hours: AxisController<P, E>,
        clock: M,
        watchdog: W,
        time: T,
        journal: L,
        config: C,
    ) -> Self {
        Self {
            minutes,
            hours,
            clock,
            watchdog,
            time,
            journal,
            config,
            state: ClockState::Idle,
            homed: false,
            align_attempts: 0,
            last_fault: None,
            stats: ClockStats::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Most recent fault
    pub fn last_fault(&self) -> Option<Fault> {
        self.last_fault
    }

    /// Raw endstop readings (minutes, hours)
    pub fn endstops(&self) -> (bool, bool) {
        (
            self.minutes.endstop_triggered(),
            self.hours.endstop_triggered(),
        )
    }

    /// Believed flap indices (minutes, hours)
    pub fn current_flaps(&self) -> (u8, u8) {
        (self.minutes.current_flap(), self.hours.current_flap())
    }

    /// Lifetime counters
    pub fn stats(&self) -> ClockStats {
        self.stats
    }

    /// Event sink
    pub fn event_log(&self) -> &L {
        &self.journal
    }

    /// One axis, read-only
    pub fn axis(&self, axis: Axis) -> &AxisController<P, E> {
        match axis {
            Axis::Minutes => &self.minutes,
            Axis::Hours => &self.hours,
        }
    }

    /// Check if both axes were homed by the last re-home
    pub fn is_homed(&self) -> bool {
        self.homed
    }

    /// Home both axes and move to the current time
    ///
    /// Minutes are homed first, then hours. A homing failure shows the
    /// corresponding [`FaultCode`] on whichever axis did home and halts in
    /// `ErrorState`. Returns whether both axes homed. Ignored while halted or
    /// in calibration mode.
    pub fn initialize(&mut self) -> bool {
        if matches!(
            self.state,
            ClockState::ErrorState | ClockState::CalibrationMode
        ) {
            return false;
        }

        self.stats.initializations += 1;
        self.homed = false;
        self.align_attempts = 0;
        self.transition(Event::Rehome);

        let minutes_ok = self.home(Axis::Minutes);
        if !minutes_ok {
            self.raise(
                Fault::HomingTimeout(Axis::Minutes),
                LogEvent::HomingFailed(Axis::Minutes),
            );
        }
        let hours_ok = self.home(Axis::Hours);
        if !hours_ok {
            self.raise(
                Fault::HomingTimeout(Axis::Hours),
                LogEvent::HomingFailed(Axis::Hours),
            );
        }

        match (minutes_ok, hours_ok) {
            (true, true) => {}
            // Hours dial is read first, so it moves first
            (false, true) => {
                self.show_code(FaultCode::homing(Axis::Minutes), [Axis::Hours, Axis::Minutes]);
                self.halt();
                return false;
            }
            (true, false) => {
                self.show_code(FaultCode::homing(Axis::Hours), [Axis::Minutes, Axis::Hours]);
                self.halt();
                return false;
            }
            (false, false) => {
                self.halt();
                return false;
            }
        }

        self.homed = true;
        self.record(LogEvent::Initialized);

        match self.read_time() {
            Some(now) if self.quiet_at(&now) => self.enter_quiet(),
            Some(now) => self.sync_to(&now),
            None => self.record(LogEvent::TimeUnavailable),
        }
        true
    }

    /// Show a diagnostic code on the dials and halt
    ///
    /// Re-homes both axes first. If that fails the clock halts with nothing
    /// shown and records [`Fault::CatastrophicHomingFailure`]. Returns
    /// whether the code is on display.
    pub fn display_system_error(&mut self, hour_code: u8, minute_code: u8) -> bool {
        if self.state.is_halted() {
            return false;
        }

        self.raise(
            Fault::SystemError {
                hour_code,
                minute_code,
            },
            LogEvent::SystemError {
                hour_code,
                minute_code,
            },
        );
        self.minutes.stop();
        self.hours.stop();
        self.homed = false;

        if !(self.home(Axis::Minutes) && self.home(Axis::Hours)) {
            self.raise(
                Fault::CatastrophicHomingFailure,
                LogEvent::CatastrophicHomingFailure,
            );
            self.halt();
            return false;
        }

        let code = FaultCode::new(hour_code, minute_code);
        for axis in [Axis::Hours, Axis::Minutes] {
            self.drive_to(axis, code.flap(axis));
        }
        self.halt();
        true
    }

    /// [`display_system_error`](Self::display_system_error) for a predefined code
    pub fn display_fault_code(&mut self, code: FaultCode) -> bool {
        self.display_system_error(code.hour_digit, code.minute_digit)
    }

    /// Service both engines and evaluate the current state
    ///
    /// Feeds the watchdog even while halted so the error code stays up.
    pub fn tick(&mut self) {
        self.watchdog.feed();
        if self.state.is_halted() {
            return;
        }

        let now_us = self.clock.now_micros();
        self.minutes.service(now_us);
        self.hours.service(now_us);

        match self.state {
            ClockState::Idle => self.tick_idle(),
            ClockState::Running => self.tick_running(now_us),
            ClockState::MinuteAlign => self.tick_align(now_us),
            ClockState::QuietMode => self.tick_quiet(),
            ClockState::CalibrationMode | ClockState::ErrorState => {}
        }
    }

    fn tick_idle(&mut self) {
        if !self.homed {
            return;
        }
        let Some(now) = self.read_time() else {
            return;
        };
        if self.quiet_at(&now) {
            self.enter_quiet();
        } else {
            self.sync_to(&now);
        }
    }

    fn tick_running(&mut self, now_us: u32) {
        if let Some(axis) = self.drifted_axis() {
            self.stats.drift_events += 1;
            self.raise(Fault::DriftDetected(axis), LogEvent::DriftDetected(axis));
            self.initialize();
            return;
        }

        let Some(now) = self.read_time() else {
            return;
        };
        if self.quiet_at(&now) {
            self.enter_quiet();
            return;
        }

        let current = self.minutes.current_flap();
        if now.minute < current {
            if is_rehome_boundary(now.hour, self.display_mode()) {
                self.stats.scheduled_rehomes += 1;
                self.record(LogEvent::ScheduledRehome { hour: now.hour });
                self.initialize();
                return;
            }
            self.align_attempts = 1;
            self.minutes.start_sweep(ALIGN_SWEEP_REVOLUTIONS, now_us);
            self.transition(Event::MinuteWrapped);
            return;
        }

        // Hour changed without a wrap, or the display mode changed
        let hour_flap = self.config.with_config(|c| c.hour_flap(now.hour));
        if hour_flap != self.hours.current_flap() {
            self.drive_to(Axis::Hours, hour_flap);
            return;
        }

        if now.minute == current {
            return;
        }

        let (minutes, clock, watchdog) = self.parts(Axis::Minutes);
        if minutes.advance_flaps(1, clock, watchdog) {
            self.stats.minute_advances += 1;
        }
    }

    fn tick_align(&mut self, now_us: u32) {
        if self.minutes.endstop_triggered() {
            self.minutes.stop();
            self.minutes.reset_to_home();
            self.align_attempts = 0;
            self.stats.alignments += 1;
            self.transition(Event::Aligned);

            if let Some(now) = self.read_time() {
                let target = self.config.with_config(|c| c.hour_flap(now.hour));
                if target != self.hours.current_flap() {
                    self.drive_to(Axis::Hours, target);
                }
            }
            return;
        }

        if self.minutes.is_moving() {
            return;
        }

        // Sweep finished without the endstop
        let retries = self.config.with_config(|c| c.align_retries);
        if self.align_attempts > retries {
            self.raise(Fault::AlignmentFailed, LogEvent::AlignmentFailed);
            self.halt();
            return;
        }
        self.align_attempts += 1;
        self.record(LogEvent::AlignRetry {
            attempt: self.align_attempts,
        });
        self.minutes.start_sweep(ALIGN_SWEEP_REVOLUTIONS, now_us);
    }

    fn tick_quiet(&mut self) {
        let now = self.read_time();
        if now.is_some_and(|t| self.quiet_at(&t)) {
            return;
        }

        self.record(LogEvent::QuietEnded);
        self.transition(Event::QuietEnded);
        if let Some(now) = now {
            self.sync_to(&now);
        }
    }

    /// Axis whose endstop reads triggered away from its home flap
    fn drifted_axis(&self) -> Option<Axis> {
        if self.minutes.is_moving() || self.hours.is_moving() {
            return None;
        }
        [&self.minutes, &self.hours]
            .into_iter()
            .find(|a| a.endstop_triggered() && a.current_flap() != a.axis().home_flap())
            .map(|a| a.axis())
    }

    /// Absolute move of both axes to `now`, then `Running`
    fn sync_to(&mut self, now: &WallTime) {
        let hour_flap = self.config.with_config(|c| c.hour_flap(now.hour));
        self.drive_to(Axis::Minutes, now.minute);
        self.drive_to(Axis::Hours, hour_flap);
        self.transition(Event::Synced);
    }

    fn enter_quiet(&mut self) {
        self.record(LogEvent::QuietStarted);
        self.transition(Event::QuietStarted);
    }

    /// Drive the dials to `code`, assuming an axis that failed to home sits
    /// on its home flap
    fn show_code(&mut self, code: FaultCode, order: [Axis; 2]) {
        self.record(LogEvent::SystemError {
            hour_code: code.hour_digit,
            minute_code: code.minute_digit,
        });
        for axis in order {
            let (ctrl, _, _) = self.parts(axis);
            ctrl.reset_to_home();
            self.drive_to(axis, code.flap(axis));
        }
    }

    fn halt(&mut self) {
        self.minutes.stop();
        self.hours.stop();
        self.homed = false;
        self.transition(Event::FaultDetected);
    }

    pub(super) fn home(&mut self, axis: Axis) -> bool {
        let timeout_ms = self.config.with_config(|c| c.homing_timeout_ms);
        let (ctrl, clock, watchdog) = self.parts(axis);
        ctrl.home_blocking(timeout_ms, clock, watchdog)
    }

    pub(super) fn drive_to(&mut self, axis: Axis, flap: u8) -> bool {
        let (ctrl, clock, watchdog) = self.parts(axis);
        ctrl.move_to_flap(flap, clock, watchdog)
    }

    pub(super) fn parts(&mut self, axis: Axis) -> (&mut AxisController<P, E>, &M, &mut W) {
        let ctrl = match axis {
            Axis::Minutes => &mut self.minutes,
            Axis::Hours => &mut self.hours,
        };
        (ctrl, &self.clock, &mut self.watchdog)
    }

    fn display_mode(&self) -> DisplayMode {
        self.config.with_config(|c| c.display_mode)
    }

    fn quiet_at(&self, now: &WallTime) -> bool {
        self.config.with_config(|c| c.is_quiet_at(now))
    }

    pub(super) fn transition(&mut self, event: Event) {
        self.state = self.state.transition(event);
    }

    /// Time source reading, out-of-range readings count as unavailable
    fn read_time(&self) -> Option<WallTime> {
        self.time.now().filter(WallTime::is_valid)
    }

    pub(super) fn record(&mut self, event: LogEvent) {
        let stamp = self.read_time();
        self.journal.record(LogEntry::new(stamp, event));
    }

    fn raise(&mut self, fault: Fault, event: LogEvent) {
        self.record(event);
        self.last_fault = Some(fault);
    }
}
