//! End-to-end scenarios on simulated wheels

use core::cell::RefCell;

use flapclock_hal::NoWatchdog;

use super::*;
use crate::axis::{Axis, AxisController};
use crate::config::ClockConfig;
use crate::journal::{EventRing, LogEvent};
use crate::schedule::{DayMask, DisplayMode, QuietSchedule};
use crate::sim::{SimClock, SimCoil, SimEndstop, SimRig, SimTimeSource};
use crate::state::ClockState;
use crate::time::{WallTime, Weekday};

type Clock<'a> = ClockOrchestrator<
    SimCoil<'a>,
    SimEndstop<'a>,
    &'a SimClock,
    NoWatchdog,
    &'a SimTimeSource,
    EventRing<32>,
    &'a RefCell<ClockConfig>,
>;

/// 93 steps x 60 flaps
const MINUTES_REV: u32 = 5580;
/// 170.5 steps x 24 flaps
const HOURS_REV: u32 = 4092;

struct Bench {
    minutes: SimRig,
    hours: SimRig,
    clock: SimClock,
    time: SimTimeSource,
    config: RefCell<ClockConfig>,
}

impl Bench {
    fn new(now: Option<WallTime>) -> Self {
        let minutes = SimRig::new(MINUTES_REV);
        let hours = SimRig::new(HOURS_REV);
        // Power-on somewhere mid-wheel
        minutes.set_position(1_234);
        hours.set_position(3_000);
        Self {
            minutes,
            hours,
            clock: SimClock::new(500),
            time: SimTimeSource::new(now),
            config: RefCell::new(ClockConfig::new()),
        }
    }

    fn orchestrator(&self) -> Clock<'_> {
        let config = self.config.borrow().clone();
        ClockOrchestrator::new(
            AxisController::new(
                Axis::Minutes,
                self.minutes.coils(),
                self.minutes.endstop(),
                &config.minutes,
            ),
            AxisController::new(
                Axis::Hours,
                self.hours.coils(),
                self.hours.endstop(),
                &config.hours,
            ),
            &self.clock,
            NoWatchdog,
            &self.time,
            EventRing::new(),
            &self.config,
        )
    }

    fn set_time(&self, hour: u8, minute: u8) {
        self.time
            .set(Some(WallTime::with_weekday(hour, minute, Weekday::Tuesday)))
    }

    fn quiet_nights(&self) {
        let mut config = self.config.borrow_mut();
        config.quiet_enabled = true;
        config
            .add_quiet_schedule(QuietSchedule::new("night", 22, 7, DayMask::ALL))
            .unwrap();
    }

    /// Positions within one revolution (minutes, hours)
    fn angles(&self) -> (i64, i64) {
        (
            self.minutes.position().rem_euclid(MINUTES_REV as i64),
            self.hours.position().rem_euclid(HOURS_REV as i64),
        )
    }
}

fn tuesday(hour: u8, minute: u8) -> Option<WallTime> {
    Some(WallTime::with_weekday(hour, minute, Weekday::Tuesday))
}

fn count(clock: &Clock<'_>, pred: impl Fn(&LogEvent) -> bool) -> usize {
    clock.event_log().count(pred)
}

fn tick_until(clock: &mut Clock<'_>, limit: u32, done: impl Fn(&Clock<'_>) -> bool) {
    for _ in 0..limit {
        if done(clock) {
            return;
        }
        clock.tick();
    }
    panic!("condition not reached after {} ticks", limit);
}

#[test]
fn test_initialize_moves_to_current_time() {
    let bench = Bench::new(tuesday(10, 30));
    let mut clock = bench.orchestrator();

    assert!(clock.initialize());
    assert_eq!(clock.state(), ClockState::Running);
    assert!(clock.is_homed());
    assert_eq!(clock.current_flaps(), (30, 10));
    // 10 flaps at 170.5 alternate 171/170 steps
    assert_eq!(bench.angles(), (30 * 93, 1_705));
    assert_eq!(clock.stats().initializations, 1);
    assert_eq!(count(&clock, |e| *e == LogEvent::Initialized), 1);
}

#[test]
fn test_idle_before_initialize_does_not_move() {
    let bench = Bench::new(tuesday(10, 30));
    let mut clock = bench.orchestrator();

    for _ in 0..100 {
        clock.tick();
    }
    assert_eq!(clock.state(), ClockState::Idle);
    assert_eq!(bench.minutes.steps_taken(), 0);
    assert_eq!(bench.hours.steps_taken(), 0);
}

#[test]
fn test_minute_advance_is_one_flap() {
    let bench = Bench::new(tuesday(10, 30));
    let mut clock = bench.orchestrator();
    assert!(clock.initialize());

    clock.tick();
    assert_eq!(clock.current_flaps(), (30, 10));

    bench.set_time(10, 31);
    let moves = clock.axis(Axis::Minutes).engine().moves_started();
    clock.tick();
    assert_eq!(clock.current_flaps(), (31, 10));
    assert_eq!(clock.axis(Axis::Minutes).engine().moves_started(), moves + 1);
    assert_eq!(clock.stats().minute_advances, 1);
    assert_eq!(bench.angles().0, 31 * 93);

    // Same minute again is a no-op
    clock.tick();
    assert_eq!(clock.stats().minute_advances, 1);
}

#[test]
fn test_time_jump_catches_up_one_flap_per_tick() {
    let bench = Bench::new(tuesday(10, 30));
    let mut clock = bench.orchestrator();
    assert!(clock.initialize());

    bench.set_time(10, 33);
    clock.tick();
    assert_eq!(clock.current_flaps().0, 31);
    clock.tick();
    clock.tick();
    assert_eq!(clock.current_flaps().0, 33);
    assert_eq!(clock.stats().minute_advances, 3);
}

#[test]
fn test_drift_triggers_single_reinitialize() {
    let bench = Bench::new(tuesday(10, 30));
    let mut clock = bench.orchestrator();
    assert!(clock.initialize());
    assert_eq!(clock.current_flaps().0, 30);

    // Wheel slips back onto the endstop
    bench.minutes.slip(-(30 * 93));
    assert!(clock.endstops().0);
    bench.set_time(10, 31);

    clock.tick();

    assert_eq!(clock.stats().initializations, 2);
    assert_eq!(clock.stats().drift_events, 1);
    assert_eq!(clock.stats().minute_advances, 0);
    assert_eq!(clock.last_fault(), Some(Fault::DriftDetected(Axis::Minutes)));
    assert_eq!(
        count(&clock, |e| *e == LogEvent::DriftDetected(Axis::Minutes)),
        1
    );
    assert_eq!(clock.state(), ClockState::Running);
    assert_eq!(clock.current_flaps(), (31, 10));
    assert_eq!(bench.angles().0, 31 * 93);

    // Physically consistent again: no further re-home
    clock.tick();
    assert_eq!(clock.stats().initializations, 2);
}

#[test]
fn test_hours_drift_detected() {
    let bench = Bench::new(tuesday(10, 30));
    let mut clock = bench.orchestrator();
    assert!(clock.initialize());

    bench.hours.force_endstop(Some(true));
    clock.tick();
    bench.hours.force_endstop(None);

    assert_eq!(clock.last_fault(), Some(Fault::DriftDetected(Axis::Hours)));
    assert_eq!(clock.stats().initializations, 2);
}

#[test]
fn test_drift_ignored_on_home_flap() {
    let bench = Bench::new(tuesday(10, 0));
    let mut clock = bench.orchestrator();
    assert!(clock.initialize());
    assert!(clock.endstops().0);

    clock.tick();
    assert_eq!(clock.stats().drift_events, 0);
}

#[test]
fn test_hourly_alignment() {
    let bench = Bench::new(tuesday(10, 59));
    let mut clock = bench.orchestrator();
    assert!(clock.initialize());

    bench.set_time(11, 0);
    clock.tick();
    assert_eq!(clock.state(), ClockState::MinuteAlign);
    assert!(clock.axis(Axis::Minutes).is_moving());

    tick_until(&mut clock, 10_000, |c| c.state() == ClockState::Running);

    assert_eq!(clock.current_flaps(), (0, 11));
    assert_eq!(bench.angles().0, 0);
    assert_eq!(clock.stats().alignments, 1);
    assert_eq!(clock.stats().initializations, 1);
    assert!(!clock.axis(Axis::Minutes).is_moving());

    // Next minute continues normally
    bench.set_time(11, 1);
    clock.tick();
    assert_eq!(clock.current_flaps(), (1, 11));
}

#[test]
fn test_alignment_exhaustion_halts() {
    let bench = Bench::new(tuesday(10, 59));
    bench.config.borrow_mut().align_retries = 1;
    let mut clock = bench.orchestrator();
    assert!(clock.initialize());

    bench.minutes.disconnect_endstop();
    let before = bench.minutes.steps_taken();
    bench.set_time(11, 0);
    tick_until(&mut clock, 200_000, |c| c.state() == ClockState::ErrorState);

    assert_eq!(clock.last_fault(), Some(Fault::AlignmentFailed));
    assert_eq!(
        count(&clock, |e| matches!(e, LogEvent::AlignRetry { attempt: 2 })),
        1
    );
    assert_eq!(count(&clock, |e| *e == LogEvent::AlignmentFailed), 1);
    assert!(!clock.axis(Axis::Minutes).is_moving());
    // Two sweeps of two revolutions each
    assert_eq!(
        bench.minutes.steps_taken() - before,
        4 * MINUTES_REV as u64
    );

    let taken = bench.minutes.steps_taken();
    for _ in 0..1_000 {
        clock.tick();
    }
    assert_eq!(bench.minutes.steps_taken(), taken);
}

#[test]
fn test_scheduled_rehome_at_midnight() {
    let bench = Bench::new(tuesday(23, 59));
    let mut clock = bench.orchestrator();
    assert!(clock.initialize());
    assert_eq!(clock.current_flaps(), (59, 23));

    bench
        .time
        .set(Some(WallTime::with_weekday(0, 0, Weekday::Wednesday)));
    clock.tick();

    assert_eq!(clock.stats().scheduled_rehomes, 1);
    assert_eq!(clock.stats().initializations, 2);
    assert_eq!(clock.state(), ClockState::Running);
    assert_eq!(clock.current_flaps(), (0, 0));
    assert_eq!(bench.angles(), (0, 0));
    assert_eq!(
        count(&clock, |e| *e == LogEvent::ScheduledRehome { hour: 0 }),
        1
    );
}

#[test]
fn test_twelve_hour_noon_rehome_and_mapping() {
    let bench = Bench::new(tuesday(11, 59));
    bench.config.borrow_mut().display_mode = DisplayMode::TwelveHour;
    let mut clock = bench.orchestrator();
    assert!(clock.initialize());
    assert_eq!(clock.current_flaps(), (59, 11));

    bench.set_time(12, 0);
    clock.tick();
    assert_eq!(clock.stats().scheduled_rehomes, 1);
    assert_eq!(clock.current_flaps(), (0, 12));

    // 12:59 -> 13:00 is an ordinary alignment onto flap 1
    bench.set_time(12, 59);
    for _ in 0..59 {
        clock.tick();
    }
    assert_eq!(clock.current_flaps(), (59, 12));
    bench.set_time(13, 0);
    tick_until(&mut clock, 10_000, |c| {
        c.state() == ClockState::Running && c.current_flaps().0 == 0
    });
    assert_eq!(clock.current_flaps(), (0, 1));
}

#[test]
fn test_display_mode_change_takes_effect() {
    let bench = Bench::new(tuesday(15, 10));
    let mut clock = bench.orchestrator();
    assert!(clock.initialize());
    assert_eq!(clock.current_flaps().1, 15);

    bench.config.borrow_mut().display_mode = DisplayMode::TwelveHour;
    clock.tick();
    assert_eq!(clock.current_flaps(), (10, 3));
    assert_eq!(clock.stats().initializations, 1);
    // Forward through the home flap: 15 + 12 flaps
    assert!((bench.angles().1 - 511).abs() <= 1);

    bench.set_time(15, 11);
    for _ in 0..10 {
        clock.tick();
    }
    assert_eq!(clock.current_flaps(), (11, 3));
}

#[test]
fn test_hour_change_without_wrap_moves_hours() {
    let bench = Bench::new(tuesday(10, 30));
    let mut clock = bench.orchestrator();
    assert!(clock.initialize());

    let hour_moves = clock.axis(Axis::Hours).engine().moves_started();
    bench.set_time(11, 45);
    clock.tick();
    assert_eq!(clock.current_flaps(), (30, 11));
    assert_eq!(
        clock.axis(Axis::Hours).engine().moves_started(),
        hour_moves + 1
    );
    assert_eq!(clock.state(), ClockState::Running);

    for _ in 0..40 {
        clock.tick();
    }
    assert_eq!(clock.current_flaps(), (45, 11));
    assert_eq!(bench.angles().0, 45 * 93);
    assert_eq!(clock.stats().minute_advances, 15);
    assert_eq!(clock.stats().alignments, 0);
}

#[test]
fn test_quiet_hours_suppress_motion_then_catch_up() {
    let bench = Bench::new(tuesday(21, 59));
    bench.quiet_nights();
    let mut clock = bench.orchestrator();
    assert!(clock.initialize());
    assert_eq!(clock.state(), ClockState::Running);

    bench.set_time(22, 0);
    clock.tick();
    assert_eq!(clock.state(), ClockState::QuietMode);

    let taken = (bench.minutes.steps_taken(), bench.hours.steps_taken());
    for minute in 1..60 {
        bench.set_time(22, minute);
        clock.tick();
    }
    bench.set_time(3, 15);
    clock.tick();
    assert_eq!(clock.state(), ClockState::QuietMode);
    assert_eq!(
        (bench.minutes.steps_taken(), bench.hours.steps_taken()),
        taken
    );

    bench.set_time(7, 5);
    clock.tick();
    assert_eq!(clock.state(), ClockState::Running);
    assert_eq!(clock.current_flaps(), (5, 7));
    assert_eq!(bench.angles().0, 5 * 93);
    assert_eq!(count(&clock, |e| *e == LogEvent::QuietStarted), 1);
    assert_eq!(count(&clock, |e| *e == LogEvent::QuietEnded), 1);
}

#[test]
fn test_initialize_inside_quiet_window_stays_home() {
    let bench = Bench::new(tuesday(23, 0));
    bench.quiet_nights();
    let mut clock = bench.orchestrator();

    assert!(clock.initialize());
    assert_eq!(clock.state(), ClockState::QuietMode);
    assert_eq!(clock.current_flaps(), (0, 0));
    assert_eq!(bench.angles(), (0, 0));
}

#[test]
fn test_quiet_disabled_without_weekday() {
    let bench = Bench::new(Some(WallTime::new(23, 0)));
    bench.quiet_nights();
    let mut clock = bench.orchestrator();

    assert!(clock.initialize());
    assert_eq!(clock.state(), ClockState::Running);
}

#[test]
fn test_time_unavailable_waits_in_idle() {
    let bench = Bench::new(None);
    let mut clock = bench.orchestrator();

    assert!(clock.initialize());
    assert_eq!(clock.state(), ClockState::Idle);
    assert_eq!(count(&clock, |e| *e == LogEvent::TimeUnavailable), 1);
    let latest = clock.event_log().latest().unwrap();
    assert_eq!(format!("{}", latest), "[--:--] time unavailable");

    clock.tick();
    assert_eq!(clock.state(), ClockState::Idle);

    bench.set_time(8, 15);
    clock.tick();
    assert_eq!(clock.state(), ClockState::Running);
    assert_eq!(clock.current_flaps(), (15, 8));
}

#[test]
fn test_out_of_range_reading_counts_as_unavailable() {
    let bench = Bench::new(Some(WallTime::new(25, 70)));
    let mut clock = bench.orchestrator();

    assert!(clock.initialize());
    assert_eq!(clock.state(), ClockState::Idle);
    assert_eq!(clock.current_flaps(), (0, 0));
    assert_eq!(count(&clock, |e| *e == LogEvent::TimeUnavailable), 1);

    bench.set_time(9, 5);
    clock.tick();
    assert_eq!(clock.state(), ClockState::Running);
    assert_eq!(clock.current_flaps(), (5, 9));
}

#[test]
fn test_minutes_homing_failure_shows_code() {
    let bench = Bench::new(tuesday(10, 30));
    bench.config.borrow_mut().homing_timeout_ms = 20_000;
    bench.minutes.disconnect_endstop();
    let mut clock = bench.orchestrator();

    assert!(!clock.initialize());
    assert_eq!(clock.state(), ClockState::ErrorState);
    assert_eq!(clock.last_fault(), Some(Fault::HomingTimeout(Axis::Minutes)));
    assert_eq!(clock.current_flaps(), (1, 1));
    assert_eq!(bench.angles().1, 171);
    assert_eq!(
        count(&clock, |e| *e
            == LogEvent::SystemError {
                hour_code: 1,
                minute_code: 1
            }),
        1
    );

    let taken = (bench.minutes.steps_taken(), bench.hours.steps_taken());
    for _ in 0..100 {
        clock.tick();
    }
    assert!(!clock.initialize());
    assert_eq!(
        (bench.minutes.steps_taken(), bench.hours.steps_taken()),
        taken
    );
}

#[test]
fn test_hours_homing_failure_shows_code() {
    let bench = Bench::new(tuesday(10, 30));
    bench.config.borrow_mut().homing_timeout_ms = 20_000;
    bench.hours.disconnect_endstop();
    let mut clock = bench.orchestrator();

    assert!(!clock.initialize());
    assert_eq!(clock.state(), ClockState::ErrorState);
    assert_eq!(clock.last_fault(), Some(Fault::HomingTimeout(Axis::Hours)));
    assert_eq!(clock.current_flaps(), (2, 1));
    assert_eq!(bench.angles().0, 2 * 93);
}

#[test]
fn test_both_homing_failures_halt_without_code() {
    let bench = Bench::new(tuesday(10, 30));
    bench.config.borrow_mut().homing_timeout_ms = 1_000;
    bench.minutes.disconnect_endstop();
    bench.hours.disconnect_endstop();
    let mut clock = bench.orchestrator();

    assert!(!clock.initialize());
    assert_eq!(clock.state(), ClockState::ErrorState);
    assert_eq!(
        count(&clock, |e| matches!(e, LogEvent::SystemError { .. })),
        0
    );
    assert_eq!(
        count(&clock, |e| matches!(e, LogEvent::HomingFailed(_))),
        2
    );
}

#[test]
fn test_display_system_error() {
    let bench = Bench::new(None);
    let mut clock = bench.orchestrator();
    assert!(clock.initialize());
    assert_eq!(clock.state(), ClockState::Idle);

    assert!(clock.display_fault_code(FaultCode::TIME_UNAVAILABLE));
    assert_eq!(clock.state(), ClockState::ErrorState);
    assert_eq!(clock.current_flaps(), (1, 3));
    assert_eq!(
        clock.last_fault(),
        Some(Fault::SystemError {
            hour_code: 3,
            minute_code: 1
        })
    );
    assert!(!clock.display_system_error(3, 2));
}

#[test]
fn test_display_error_codes_wrap_to_wheel() {
    let bench = Bench::new(None);
    let mut clock = bench.orchestrator();
    assert!(clock.display_system_error(26, 61));
    assert_eq!(clock.current_flaps(), (1, 2));
}

#[test]
fn test_display_error_with_failed_homing_is_catastrophic() {
    let bench = Bench::new(None);
    let mut clock = bench.orchestrator();
    assert!(clock.initialize());

    bench.config.borrow_mut().homing_timeout_ms = 1_000;
    bench.hours.set_position(100);
    bench.hours.disconnect_endstop();
    assert!(!clock.display_fault_code(FaultCode::NETWORK_UNAVAILABLE));
    assert_eq!(clock.state(), ClockState::ErrorState);
    assert_eq!(clock.last_fault(), Some(Fault::CatastrophicHomingFailure));
    assert_eq!(clock.current_flaps().0, 0);
}

#[test]
fn test_calibration_flow() {
    let bench = Bench::new(tuesday(10, 30));
    let mut clock = bench.orchestrator();
    assert!(clock.initialize());

    assert!(!clock.jog(Axis::Minutes, 1));
    assert!(clock.enter_calibration());
    assert_eq!(clock.state(), ClockState::CalibrationMode);
    assert!(!clock.axis(Axis::Minutes).is_moving());

    // Time passing does not move anything
    bench.set_time(10, 31);
    clock.tick();
    assert_eq!(clock.current_flaps(), (30, 10));
    assert!(!clock.initialize());

    assert!(clock.jog(Axis::Minutes, 10));
    assert_eq!(clock.current_flaps().0, 40);

    assert!(clock.home_axis(Axis::Minutes));
    assert_eq!(clock.measure_revolution(Axis::Minutes), Some(MINUTES_REV));

    assert!(!clock.set_steps_per_flap(Axis::Minutes, 0.0));
    assert!(!clock.set_steps_per_flap(Axis::Minutes, f64::NAN));
    assert!(clock.set_steps_per_flap(Axis::Minutes, 93.25));
    let data = clock.calibration_data();
    assert_eq!(data.minutes_milli_steps, 93_250);
    assert_eq!(data.hours_milli_steps, 170_500);
    assert_eq!(data.validate(), Ok(()));
    assert!(clock.set_steps_per_flap(Axis::Minutes, 93.0));

    assert!(clock.exit_calibration());
    assert_eq!(clock.state(), ClockState::Running);
    assert_eq!(clock.current_flaps(), (31, 10));
    assert_eq!(count(&clock, |e| *e == LogEvent::CalibrationEntered), 1);
    assert_eq!(count(&clock, |e| *e == LogEvent::CalibrationExited), 1);
    assert!(!clock.exit_calibration());
}

#[test]
fn test_calibration_refused_when_halted() {
    let bench = Bench::new(None);
    let mut clock = bench.orchestrator();
    assert!(clock.display_fault_code(FaultCode::NETWORK_UNAVAILABLE));
    assert!(!clock.enter_calibration());
    assert_eq!(clock.state(), ClockState::ErrorState);
}

#[test]
fn test_journal_stamps_use_time_source() {
    let bench = Bench::new(tuesday(10, 30));
    let mut clock = bench.orchestrator();
    assert!(clock.initialize());

    bench.minutes.slip(-(30 * 93));
    bench.set_time(10, 31);
    clock.tick();

    let drift = clock
        .event_log()
        .iter()
        .find(|e| e.event == LogEvent::DriftDetected(Axis::Minutes))
        .unwrap();
    assert_eq!(
        format!("{}", drift),
        "[10:31] minutes drift detected, re-homing"
    );
}
