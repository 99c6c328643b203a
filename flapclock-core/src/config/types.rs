//! Configuration type definitions

use heapless::Vec;

use crate::axis::Axis;
use crate::schedule::{hour_flap, is_quiet, DisplayMode, QuietSchedule, MAX_QUIET_SCHEDULES};
use crate::time::WallTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default minutes-wheel steps per flap
pub const DEFAULT_MINUTES_STEPS_PER_FLAP: f64 = 93.0;

/// Default hours-wheel steps per flap
pub const DEFAULT_HOURS_STEPS_PER_FLAP: f64 = 170.5;

/// Default flap speed (steps/s)
pub const DEFAULT_SPEED: u16 = 500;

/// Default homing and alignment speed (steps/s)
pub const DEFAULT_HOMING_SPEED: u16 = 400;

/// Default homing window per axis
pub const DEFAULT_HOMING_TIMEOUT_MS: u32 = 30_000;

/// Default extra alignment sweeps before giving up
pub const DEFAULT_ALIGN_RETRIES: u8 = 3;

/// Per-axis mechanical and drive settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisConfig {
    /// Measured half-steps per flap (generally non-integer)
    pub steps_per_flap: f64,
    /// Coil wiring mirrored
    pub reversed: bool,
    /// Stepping rate for flap moves
    pub speed_steps_per_s: u16,
    /// Stepping rate for homing and alignment sweeps
    pub homing_speed_steps_per_s: u16,
    /// Endstop pulls the input low when triggered
    pub endstop_active_low: bool,
}

impl AxisConfig {
    /// Defaults for the given wheel
    pub const fn for_axis(axis: Axis) -> Self {
        let steps_per_flap = match axis {
            Axis::Minutes => DEFAULT_MINUTES_STEPS_PER_FLAP,
            Axis::Hours => DEFAULT_HOURS_STEPS_PER_FLAP,
        };
        Self {
            steps_per_flap,
            reversed: false,
            speed_steps_per_s: DEFAULT_SPEED,
            homing_speed_steps_per_s: DEFAULT_HOMING_SPEED,
            endstop_active_low: true,
        }
    }
}

/// Complete clock configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockConfig {
    /// 12/24-hour dial
    pub display_mode: DisplayMode,
    /// Offset from UTC in minutes
    pub utc_offset_minutes: i16,
    /// Daylight saving adds one hour
    pub dst: bool,
    /// Master switch for all quiet schedules
    pub quiet_enabled: bool,
    /// Quiet-hours windows
    pub quiet_schedules: Vec<QuietSchedule, MAX_QUIET_SCHEDULES>,
    /// Minutes wheel
    pub minutes: AxisConfig,
    /// Hours wheel
    pub hours: AxisConfig,
    /// Homing window per axis
    pub homing_timeout_ms: u32,
    /// Extra alignment sweeps after the first one misses the endstop
    pub align_retries: u8,
    /// Manually entered local time, used to seed an RTC that is not running
    pub manual_time: Option<WallTime>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockConfig {
    /// Default configuration: 24-hour UTC, no quiet hours
    pub const fn new() -> Self {
        Self {
            display_mode: DisplayMode::TwentyFourHour,
            utc_offset_minutes: 0,
            dst: false,
            quiet_enabled: false,
            quiet_schedules: Vec::new(),
            minutes: AxisConfig::for_axis(Axis::Minutes),
            hours: AxisConfig::for_axis(Axis::Hours),
            homing_timeout_ms: DEFAULT_HOMING_TIMEOUT_MS,
            align_retries: DEFAULT_ALIGN_RETRIES,
            manual_time: None,
        }
    }

    /// Settings for one wheel
    pub fn axis(&self, axis: Axis) -> &AxisConfig {
        match axis {
            Axis::Minutes => &self.minutes,
            Axis::Hours => &self.hours,
        }
    }

    /// Mutable settings for one wheel
    pub fn axis_mut(&mut self, axis: Axis) -> &mut AxisConfig {
        match axis {
            Axis::Minutes => &mut self.minutes,
            Axis::Hours => &mut self.hours,
        }
    }

    /// UTC offset including DST
    pub fn effective_offset_minutes(&self) -> i32 {
        self.utc_offset_minutes as i32 + if self.dst { 60 } else { 0 }
    }

    /// Check whether motion is suppressed at `time`
    pub fn is_quiet_at(&self, time: &WallTime) -> bool {
        self.quiet_enabled && is_quiet(time, &self.quiet_schedules)
    }

    /// Hours-wheel flap for an hour in the configured display mode
    pub fn hour_flap(&self, hour: u8) -> u8 {
        hour_flap(hour, self.display_mode)
    }

    /// Add a quiet schedule
    ///
    /// Returns the schedule back if the table is full.
    pub fn add_quiet_schedule(&mut self, schedule: QuietSchedule) -> Result<(), QuietSchedule> {
        self.quiet_schedules.push(schedule)
    }
}
