//! Line-oriented parser for the clock configuration file
//!
//! Handles only the TOML subset the clock needs, without allocation:
//!
//! - `[clock]`, `[axis.minutes]`, `[axis.hours]`, `[quiet]`,
//!   `[quiet.<label>]` and `[time]` section headers
//! - `key = value` pairs: quoted/unquoted strings, integers, floats, booleans
//! - Single-line string arrays for day lists: `days = ["mon", "tue"]`
//! - Comments (`# ...`), including trailing comments
//!
//! Unknown sections and keys are rejected so typos surface at load time.

use heapless::String as HString;

use super::types::{AxisConfig, ClockConfig};
use crate::axis::Axis;
use crate::schedule::{DayMask, DisplayMode, QuietSchedule, MAX_LABEL_LEN};
use crate::time::{WallTime, Weekday};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in the current section
    UnknownKey,
    /// Value has the wrong type or format
    InvalidValue,
    /// Value outside its allowed range
    OutOfRange,
    /// Too many quiet schedules
    TooManyItems,
    /// `[time]` section without both `hour` and `minute`
    IncompleteTime,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Clock,
    Axis(Axis),
    Quiet,
    QuietSchedule,
    Time,
}

/// Partially read `[time]` section
#[derive(Default)]
struct ManualTime {
    hour: Option<u8>,
    minute: Option<u8>,
    weekday: Option<Weekday>,
    seen: bool,
}

impl ManualTime {
    fn finish(self) -> Result<Option<WallTime>, ParseError> {
        if !self.seen {
            return Ok(None);
        }
        match (self.hour, self.minute) {
            (Some(hour), Some(minute)) => Ok(Some(WallTime {
                hour,
                minute,
                weekday: self.weekday,
            })),
            _ => Err(ParseError::IncompleteTime),
        }
    }
}

/// Parse configuration text into a [`ClockConfig`]
///
/// Settings not mentioned keep their defaults.
pub fn parse_config(input: &str) -> Result<ClockConfig, ParseError> {
    let mut config = ClockConfig::new();
    let mut section = Section::Root;
    let mut current_quiet: Option<QuietSchedule> = None;
    let mut manual = ManualTime::default();

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line);
            if !header.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            save_quiet(&mut config, &mut current_quiet)?;

            let (next, label) = parse_section_header(&header[1..header.len() - 1])?;
            section = next;
            match section {
                Section::QuietSchedule => {
                    current_quiet = Some(QuietSchedule {
                        label: label.unwrap_or_default(),
                        start_hour: 0,
                        end_hour: 0,
                        days: DayMask::ALL,
                    });
                }
                Section::Time => manual.seen = true,
                _ => {}
            }
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        match section {
            Section::Root => return Err(ParseError::UnknownKey),
            Section::Clock => apply_clock(&mut config, key, value)?,
            Section::Axis(axis) => apply_axis(config.axis_mut(axis), key, value)?,
            Section::Quiet => match key {
                "enabled" => config.quiet_enabled = parse_bool(value)?,
                _ => return Err(ParseError::UnknownKey),
            },
            Section::QuietSchedule => {
                if let Some(schedule) = current_quiet.as_mut() {
                    apply_quiet(schedule, key, value)?;
                }
            }
            Section::Time => apply_time(&mut manual, key, value)?,
        }
    }

    save_quiet(&mut config, &mut current_quiet)?;
    config.manual_time = manual.finish()?;

    Ok(config)
}

/// Parse section header like "clock", "axis.minutes" or "quiet.weeknights"
fn parse_section_header(
    header: &str,
) -> Result<(Section, Option<HString<MAX_LABEL_LEN>>), ParseError> {
    let header = header.trim();

    if let Some((kind, name)) = header.split_once('.') {
        let name = name.trim();
        return match kind.trim() {
            "axis" => match name {
                "minutes" => Ok((Section::Axis(Axis::Minutes), None)),
                "hours" => Ok((Section::Axis(Axis::Hours), None)),
                _ => Err(ParseError::InvalidSection),
            },
            "quiet" if !name.is_empty() && !name.contains('.') => {
                let label = HString::try_from(name).map_err(|_| ParseError::InvalidSection)?;
                Ok((Section::QuietSchedule, Some(label)))
            }
            _ => Err(ParseError::InvalidSection),
        };
    }

    match header {
        "clock" => Ok((Section::Clock, None)),
        "quiet" => Ok((Section::Quiet, None)),
        "time" => Ok((Section::Time, None)),
        _ => Err(ParseError::InvalidSection),
    }
}

fn save_quiet(
    config: &mut ClockConfig,
    current: &mut Option<QuietSchedule>,
) -> Result<(), ParseError> {
    if let Some(schedule) = current.take() {
        config
            .add_quiet_schedule(schedule)
            .map_err(|_| ParseError::TooManyItems)?;
    }
    Ok(())
}

fn apply_clock(config: &mut ClockConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "display" => {
            config.display_mode =
                DisplayMode::parse(parse_string(value)).ok_or(ParseError::InvalidValue)?
        }
        "utc_offset_minutes" => {
            let offset: i16 = parse_int(value)?;
            if !(-720..=840).contains(&offset) {
                return Err(ParseError::OutOfRange);
            }
            config.utc_offset_minutes = offset;
        }
        "dst" => config.dst = parse_bool(value)?,
        "homing_timeout_ms" => {
            config.homing_timeout_ms = parse_int(value)?;
            if config.homing_timeout_ms == 0 {
                return Err(ParseError::OutOfRange);
            }
        }
        "align_retries" => config.align_retries = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_axis(axis: &mut AxisConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "steps_per_flap" => {
            let steps: f64 = parse_int(value)?;
            if !steps.is_finite() || steps < 1.0 {
                return Err(ParseError::OutOfRange);
            }
            axis.steps_per_flap = steps;
        }
        "reversed" => axis.reversed = parse_bool(value)?,
        "speed" => axis.speed_steps_per_s = parse_speed(value)?,
        "homing_speed" => axis.homing_speed_steps_per_s = parse_speed(value)?,
        "endstop_active_low" => axis.endstop_active_low = parse_bool(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_quiet(schedule: &mut QuietSchedule, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "start" => schedule.start_hour = parse_hour(value)?,
        "end" => schedule.end_hour = parse_hour(value)?,
        "days" => schedule.days = parse_days(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_time(manual: &mut ManualTime, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "hour" => manual.hour = Some(parse_hour(value)?),
        "minute" => {
            let minute: u8 = parse_int(value)?;
            if minute >= 60 {
                return Err(ParseError::OutOfRange);
            }
            manual.minute = Some(minute);
        }
        "weekday" => {
            manual.weekday =
                Some(Weekday::parse(parse_string(value)).ok_or(ParseError::InvalidValue)?)
        }
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Parse "key = value" line, dropping a trailing comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = strip_comment(value.trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Remove a `#` comment that is not inside a string
fn strip_comment(value: &str) -> &str {
    let mut in_string = false;
    for (i, c) in value.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return value[..i].trim(),
            _ => {}
        }
    }
    value
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Parse a numeric value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_hour(value: &str) -> Result<u8, ParseError> {
    let hour: u8 = parse_int(value)?;
    if hour >= 24 {
        return Err(ParseError::OutOfRange);
    }
    Ok(hour)
}

fn parse_speed(value: &str) -> Result<u16, ParseError> {
    let speed: u16 = parse_int(value)?;
    if speed == 0 {
        return Err(ParseError::OutOfRange);
    }
    Ok(speed)
}

/// Parse a day list: `["mon", "tue"]`, or one of "all", "weekdays", "weekend"
fn parse_days(value: &str) -> Result<DayMask, ParseError> {
    if let Some(list) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        let mut mask = DayMask::NONE;
        for item in list.split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let day = Weekday::parse(parse_string(item)).ok_or(ParseError::InvalidValue)?;
            mask.insert(day);
        }
        return Ok(mask);
    }

    match parse_string(value) {
        "all" | "daily" => Ok(DayMask::ALL),
        "weekdays" => Ok(DayMask::WEEKDAYS),
        "weekend" | "weekends" => Ok(DayMask::WEEKEND),
        _ => Err(ParseError::InvalidValue),
    }
}
