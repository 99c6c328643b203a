//! Wall-clock time and the time source interface
//!
//! The clock only needs hour, minute and (optionally) day-of-week. Where the
//! time comes from (network sync, RTC, manual entry) is the time source's
//! business; the orchestrator treats every source the same way.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minutes in a day
pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Day of week, Sunday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    /// All days, Sunday first
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Day from its index (0 = Sunday)
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Index with Sunday = 0
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Day `days` after this one (negative goes backwards)
    pub fn shifted(self, days: i32) -> Self {
        let index = (self.index() as i32 + days).rem_euclid(7);
        Self::ALL[index as usize]
    }

    /// Three-letter lowercase abbreviation ("sun", "mon", ...)
    pub fn abbrev(self) -> &'static str {
        match self {
            Weekday::Sunday => "sun",
            Weekday::Monday => "mon",
            Weekday::Tuesday => "tue",
            Weekday::Wednesday => "wed",
            Weekday::Thursday => "thu",
            Weekday::Friday => "fri",
            Weekday::Saturday => "sat",
        }
    }

    /// Parse a day name or abbreviation (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.len() < 3 {
            return None;
        }
        let prefix = &name.as_bytes()[..3];
        Self::ALL
            .iter()
            .copied()
            .find(|d| prefix.eq_ignore_ascii_case(d.abbrev().as_bytes()))
    }
}

/// Local wall-clock reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WallTime {
    /// Hour, 0-23
    pub hour: u8,
    /// Minute, 0-59
    pub minute: u8,
    /// Day of week, if the source is calendar-aware
    pub weekday: Option<Weekday>,
}

impl WallTime {
    /// Create a reading without day-of-week
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self {
            hour,
            minute,
            weekday: None,
        }
    }

    /// Create a calendar-aware reading
    pub const fn with_weekday(hour: u8, minute: u8, weekday: Weekday) -> Self {
        Self {
            hour,
            minute,
            weekday: Some(weekday),
        }
    }

    /// Check hour and minute are in range
    pub fn is_valid(&self) -> bool {
        self.hour < 24 && self.minute < 60
    }

    /// Minutes since midnight
    pub fn minute_of_day(&self) -> i32 {
        self.hour as i32 * 60 + self.minute as i32
    }

    /// Shift by a number of minutes, rolling the weekday across midnight
    pub fn offset_by(&self, minutes: i32) -> Self {
        let total = self.minute_of_day() + minutes;
        let days = total.div_euclid(MINUTES_PER_DAY);
        let in_day = total.rem_euclid(MINUTES_PER_DAY);
        Self {
            hour: (in_day / 60) as u8,
            minute: (in_day % 60) as u8,
            weekday: self.weekday.map(|d| d.shifted(days)),
        }
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Source of the current wall-clock time
pub trait TimeSource {
    /// Current local time, or `None` if time is not available yet
    ///
    /// A reading without a weekday means the source is not calendar-aware
    /// (manual entry); quiet hours are disabled for such sources.
    fn now(&self) -> Option<WallTime>;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Option<WallTime> {
        (**self).now()
    }
}

/// Placeholder calendar date for seeding a hardware RTC from a [`WallTime`]
///
/// The clock never needs the date, but an RTC keeps one and survives warm
/// resets. Seeds that carry a weekday are written in [`CALENDAR_YEAR`];
/// time-only seeds are written decades earlier, so the year read back tells
/// whether the stored weekday is real. The RTC's own rollover would take
/// twenty years to cross that boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SeedDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl SeedDate {
    /// First year of calendar-aware seeds
    pub const CALENDAR_YEAR: u16 = 2024;
    /// Year written for time-only seeds
    pub const TIME_ONLY_YEAR: u16 = 2000;

    /// Seed date for a local reading
    pub const fn for_time(time: &WallTime) -> Self {
        let year = if time.weekday.is_some() {
            Self::CALENDAR_YEAR
        } else {
            Self::TIME_ONLY_YEAR
        };
        Self {
            year,
            month: 1,
            day: 1,
        }
    }

    /// Check if an RTC reading in `year` came from a calendar-aware seed
    pub const fn is_calendar_aware(year: u16) -> bool {
        year >= Self::CALENDAR_YEAR
    }
}

/// Time source that never has a reading
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTime;

impl TimeSource for NoTime {
    fn now(&self) -> Option<WallTime> {
        None
    }
}
