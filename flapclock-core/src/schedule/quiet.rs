//! Quiet hours
//!
//! A schedule suppresses flap motion between a start and end hour on the
//! days in its mask. Windows with `start > end` run overnight. Several
//! schedules are evaluated independently; any match means quiet.

use heapless::String;

use crate::time::{WallTime, Weekday};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Maximum quiet schedules per config
pub const MAX_QUIET_SCHEDULES: usize = 4;

/// Set of weekdays, bit `n` = day index `n` (Sunday = bit 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DayMask(pub u8);

impl DayMask {
    /// No days
    pub const NONE: DayMask = DayMask(0);
    /// Every day
    pub const ALL: DayMask = DayMask(0b0111_1111);
    /// Monday to Friday
    pub const WEEKDAYS: DayMask = DayMask(0b0011_1110);
    /// Saturday and Sunday
    pub const WEEKEND: DayMask = DayMask(0b0100_0001);

    /// Build a mask from a list of days
    pub fn from_days(days: &[Weekday]) -> Self {
        DayMask(days.iter().fold(0, |bits, d| bits | (1 << d.index())))
    }

    /// Check if a day is in the mask
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.index()) != 0
    }

    /// Add a day
    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.index();
    }

    /// Check if no day is set
    pub fn is_empty(self) -> bool {
        self.0 & Self::ALL.0 == 0
    }
}

/// One quiet window
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuietSchedule {
    /// Display label ("A", "weeknights", ...)
    pub label: String<MAX_LABEL_LEN>,
    /// First quiet hour (inclusive)
    pub start_hour: u8,
    /// First non-quiet hour (exclusive)
    pub end_hour: u8,
    /// Days the window starts on
    pub days: DayMask,
}

impl QuietSchedule {
    /// Create a schedule; labels longer than [`MAX_LABEL_LEN`] are truncated
    pub fn new(label: &str, start_hour: u8, end_hour: u8, days: DayMask) -> Self {
        let mut l = String::new();
        for c in label.chars() {
            if l.push(c).is_err() {
                break;
            }
        }
        Self {
            label: l,
            start_hour,
            end_hour,
            days,
        }
    }

    /// Whether the window spans midnight
    pub fn is_overnight(&self) -> bool {
        self.start_hour > self.end_hour
    }

    /// Check the window against an hour on a given day
    ///
    /// The day mask is checked against today; an equal start and end hour
    /// describes an empty window.
    pub fn is_active(&self, hour: u8, day: Weekday) -> bool {
        if !self.days.contains(day) {
            return false;
        }

        if self.is_overnight() {
            hour >= self.start_hour || hour < self.end_hour
        } else {
            self.start_hour <= hour && hour < self.end_hour
        }
    }
}

/// Check whether any schedule silences the clock at `time`
///
/// Always false for sources without a weekday.
pub fn is_quiet(time: &WallTime, schedules: &[QuietSchedule]) -> bool {
    let Some(day) = time.weekday else {
        return false;
    };
    schedules.iter().any(|s| s.is_active(time.hour, day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn schedule_a() -> QuietSchedule {
        QuietSchedule::new(
            "A",
            21,
            7,
            DayMask::from_days(&[
                Weekday::Monday,
                Weekday::Tuesday,
                Weekday::Wednesday,
                Weekday::Thursday,
            ]),
        )
    }

    #[test]
    fn test_overnight_window_on_listed_day() {
        let schedules = [schedule_a()];
        assert!(is_quiet(
            &WallTime::with_weekday(22, 0, Weekday::Tuesday),
            &schedules
        ));
        assert!(is_quiet(
            &WallTime::with_weekday(6, 59, Weekday::Tuesday),
            &schedules
        ));
        assert!(!is_quiet(
            &WallTime::with_weekday(10, 0, Weekday::Tuesday),
            &schedules
        ));
        assert!(!is_quiet(
            &WallTime::with_weekday(7, 0, Weekday::Tuesday),
            &schedules
        ));
    }

    #[test]
    fn test_day_not_in_mask() {
        let schedules = [schedule_a()];
        assert!(!is_quiet(
            &WallTime::with_weekday(22, 0, Weekday::Friday),
            &schedules
        ));
    }

    #[test]
    fn test_second_schedule_covers_friday() {
        let b = QuietSchedule::new(
            "B",
            22,
            9,
            DayMask::from_days(&[Weekday::Friday, Weekday::Saturday]),
        );
        let schedules = [schedule_a(), b];
        assert!(is_quiet(
            &WallTime::with_weekday(22, 0, Weekday::Friday),
            &schedules
        ));
        // 21:00 Friday is only covered by A's hours, and A excludes Friday
        assert!(!is_quiet(
            &WallTime::with_weekday(21, 0, Weekday::Friday),
            &schedules
        ));
    }

    #[test]
    fn test_same_day_window() {
        let s = QuietSchedule::new("lunch", 12, 14, DayMask::ALL);
        assert!(!s.is_active(11, Weekday::Sunday));
        assert!(s.is_active(12, Weekday::Sunday));
        assert!(s.is_active(13, Weekday::Sunday));
        assert!(!s.is_active(14, Weekday::Sunday));
    }

    #[test]
    fn test_equal_start_end_is_empty() {
        let s = QuietSchedule::new("none", 5, 5, DayMask::ALL);
        for hour in 0..24 {
            assert!(!s.is_active(hour, Weekday::Monday));
        }
    }

    #[test]
    fn test_no_weekday_disables_quiet_hours() {
        let schedules = [QuietSchedule::new("all", 0, 23, DayMask::ALL)];
        assert!(!is_quiet(&WallTime::new(3, 0), &schedules));
    }

    #[test]
    fn test_day_mask_constants() {
        assert!(DayMask::WEEKDAYS.contains(Weekday::Monday));
        assert!(!DayMask::WEEKDAYS.contains(Weekday::Sunday));
        assert!(DayMask::WEEKEND.contains(Weekday::Saturday));
        assert!(DayMask::NONE.is_empty());
        let mut m = DayMask::NONE;
        m.insert(Weekday::Wednesday);
        assert_eq!(m, DayMask::from_days(&[Weekday::Wednesday]));
    }

    #[test]
    fn test_label_truncated() {
        let s = QuietSchedule::new("a-very-long-schedule-name", 1, 2, DayMask::ALL);
        assert_eq!(s.label.len(), MAX_LABEL_LEN);
    }

    proptest! {
        #[test]
        fn prop_quiet_is_pure(
            hour in 0u8..24,
            day in 0u8..7,
            start in 0u8..24,
            end in 0u8..24,
            mask in 0u8..128,
        ) {
            let schedules = [QuietSchedule::new("p", start, end, DayMask(mask))];
            let time = WallTime::with_weekday(hour, 0, Weekday::from_index(day).unwrap());
            let first = is_quiet(&time, &schedules);
            let second = is_quiet(&time, &schedules);
            prop_assert_eq!(first, second);
            if mask & (1 << day) == 0 {
                prop_assert!(!first);
            }
        }
    }
}
