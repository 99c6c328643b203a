//! RTC-backed wall-clock source
//!
//! The RTC keeps UTC. Readings are shifted by the configured UTC offset (plus
//! an hour when DST is on) before they reach the orchestrator.

use embassy_rp::peripherals::RTC;
use embassy_rp::rtc::{DateTime, DayOfWeek, Rtc, RtcError};
use embassy_rp::Peri;

use flapclock_core::config::ConfigSource;
use flapclock_core::time::{SeedDate, TimeSource, WallTime, Weekday};

/// Time source reading the RP2040 RTC
///
/// Whether the stored weekday is real is encoded in the RTC's year (see
/// [`SeedDate`]), so it survives a warm reset along with the time.
pub struct RtcTimeSource<'d, C> {
    rtc: Rtc<'d, RTC>,
    config: C,
}

impl<'d, C: ConfigSource> RtcTimeSource<'d, C> {
    /// Wrap the RTC; offsets are read from `config` on every reading
    pub fn new(rtc: Peri<'d, RTC>, config: C) -> Self {
        Self {
            rtc: Rtc::new(rtc),
            config,
        }
    }

    /// Check if the RTC has been set since power-on
    pub fn is_running(&self) -> bool {
        self.rtc.is_running()
    }

    /// Set the RTC from a local time
    ///
    /// The offset is removed before writing. A time without a weekday marks
    /// the source as not calendar-aware, so quiet hours stay off.
    pub fn seed(&mut self, local: WallTime) -> Result<(), RtcError> {
        let offset = self.config.with_config(|c| c.effective_offset_minutes());
        let utc = local.offset_by(-offset);
        let day_of_week = utc.weekday.map_or(DayOfWeek::Sunday, to_day_of_week);
        let date = SeedDate::for_time(&local);

        self.rtc.set_datetime(DateTime {
            year: date.year,
            month: date.month,
            day: date.day,
            day_of_week,
            hour: utc.hour,
            minute: utc.minute,
            second: 0,
        })
    }
}

impl<C: ConfigSource> TimeSource for RtcTimeSource<'_, C> {
    fn now(&self) -> Option<WallTime> {
        let now = self.rtc.now().ok()?;
        let utc = if SeedDate::is_calendar_aware(now.year) {
            WallTime::with_weekday(now.hour, now.minute, from_day_of_week(now.day_of_week))
        } else {
            WallTime::new(now.hour, now.minute)
        };
        let offset = self.config.with_config(|c| c.effective_offset_minutes());
        Some(utc.offset_by(offset))
    }
}

fn to_day_of_week(day: Weekday) -> DayOfWeek {
    match day {
        Weekday::Sunday => DayOfWeek::Sunday,
        Weekday::Monday => DayOfWeek::Monday,
        Weekday::Tuesday => DayOfWeek::Tuesday,
        Weekday::Wednesday => DayOfWeek::Wednesday,
        Weekday::Thursday => DayOfWeek::Thursday,
        Weekday::Friday => DayOfWeek::Friday,
        Weekday::Saturday => DayOfWeek::Saturday,
    }
}

fn from_day_of_week(day: DayOfWeek) -> Weekday {
    match day {
        DayOfWeek::Sunday => Weekday::Sunday,
        DayOfWeek::Monday => Weekday::Monday,
        DayOfWeek::Tuesday => Weekday::Tuesday,
        DayOfWeek::Wednesday => Weekday::Wednesday,
        DayOfWeek::Thursday => Weekday::Thursday,
        DayOfWeek::Friday => Weekday::Friday,
        DayOfWeek::Saturday => Weekday::Saturday,
    }
}
