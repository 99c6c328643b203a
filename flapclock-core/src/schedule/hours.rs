//! Hour wheel mapping
//!
//! The hours wheel has 24 flaps. In 24-hour mode flap `n` shows hour `n`.
//! In 12-hour mode only flaps 1-12 are used: midnight and noon both show
//! flap 12, afternoon hours fold onto 1-11.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hour display convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DisplayMode {
    /// 1-12 with noon/midnight on flap 12
    TwelveHour,
    /// 0-23
    #[default]
    TwentyFourHour,
}

impl DisplayMode {
    /// Parse "12h"/"24h" (also accepts "12"/"24")
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "12h" | "12" => Some(DisplayMode::TwelveHour),
            "24h" | "24" => Some(DisplayMode::TwentyFourHour),
            _ => None,
        }
    }
}

/// Target hours-wheel flap for an hour of day (0-23)
pub fn hour_flap(hour: u8, mode: DisplayMode) -> u8 {
    let hour = hour % 24;
    match mode {
        DisplayMode::TwentyFourHour => hour,
        DisplayMode::TwelveHour => match hour {
            0 | 12 => 12,
            h if h > 12 => h - 12,
            h => h,
        },
    }
}

/// Whether the minute wrap into `hour` is a scheduled full re-home
///
/// The hours dial wraps at midnight in 24-hour mode and at both noon and
/// midnight in 12-hour mode.
pub fn is_rehome_boundary(hour: u8, mode: DisplayMode) -> bool {
    match mode {
        DisplayMode::TwentyFourHour => hour % 24 == 0,
        DisplayMode::TwelveHour => hour % 12 == 0,
    }
}
