//! Calendar policy
//!
//! Pure functions that decide what the dials should show and when motion is
//! allowed: hour-to-flap mapping for 12/24-hour display and quiet-hours
//! windows.

pub mod hours;
pub mod quiet;

pub use hours::{hour_flap, is_rehome_boundary, DisplayMode};
pub use quiet::{is_quiet, DayMask, QuietSchedule, MAX_LABEL_LEN, MAX_QUIET_SCHEDULES};
