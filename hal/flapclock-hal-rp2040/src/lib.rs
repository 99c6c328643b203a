//! RP2040-specific HAL for the flap clock firmware
//!
//! This crate provides RP2040 implementations of the `flapclock-hal`
//! traits, plus the RTC-backed wall-clock source:
//!
//! - Coil and endstop pin newtypes over embassy GPIO
//! - Monotonic clock over `embassy_time::Instant`
//! - Hardware watchdog
//! - RTC time source with UTC offset and DST applied

#![no_std]

pub mod gpio;
pub mod rtc;
pub mod time;
pub mod watchdog;

pub use gpio::{Coil, Endstop};
pub use rtc::RtcTimeSource;
pub use time::EmbassyClock;
pub use watchdog::HwWatchdog;

// Re-export shared traits from flapclock-hal for convenience
pub use flapclock_hal::{InputPin, Monotonic, OutputPin, Watchdog};
