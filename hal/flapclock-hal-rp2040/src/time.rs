//! Monotonic clock over the embassy time driver

use embassy_time::Instant;

/// Free-running counters derived from `embassy_time::Instant`
///
/// The 64-bit tick count is truncated to `u32`; consumers compare with
/// wrapping arithmetic.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmbassyClock;

impl flapclock_hal::Monotonic for EmbassyClock {
    fn now_micros(&self) -> u32 {
        Instant::now().as_micros() as u32
    }

    fn now_millis(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}
