//! Hardware watchdog

use embassy_rp::peripherals::WATCHDOG;
use embassy_rp::watchdog::Watchdog;
use embassy_rp::Peri;
use embassy_time::Duration;

/// Default reset period
pub const WATCHDOG_PERIOD_MS: u64 = 8_000;

/// RP2040 watchdog, started on construction
pub struct HwWatchdog(Watchdog);

impl HwWatchdog {
    /// Take the watchdog and start it with `period_ms`
    pub fn start(peri: Peri<'static, WATCHDOG>, period_ms: u64) -> Self {
        let mut inner = Watchdog::new(peri);
        inner.start(Duration::from_millis(period_ms));
        Self(inner)
    }
}

impl flapclock_hal::Watchdog for HwWatchdog {
    fn feed(&mut self) {
        self.0.feed();
    }
}
