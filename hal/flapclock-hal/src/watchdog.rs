//! Watchdog service hook
//!
//! Homing and flap draining spin synchronously. Every iteration of those
//! loops calls [`Watchdog::feed`] so a hardware watchdog (or any other
//! periodic background duty) keeps being serviced.

/// Periodic service hook called from every blocking loop iteration
pub trait Watchdog {
    /// Service the watchdog
    fn feed(&mut self);
}

impl<T: Watchdog + ?Sized> Watchdog for &mut T {
    fn feed(&mut self) {
        (**self).feed();
    }
}

/// Watchdog that does nothing (host tests, boards without a watchdog)
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoWatchdog;

impl Watchdog for NoWatchdog {
    fn feed(&mut self) {}
}
