//! Monotonic time source
//!
//! Step timing compares elapsed microseconds on a fixed-width counter.
//! Counters are allowed to wrap: callers must always use [`elapsed_since`]
//! (unsigned wrapping subtraction) instead of comparing raw values.

/// Free-running monotonic counter
pub trait Monotonic {
    /// Microseconds since an arbitrary epoch, wrapping at `u32::MAX`
    fn now_micros(&self) -> u32;

    /// Milliseconds since an arbitrary epoch, wrapping at `u32::MAX`
    fn now_millis(&self) -> u32;
}

impl<T: Monotonic + ?Sized> Monotonic for &T {
    fn now_micros(&self) -> u32 {
        (**self).now_micros()
    }

    fn now_millis(&self) -> u32 {
        (**self).now_millis()
    }
}

/// Elapsed ticks between `earlier` and `now`, correct across counter overflow
#[inline]
pub fn elapsed_since(now: u32, earlier: u32) -> u32 {
    now.wrapping_sub(earlier)
}
