//! Live configuration access
//!
//! The orchestrator never caches settings. Every tick it borrows the
//! current configuration through this trait, so edits made by another
//! collaborator (a settings UI, a serial console) take effect immediately.

use core::cell::RefCell;

use super::ClockConfig;

/// Shared, externally updated configuration
pub trait ConfigSource {
    /// Run `f` with the current configuration
    fn with_config<R>(&self, f: impl FnOnce(&ClockConfig) -> R) -> R;
}

impl ConfigSource for ClockConfig {
    fn with_config<R>(&self, f: impl FnOnce(&ClockConfig) -> R) -> R {
        f(self)
    }
}

impl ConfigSource for RefCell<ClockConfig> {
    fn with_config<R>(&self, f: impl FnOnce(&ClockConfig) -> R) -> R {
        f(&self.borrow())
    }
}

impl<C: ConfigSource> ConfigSource for &C {
    fn with_config<R>(&self, f: impl FnOnce(&ClockConfig) -> R) -> R {
        (**self).with_config(f)
    }
}
