//! Embedded configuration
//!
//! `clock.toml` is compiled into the image (and checked by build.rs), then
//! parsed at boot by the core's no_std parser. The parsed config is shared
//! between the orchestrator and the RTC time source.

use core::cell::RefCell;

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use flapclock_core::config::{parse_config, ClockConfig, ConfigSource};

/// Embedded configuration (compiled into firmware)
/// Edit clock.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../clock.toml");

/// Clock configuration behind a critical-section mutex
pub struct SharedConfig(Mutex<CriticalSectionRawMutex, RefCell<ClockConfig>>);

impl SharedConfig {
    pub const fn new(config: ClockConfig) -> Self {
        Self(Mutex::new(RefCell::new(config)))
    }
}

impl ConfigSource for SharedConfig {
    fn with_config<R>(&self, f: impl FnOnce(&ClockConfig) -> R) -> R {
        self.0.lock(|config| f(&config.borrow()))
    }
}

/// Parse the embedded configuration, falling back to defaults
pub fn load() -> ClockConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            warn!("clock.toml rejected ({}), using defaults", e);
            ClockConfig::default()
        }
    };
    log_summary(&config);
    config
}

fn log_summary(config: &ClockConfig) {
    info!(
        "Config: display={}, utc_offset={}min, dst={}",
        config.display_mode, config.utc_offset_minutes, config.dst
    );
    for axis in flapclock_core::Axis::ALL {
        let a = config.axis(axis);
        info!(
            "  {} axis: {} steps/flap x1000, speed={}, homing_speed={}, reversed={}",
            axis.name(),
            (a.steps_per_flap * 1000.0) as u32,
            a.speed_steps_per_s,
            a.homing_speed_steps_per_s,
            a.reversed
        );
    }
    if config.quiet_enabled {
        for schedule in &config.quiet_schedules {
            info!(
                "  quiet '{}': {}:00 -> {}:00, days={=u8:#b}",
                schedule.label.as_str(),
                schedule.start_hour,
                schedule.end_hour,
                schedule.days.0
            );
        }
    } else {
        info!("  quiet hours disabled");
    }
}
