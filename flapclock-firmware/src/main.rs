//! Flapclock - Split-Flap Clock Firmware
//!
//! Main firmware binary for an RP2040 driving two 28BYJ-48 steppers through
//! ULN2003 boards: a 60-flap minutes wheel and a 24-flap hours wheel, each
//! with an endstop on its home flap.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use flapclock_core::config::ConfigSource;
use flapclock_core::{Axis, AxisController, ClockOrchestrator};
use flapclock_hal_rp2040::gpio::coils;
use flapclock_hal_rp2040::watchdog::WATCHDOG_PERIOD_MS;
use flapclock_hal_rp2040::{EmbassyClock, Endstop, HwWatchdog, RtcTimeSource};

use crate::config::SharedConfig;
use crate::log::DefmtLog;

mod config;
mod log;
mod tasks;

// Shared configuration (must live forever for task references)
static CONFIG: StaticCell<SharedConfig> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Flapclock firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static SharedConfig = CONFIG.init(SharedConfig::new(config::load()));
    let (minutes_cfg, hours_cfg, manual_time) =
        config.with_config(|c| (c.minutes, c.hours, c.manual_time));

    // Pin assignments are board-specific (Pico + two ULN2003 boards)
    let minutes = AxisController::new(
        Axis::Minutes,
        coils(p.PIN_2, p.PIN_3, p.PIN_4, p.PIN_5),
        Endstop::for_polarity(p.PIN_6, minutes_cfg.endstop_active_low),
        &minutes_cfg,
    );
    let hours = AxisController::new(
        Axis::Hours,
        coils(p.PIN_10, p.PIN_11, p.PIN_12, p.PIN_13),
        Endstop::for_polarity(p.PIN_14, hours_cfg.endstop_active_low),
        &hours_cfg,
    );
    info!("Axes initialized");

    let mut time = RtcTimeSource::new(p.RTC, config);
    if !time.is_running() {
        match manual_time {
            Some(manual) => match time.seed(manual) {
                Ok(()) => info!("RTC seeded from [time]: {}", Display2Format(&manual)),
                Err(e) => warn!("RTC seed failed: {}", Debug2Format(&e)),
            },
            None => warn!("RTC not running and no [time] configured"),
        }
    }

    let watchdog = HwWatchdog::start(p.WATCHDOG, WATCHDOG_PERIOD_MS);
    info!("Watchdog started ({} ms)", WATCHDOG_PERIOD_MS);

    let clock = ClockOrchestrator::new(
        minutes,
        hours,
        EmbassyClock,
        watchdog,
        time,
        DefmtLog,
        config,
    );

    spawner.spawn(tasks::clock_task(clock)).unwrap();
    info!("All tasks spawned");
}
