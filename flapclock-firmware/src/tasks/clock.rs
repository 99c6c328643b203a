//! Clock task
//!
//! Sole owner of the orchestrator. Runs the boot sequence once, then ticks
//! the state machine on a fixed cadence. Blocking moves inside the
//! orchestrator feed the watchdog themselves.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use flapclock_core::{ClockOrchestrator, ClockState, FaultCode};
use flapclock_hal_rp2040::{Coil, EmbassyClock, Endstop, HwWatchdog, RtcTimeSource};

use crate::config::SharedConfig;
use crate::log::DefmtLog;

/// Tick interval in microseconds
pub const TICK_INTERVAL_US: u64 = 200;

/// How long to wait for a valid time before showing the time fault code
pub const TIME_WAIT_MS: u64 = 60_000;

/// Orchestrator wired to the RP2040 peripherals
pub type Orchestrator = ClockOrchestrator<
    Coil<'static>,
    Endstop<'static>,
    EmbassyClock,
    HwWatchdog,
    RtcTimeSource<'static, &'static SharedConfig>,
    DefmtLog,
    &'static SharedConfig,
>;

#[embassy_executor::task]
pub async fn clock_task(mut clock: Orchestrator) {
    info!("Clock task started");

    if clock.initialize() {
        let (minutes, hours) = clock.current_flaps();
        info!(
            "Initialized in {}, hours flap {}, minutes flap {}",
            clock.state().name(),
            hours,
            minutes
        );
    } else {
        error!("Initialization failed: {}", clock.last_fault());
    }

    let mut ticker = Ticker::every(Duration::from_micros(TICK_INTERVAL_US));
    let boot = Instant::now();
    let mut awaiting_time = clock.state() == ClockState::Idle;
    let mut last_state = clock.state();

    loop {
        ticker.next().await;
        clock.tick();

        let state = clock.state();
        if state != last_state {
            info!("State: {} -> {}", last_state.name(), state.name());
            last_state = state;
        }

        if awaiting_time && state != ClockState::Idle {
            awaiting_time = false;
        }
        if awaiting_time && boot.elapsed() > Duration::from_millis(TIME_WAIT_MS) {
            awaiting_time = false;
            warn!("No time after {} ms", TIME_WAIT_MS);
            clock.display_fault_code(FaultCode::TIME_UNAVAILABLE);
        }
    }
}
