//! Board-agnostic core logic for the split-flap clock firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Non-blocking half-step phase sequencer
//! - Per-axis flap tracking with drift-free fractional step accumulation
//! - Clock orchestration state machine (homing, alignment, quiet hours)
//! - Wall-clock types and the time source interface
//! - Quiet-hours schedules and 12/24-hour flap mapping
//! - Event journal for faults and transitions
//! - Configuration type definitions, text parser and calibration record

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod axis;
pub mod config;
pub mod journal;
pub mod motion;
pub mod orchestrator;
pub mod schedule;
pub mod state;
pub mod stepper;
pub mod time;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use axis::{Axis, AxisController};
pub use orchestrator::{ClockOrchestrator, ClockStats, Fault, FaultCode};
pub use state::ClockState;
