//! Flapclock Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the clock logic is
//! written against. Chip-specific crates implement them so the same core
//! runs on the RP2040 board, under host tests and in the simulation rig.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  flapclock-firmware / flapclock-core    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  flapclock-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ flapclock-hal-│       │  core::sim    │
//! │    rp2040     │       │  (host rig)   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O (coil lines, endstops)
//! - [`time::Monotonic`] - Free-running microsecond/millisecond counters
//! - [`watchdog::Watchdog`] - Periodic service hook for spin loops

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod time;
pub mod watchdog;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OutputPin};
pub use time::Monotonic;
pub use watchdog::{NoWatchdog, Watchdog};
