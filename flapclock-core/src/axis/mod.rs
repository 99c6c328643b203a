//! Flap axes
//!
//! An axis is one wheel: a step engine, a home endstop and the belief of
//! which flap is showing.

mod controller;

pub use controller::{AxisController, ALIGN_SWEEP_REVOLUTIONS, HOMING_REVOLUTIONS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The two wheels of the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// 60-flap minutes wheel
    Minutes,
    /// 24-flap hours wheel
    Hours,
}

impl Axis {
    /// Both axes, minutes first
    pub const ALL: [Axis; 2] = [Axis::Minutes, Axis::Hours];

    /// Number of flaps on the wheel
    pub const fn wheel_size(self) -> u8 {
        match self {
            Axis::Minutes => 60,
            Axis::Hours => 24,
        }
    }

    /// Flap showing when the endstop triggers
    pub const fn home_flap(self) -> u8 {
        0
    }

    /// Lowercase name for logs
    pub const fn name(self) -> &'static str {
        match self {
            Axis::Minutes => "minutes",
            Axis::Hours => "hours",
        }
    }
}
