//! Fractional step accumulator
//!
//! Each flap asks for `steps_per_flap + residual` steps, rounds to the
//! nearest whole step and carries the rounding residual into the next flap.
//! The total issued after `n` flaps therefore differs from `n * steps_per_flap`
//! by exactly the current residual, which never exceeds half a step.

/// Carries sub-step remainders across flap moves
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepAccumulator {
    /// Measured mechanical constant (steps per flap)
    steps_per_flap: f64,
    /// Rounding residual carried into the next flap, within [-0.5, 0.5]
    residual: f64,
}

impl StepAccumulator {
    /// Create an accumulator with a zero residual
    pub const fn new(steps_per_flap: f64) -> Self {
        Self {
            steps_per_flap,
            residual: 0.0,
        }
    }

    /// Whole steps to issue for the next flap
    ///
    /// Updates the residual so the cumulative error stays bounded.
    pub fn next_flap(&mut self) -> i32 {
        let ideal = self.steps_per_flap + self.residual;
        let rounded = libm::round(ideal);
        self.residual = ideal - rounded;
        rounded as i32
    }

    /// Total whole steps for `flaps` consecutive flaps
    pub fn steps_for(&mut self, flaps: u32) -> i64 {
        (0..flaps).map(|_| self.next_flap() as i64).sum()
    }

    /// Clear the residual (after homing)
    pub fn reset(&mut self) {
        self.residual = 0.0;
    }

    /// Current carried residual
    pub fn residual(&self) -> f64 {
        self.residual
    }

    /// Mechanical constant in use
    pub fn steps_per_flap(&self) -> f64 {
        self.steps_per_flap
    }

    /// Replace the mechanical constant; the residual is cleared
    pub fn set_steps_per_flap(&mut self, steps_per_flap: f64) {
        self.steps_per_flap = steps_per_flap;
        self.residual = 0.0;
    }
}

/// Flaps to advance from `current` to `target` on a forward-only wheel
///
/// Always in `0..wheel_size`; the mechanism never moves backward.
pub fn forward_flaps(current: u8, target: u8, wheel_size: u8) -> u8 {
    let wheel = wheel_size as u16;
    ((target as u16 % wheel + wheel - current as u16 % wheel) % wheel) as u8
}
