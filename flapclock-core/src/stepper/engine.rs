//! Non-blocking constant-velocity step engine
//!
//! One engine owns the four coil lines of one motor. A move is a number of
//! half-steps in one direction; [`StepEngine::update`] advances at most one
//! phase per call once the step interval has elapsed, so a single control
//! loop can interleave several engines without ever sleeping.

use flapclock_hal::time::elapsed_since;
use flapclock_hal::OutputPin;

use super::phase::{self, PhasePattern};

/// Physical rotation direction of the phase sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Phase index increments
    Forward,
    /// Phase index decrements
    Reverse,
}

/// Half-step phase sequencer for one motor
///
/// Invariant: the engine is moving iff `steps_remaining > 0`; the phase
/// index is always in `0..PHASE_COUNT`.
pub struct StepEngine<P> {
    /// Coil output lines
    lines: [P; 4],
    /// Current index into the half-step table
    phase: u8,
    /// Physical direction of the active (or last) move
    direction: Direction,
    /// Axis wiring is mirrored; positive counts run the table backwards
    reversed: bool,
    /// Microseconds between phase advances (`None` = never step)
    interval_us: Option<u32>,
    /// Steps left in the active move
    steps_remaining: u32,
    /// Steps taken since the active move started
    steps_moved: u32,
    /// Timestamp of the last phase change (or the move start)
    last_step_us: u32,
    /// Number of moves commanded over the engine's lifetime
    moves_started: u32,
}

impl<P: OutputPin> StepEngine<P> {
    /// Create an idle engine with de-energized coils
    ///
    /// # Arguments
    /// * `lines` - Coil lines in sequence order (IN1..IN4)
    /// * `reversed` - Mirror the direction of every move
    pub fn new(lines: [P; 4], reversed: bool) -> Self {
        let mut engine = Self {
            lines,
            phase: 0,
            direction: Direction::Forward,
            reversed,
            interval_us: None,
            steps_remaining: 0,
            steps_moved: 0,
            last_step_us: 0,
            moves_started: 0,
        };
        engine.release();
        engine
    }

    /// Set the stepping rate
    ///
    /// A rate of zero or below means the engine never advances. Has no
    /// effect on whether a move is active.
    pub fn set_speed(&mut self, steps_per_second: i32) {
        self.interval_us = if steps_per_second <= 0 {
            None
        } else {
            Some(1_000_000 / steps_per_second as u32)
        };
    }

    /// Begin a move of `|count|` steps
    ///
    /// The sign selects the direction (mirrored when the axis is reversed).
    /// A new move replaces any move in progress; zero is a no-op.
    pub fn move_steps(&mut self, count: i32, now_us: u32) {
        if count == 0 {
            return;
        }

        self.direction = if (count > 0) != self.reversed {
            Direction::Forward
        } else {
            Direction::Reverse
        };
        self.steps_remaining = count.unsigned_abs();
        self.steps_moved = 0;
        self.last_step_us = now_us;
        self.moves_started = self.moves_started.wrapping_add(1);
    }

    /// Advance one phase if the step interval has elapsed
    ///
    /// Safe to call on every loop iteration. Returns whether the engine is
    /// still moving after this call.
    pub fn update(&mut self, now_us: u32) -> bool {
        if self.steps_remaining == 0 {
            return false;
        }

        let Some(interval) = self.interval_us else {
            return true;
        };

        if elapsed_since(now_us, self.last_step_us) < interval {
            return true;
        }

        self.last_step_us = now_us;
        self.phase = phase::advance(self.phase, self.direction == Direction::Forward);
        self.energize(phase::pattern(self.phase));
        self.steps_moved += 1;
        self.steps_remaining -= 1;

        if self.steps_remaining == 0 {
            self.release();
            return false;
        }

        true
    }

    /// Halt immediately and de-energize all coils
    pub fn stop(&mut self) {
        self.steps_remaining = 0;
        self.release();
    }

    /// De-energize the coils without touching the phase index
    pub fn release(&mut self) {
        for line in &mut self.lines {
            line.set_low();
        }
    }

    /// Check if a move is in progress
    pub fn is_moving(&self) -> bool {
        self.steps_remaining > 0
    }

    /// Current phase index
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Physical direction of the active (or last) move
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Steps left in the active move
    pub fn steps_remaining(&self) -> u32 {
        self.steps_remaining
    }

    /// Steps taken since the active move started
    pub fn steps_moved(&self) -> u32 {
        self.steps_moved
    }

    /// Configured step interval
    pub fn interval_us(&self) -> Option<u32> {
        self.interval_us
    }

    /// Moves commanded since construction
    pub fn moves_started(&self) -> u32 {
        self.moves_started
    }

    /// Whether the axis direction is mirrored
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Current coil levels
    pub fn lines(&self) -> PhasePattern {
        [
            self.lines[0].is_set_high(),
            self.lines[1].is_set_high(),
            self.lines[2].is_set_high(),
            self.lines[3].is_set_high(),
        ]
    }

    fn energize(&mut self, pattern: PhasePattern) {
        for (line, high) in self.lines.iter_mut().zip(pattern) {
            line.set_state(high);
        }
    }
}
