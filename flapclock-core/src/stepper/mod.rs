//! Stepper phase sequencing
//!
//! Drives a unipolar stepper directly through four coil lines using the
//! 8-state half-step sequence. Timing is compared against a monotonic
//! microsecond counter so the engine never blocks.

pub mod engine;
pub mod phase;

pub use engine::{Direction, StepEngine};
pub use phase::{PhasePattern, HALF_STEP_SEQUENCE, PHASE_COUNT};
