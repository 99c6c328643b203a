//! Flap-to-step conversion
//!
//! Mechanical gearing rarely gives a whole number of motor steps per flap.
//! The accumulator turns a fractional steps-per-flap constant into whole
//! step counts without drifting over unbounded runtime.

pub mod accumulator;

pub use accumulator::{forward_flaps, StepAccumulator};
