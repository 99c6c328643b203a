//! Clock state machine
//!
//! The orchestrator's mode is a pure function of the previous mode and an
//! event. Motion is decided by the orchestrator; this table only says which
//! mode it is allowed to be in afterwards.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::ClockState;
