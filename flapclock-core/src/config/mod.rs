//! Configuration types
//!
//! Board-agnostic configuration structures. The clock reads settings live
//! through a [`ConfigSource`]; a text form is parsed with [`parse_config`]
//! and the measured mechanical constants persist as a [`CalibrationData`]
//! record.

pub mod calibration;
pub mod parser;
pub mod source;
pub mod types;

pub use calibration::{CalibrationData, CalibrationError, CALIBRATION_MAGIC, CALIBRATION_VERSION};
pub use parser::{parse_config, ParseError};
pub use source::ConfigSource;
pub use types::*;
