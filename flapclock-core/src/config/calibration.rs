//! Mechanical calibration record
//!
//! Steps-per-flap constants are measured per unit in calibration mode and
//! persisted to flash as a postcard-encoded record guarded by a magic
//! number, a format version and a CRC32.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ClockConfig;
use crate::axis::Axis;

/// Magic number to identify valid calibration data
pub const CALIBRATION_MAGIC: u32 = 0x464C_4150; // "FLAP"

/// Current calibration data version
pub const CALIBRATION_VERSION: u8 = 1;

/// Encoded size upper bound
pub const MAX_CALIBRATION_SIZE: usize = 32;

/// Calibration record errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// Deserialization failed
    Deserialize,
    /// Serialization failed (buffer too small)
    Serialize,
    /// CRC check failed
    CrcMismatch,
    /// Invalid magic or version
    InvalidFormat,
    /// A stored constant is zero
    InvalidValue,
}

/// Persisted steps-per-flap constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationData {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Minutes wheel steps per flap × 1000
    pub minutes_milli_steps: u32,
    /// Hours wheel steps per flap × 1000
    pub hours_milli_steps: u32,
    /// CRC32 over the fields above
    pub crc: u32,
}

impl CalibrationData {
    /// Build a record with a valid CRC
    pub fn new(minutes_steps_per_flap: f64, hours_steps_per_flap: f64) -> Self {
        let mut data = Self {
            magic: CALIBRATION_MAGIC,
            version: CALIBRATION_VERSION,
            minutes_milli_steps: to_milli(minutes_steps_per_flap),
            hours_milli_steps: to_milli(hours_steps_per_flap),
            crc: 0,
        };
        data.update_crc();
        data
    }

    /// Check magic and version
    pub fn is_valid(&self) -> bool {
        self.magic == CALIBRATION_MAGIC && self.version == CALIBRATION_VERSION
    }

    /// Stored constant for one wheel
    pub fn steps_per_flap(&self, axis: Axis) -> f64 {
        let milli = match axis {
            Axis::Minutes => self.minutes_milli_steps,
            Axis::Hours => self.hours_milli_steps,
        };
        milli as f64 / 1000.0
    }

    /// Copy the constants into a configuration
    pub fn apply(&self, config: &mut ClockConfig) {
        for axis in Axis::ALL {
            config.axis_mut(axis).steps_per_flap = self.steps_per_flap(axis);
        }
    }

    /// Calculate CRC32 for the data (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;
        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &self.minutes_milli_steps.to_le_bytes());
        crc = crc32_update(crc, &self.hours_milli_steps.to_le_bytes());
        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }

    /// Check magic, version, CRC and that both constants are non-zero
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if !self.is_valid() {
            return Err(CalibrationError::InvalidFormat);
        }
        if !self.verify_crc() {
            return Err(CalibrationError::CrcMismatch);
        }
        if self.minutes_milli_steps == 0 || self.hours_milli_steps == 0 {
            return Err(CalibrationError::InvalidValue);
        }
        Ok(())
    }

    /// Encode into `buffer`, refreshing the CRC first
    #[cfg(feature = "serde")]
    pub fn to_bytes<'b>(&mut self, buffer: &'b mut [u8]) -> Result<&'b mut [u8], CalibrationError> {
        self.update_crc();
        postcard::to_slice(self, buffer).map_err(|_| CalibrationError::Serialize)
    }

    /// Decode and validate a stored record
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CalibrationError> {
        let data: CalibrationData =
            postcard::from_bytes(bytes).map_err(|_| CalibrationError::Deserialize)?;
        data.validate()?;
        Ok(data)
    }
}

fn to_milli(steps_per_flap: f64) -> u32 {
    if steps_per_flap.is_finite() && steps_per_flap > 0.0 {
        libm::round(steps_per_flap * 1000.0) as u32
    } else {
        0
    }
}

/// CRC32 update (IEEE 802.3 polynomial, reflected)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
