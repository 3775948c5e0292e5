//! Linear channel-to-wavelength calibration.

use crate::constants::{CHANNEL_AXIS_LABEL, WAVELENGTH_AXIS_LABEL};
use crate::error::{EngineError, Result};

/// Wavelengths (nm) of the first and last channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavelengthRange {
    start: f64,
    end: f64,
}

impl WavelengthRange {
    /// Validated range: both ends positive and `start < end`.
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(EngineError::invalid_wavelength(
                "wavelengths must be finite numbers",
            ));
        }
        if start <= 0.0 || end <= 0.0 {
            return Err(EngineError::invalid_wavelength("wavelengths must be positive"));
        }
        if start >= end {
            return Err(EngineError::invalid_wavelength(
                "start wavelength must be less than end wavelength",
            ));
        }
        Ok(Self { start, end })
    }

    /// Build from optional user inputs.
    ///
    /// Both absent means "no calibration"; supplying only one end is an
    /// error.
    pub fn from_inputs(start: Option<f64>, end: Option<f64>) -> Result<Option<Self>> {
        match (start, end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => Self::new(start, end).map(Some),
            _ => Err(EngineError::invalid_wavelength(
                "both start and end wavelengths must be provided",
            )),
        }
    }

    /// Wavelength of the first channel.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Wavelength of the last channel.
    pub fn end(&self) -> f64 {
        self.end
    }

    /// `count` evenly spaced wavelengths from `start` to `end` inclusive.
    pub fn linspace(&self, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![self.start],
            _ => {
                let step = (self.end - self.start) / (count - 1) as f64;
                (0..count)
                    .map(|i| {
                        if i == count - 1 {
                            self.end
                        } else {
                            self.start + step * i as f64
                        }
                    })
                    .collect()
            }
        }
    }
}

/// X-axis values for a spectrum of `count` samples.
///
/// Wavelengths when a range is known, channel indices `0..count` otherwise.
pub fn axis_for(count: usize, range: Option<&WavelengthRange>) -> Vec<f64> {
    match range {
        Some(range) => range.linspace(count),
        None => (0..count).map(|i| i as f64).collect(),
    }
}

/// Axis title matching [`axis_for`].
pub fn axis_label(range: Option<&WavelengthRange>) -> &'static str {
    if range.is_some() {
        WAVELENGTH_AXIS_LABEL
    } else {
        CHANNEL_AXIS_LABEL
    }
}
