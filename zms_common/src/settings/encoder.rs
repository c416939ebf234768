//! Encoder pin and tick conversion settings.

use crate::config::ConfigError;
use crate::hal::{Edge, Pin};
use serde::{Deserialize, Serialize};

/// Signed encoder tick count.
pub type Ticks = i32;

/// Millimeters of travel or range. `f64` so every `Ticks` value survives
/// a round trip through millimeters.
pub type Millimeters = f64;

/// Tick/distance conversion.
///
/// Construct through [`ConversionSettings::new`] or validate after
/// deserializing; the conversion functions assume `ticks_per_mm > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionSettings {
    /// Encoder ticks per millimeter of wheel travel.
    pub ticks_per_mm: f32,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        // 5000 ticks per 2100 mm, measured on the drive wheels.
        Self {
            ticks_per_mm: 5000.0 / 2100.0,
        }
    }
}

impl ConversionSettings {
    /// Create validated conversion settings.
    ///
    /// # Errors
    /// `ConfigError::ValidationError` unless `ticks_per_mm` is finite and positive.
    pub fn new(ticks_per_mm: f32) -> Result<Self, ConfigError> {
        let settings = Self { ticks_per_mm };
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.ticks_per_mm.is_finite() || self.ticks_per_mm <= 0.0 {
            return Err(ConfigError::invalid(format!(
                "ticks_per_mm must be positive, got {}",
                self.ticks_per_mm
            )));
        }
        Ok(())
    }

    /// `ticks / ticks_per_mm`.
    #[inline]
    pub fn to_millimeters(&self, ticks: Ticks) -> Millimeters {
        f64::from(ticks) / f64::from(self.ticks_per_mm)
    }

    /// `round(mm * ticks_per_mm)`, saturating at the `Ticks` range.
    #[inline]
    pub fn to_ticks(&self, mm: Millimeters) -> Ticks {
        (mm * f64::from(self.ticks_per_mm)).round() as Ticks
    }
}

/// Phase pins of one quadrature encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderPins {
    /// Phase A, the interrupt line.
    pub phase_a: Pin,
    /// Phase B, sampled on each phase A edge.
    pub phase_b: Pin,
    /// Phase A edge that counts.
    #[serde(default)]
    pub edge: Edge,
}

impl EncoderPins {
    /// Validate the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.phase_a == self.phase_b {
            return Err(ConfigError::invalid(format!(
                "encoder phase_a and phase_b are both {}",
                self.phase_a
            )));
        }
        Ok(())
    }
}
