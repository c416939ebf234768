//! Sharp IR distance sensor settings.

use crate::config::ConfigError;
use crate::consts::ADC_RESOLUTION_BITS;
use crate::hal::Pin;
use serde::{Deserialize, Serialize};

fn default_samples() -> u8 {
    4
}

fn default_sample_delay_ms() -> u32 {
    1
}

/// One analog distance sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharpSettings {
    /// Analog input pin.
    pub pin: Pin,
    /// ADC resolution (1..=16 bits).
    pub resolution_bits: u8,
    /// Samples averaged per reading.
    #[serde(default = "default_samples")]
    pub samples: u8,
    /// Delay between consecutive samples.
    #[serde(default = "default_sample_delay_ms")]
    pub sample_delay_ms: u32,
}

impl SharpSettings {
    /// Settings with the default sampling for `pin`.
    pub fn new(pin: Pin, resolution_bits: u8) -> Self {
        Self {
            pin,
            resolution_bits,
            samples: default_samples(),
            sample_delay_ms: default_sample_delay_ms(),
        }
    }

    /// Validate the settings.
    ///
    /// # Validation Rules
    /// 1. `resolution_bits` in `ADC_RESOLUTION_BITS`
    /// 2. `samples` >= 1
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !ADC_RESOLUTION_BITS.contains(&self.resolution_bits) {
            return Err(ConfigError::invalid(format!(
                "sensor resolution_bits {} outside {:?}",
                self.resolution_bits, ADC_RESOLUTION_BITS
            )));
        }

        if self.samples == 0 {
            return Err(ConfigError::invalid("sensor samples must be at least 1"));
        }

        Ok(())
    }
}
