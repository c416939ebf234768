//! Servo PWM, pulse map and manipulator axis settings.

use crate::config::ConfigError;
use crate::consts::{MAX_PWM_CHANNEL, SERVO_RESOLUTION_BITS};
use crate::hal::{Channel, Pin};
use serde::{Deserialize, Serialize};

/// Servo angle in degrees.
pub type Degrees = i32;

/// Pulse width in microseconds.
pub type Microseconds = u32;

/// PWM settings shared by the servo axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoPwmSettings {
    /// PWM frequency in Hz.
    pub frequency_hz: u32,
    /// PWM resolution (8..=16 bits).
    pub resolution_bits: u8,
}

impl Default for ServoPwmSettings {
    fn default() -> Self {
        Self {
            frequency_hz: 50,
            resolution_bits: 10,
        }
    }
}

impl ServoPwmSettings {
    /// Validate the settings.
    ///
    /// # Validation Rules
    /// 1. `frequency_hz` > 0
    /// 2. `resolution_bits` in `SERVO_RESOLUTION_BITS`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frequency_hz == 0 {
            return Err(ConfigError::invalid("servo frequency_hz must be greater than 0"));
        }

        if !SERVO_RESOLUTION_BITS.contains(&self.resolution_bits) {
            return Err(ConfigError::invalid(format!(
                "servo resolution_bits {} outside {:?}",
                self.resolution_bits, SERVO_RESOLUTION_BITS
            )));
        }

        Ok(())
    }

    /// Largest duty for the configured resolution: `2^bits - 1`.
    #[inline]
    pub fn max_duty(&self) -> u32 {
        let bits = u32::from(self.resolution_bits.min(31));
        (1u32 << bits) - 1
    }
}

/// One endpoint of the pulse map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulsePoint {
    /// Pulse width at `angle`.
    pub pulse_us: Microseconds,
    /// Angle produced by `pulse_us`.
    pub angle: Degrees,
}

/// Two-point linear map from angle to pulse width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseSettings {
    /// Lower endpoint.
    pub min: PulsePoint,
    /// Upper endpoint.
    pub max: PulsePoint,
}

impl Default for PulseSettings {
    fn default() -> Self {
        Self {
            min: PulsePoint {
                pulse_us: 500,
                angle: 0,
            },
            max: PulsePoint {
                pulse_us: 2400,
                angle: 180,
            },
        }
    }
}

impl PulseSettings {
    /// Validate the settings.
    ///
    /// # Validation Rules
    /// 1. `min.pulse_us` < `max.pulse_us`
    /// 2. `min.angle` < `max.angle`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min.pulse_us >= self.max.pulse_us {
            return Err(ConfigError::invalid(format!(
                "pulse map min.pulse_us {} must be below max.pulse_us {}",
                self.min.pulse_us, self.max.pulse_us
            )));
        }

        if self.min.angle >= self.max.angle {
            return Err(ConfigError::invalid(format!(
                "pulse map min.angle {} must be below max.angle {}",
                self.min.angle, self.max.angle
            )));
        }

        Ok(())
    }

    /// Angles the map can reach without extrapolation.
    #[inline]
    pub fn angle_range(&self) -> std::ops::RangeInclusive<Degrees> {
        self.min.angle..=self.max.angle
    }
}

/// Servo PWM together with its pulse map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServoDriverSettings {
    /// Servo PWM.
    #[serde(default)]
    pub pwm: ServoPwmSettings,
    /// Angle to pulse map.
    #[serde(default)]
    pub pulse: PulseSettings,
}

impl ServoDriverSettings {
    /// Validate PWM and pulse map.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pwm.validate()?;
        self.pulse.validate()
    }
}

/// One servo axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisSettings {
    /// Signal pin.
    pub pin: Pin,
    /// PWM channel (0..=15).
    pub channel: Channel,
    /// Lowest commanded angle.
    pub min_angle: Degrees,
    /// Highest commanded angle.
    pub max_angle: Degrees,
}

impl AxisSettings {
    /// Validate the axis against the pulse map it will be driven through.
    ///
    /// # Validation Rules
    /// 1. `channel` <= `MAX_PWM_CHANNEL`
    /// 2. `min_angle` < `max_angle`
    /// 3. `[min_angle, max_angle]` lies inside the pulse map's angle range
    pub fn validate(&self, pulse: &PulseSettings) -> Result<(), ConfigError> {
        if self.channel > MAX_PWM_CHANNEL {
            return Err(ConfigError::invalid(format!(
                "axis channel {} > {}",
                self.channel, MAX_PWM_CHANNEL
            )));
        }

        if self.min_angle >= self.max_angle {
            return Err(ConfigError::invalid(format!(
                "axis min_angle {} must be below max_angle {}",
                self.min_angle, self.max_angle
            )));
        }

        let reachable = pulse.angle_range();
        if !reachable.contains(&self.min_angle) || !reachable.contains(&self.max_angle) {
            return Err(ConfigError::invalid(format!(
                "axis range {}..={} exceeds pulse map range {:?}",
                self.min_angle, self.max_angle, reachable
            )));
        }

        Ok(())
    }
}

/// Two-axis manipulator (arm + claw).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManipulatorSettings {
    /// Servo PWM and pulse map shared by both axes.
    #[serde(default)]
    pub driver: ServoDriverSettings,
    /// Claw axis (MG90S).
    pub claw: AxisSettings,
    /// Arm axis (MG996).
    pub arm: AxisSettings,
}

impl Default for ManipulatorSettings {
    fn default() -> Self {
        Self {
            driver: ServoDriverSettings::default(),
            claw: AxisSettings {
                pin: 15,
                channel: 15,
                min_angle: 0,
                max_angle: 180,
            },
            arm: AxisSettings {
                pin: 14,
                channel: 14,
                min_angle: 0,
                max_angle: 180,
            },
        }
    }
}

impl ManipulatorSettings {
    /// Validate the driver settings and both axes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.driver.validate()?;
        self.claw.validate(&self.driver.pulse)?;
        self.arm.validate(&self.driver.pulse)?;

        if self.claw.channel == self.arm.channel {
            return Err(ConfigError::invalid(format!(
                "claw and arm share channel {}",
                self.claw.channel
            )));
        }

        Ok(())
    }
}
