//! Motor driver and motor PWM settings.

use crate::config::ConfigError;
use crate::consts::{MAX_PWM_CHANNEL, MOTOR_RESOLUTION_BITS};
use crate::hal::{Channel, Pin};
use serde::{Deserialize, Serialize};

/// Signed PWM value: magnitude is the duty, sign is the direction.
pub type SignedPwm = i16;

/// Rotation that counts as positive output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Positive output turns the motor clockwise.
    #[default]
    Cw,
    /// Positive output turns the motor counter-clockwise.
    Ccw,
}

/// How the two motor lines are wired to the H-bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MotorDriverKind {
    /// Line A is a digital direction line, line B carries PWM on the
    /// configured channel (IArduino motor shield).
    #[default]
    DirectionEnable,
    /// Both lines carry PWM; the inactive one is held at zero duty
    /// (L298N module).
    DualPwm,
}

/// PWM settings shared by the drive motors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotorPwmSettings {
    /// PWM frequency in Hz.
    pub frequency_hz: u16,
    /// Minimal duty at which the motor actually turns.
    pub dead_zone: SignedPwm,
    /// PWM resolution (8..=12 bits).
    pub resolution_bits: u8,
}

impl Default for MotorPwmSettings {
    fn default() -> Self {
        Self {
            frequency_hz: 20_000,
            // Measured on the robot's gear motors.
            dead_zone: 580,
            resolution_bits: 10,
        }
    }
}

impl MotorPwmSettings {
    /// Validate the settings.
    ///
    /// # Validation Rules
    /// 1. `frequency_hz` > 0
    /// 2. `resolution_bits` in `MOTOR_RESOLUTION_BITS`
    /// 3. `0 <= dead_zone <= max_pwm`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frequency_hz == 0 {
            return Err(ConfigError::invalid("motor frequency_hz must be greater than 0"));
        }

        if !MOTOR_RESOLUTION_BITS.contains(&self.resolution_bits) {
            return Err(ConfigError::invalid(format!(
                "motor resolution_bits {} outside {:?}",
                self.resolution_bits, MOTOR_RESOLUTION_BITS
            )));
        }

        if self.dead_zone < 0 || self.dead_zone > self.max_pwm() {
            return Err(ConfigError::invalid(format!(
                "motor dead_zone {} outside 0..={}",
                self.dead_zone,
                self.max_pwm()
            )));
        }

        Ok(())
    }

    /// Largest duty for the configured resolution: `2^bits - 1`.
    ///
    /// Only meaningful for validated settings.
    #[inline]
    pub fn max_pwm(&self) -> SignedPwm {
        let bits = u32::from(self.resolution_bits.min(15));
        ((1u32 << bits) - 1) as SignedPwm
    }
}

/// Wiring of one drive motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorSettings {
    /// H-bridge wiring.
    #[serde(default)]
    pub kind: MotorDriverKind,
    /// Positive rotation direction.
    pub direction: Direction,
    /// Direction line (`DirectionEnable`) or IN1/IN3 (`DualPwm`).
    pub pin_a: Pin,
    /// Speed line (`DirectionEnable`) or IN2/IN4 (`DualPwm`).
    pub pin_b: Pin,
    /// PWM channel (0..=15).
    pub channel: Channel,
}

impl MotorSettings {
    /// Validate the settings.
    ///
    /// # Validation Rules
    /// 1. `channel` <= `MAX_PWM_CHANNEL`
    /// 2. `pin_a` != `pin_b`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel > MAX_PWM_CHANNEL {
            return Err(ConfigError::invalid(format!(
                "motor channel {} > {}",
                self.channel, MAX_PWM_CHANNEL
            )));
        }

        if self.pin_a == self.pin_b {
            return Err(ConfigError::invalid(format!(
                "motor pin_a and pin_b are both {}",
                self.pin_a
            )));
        }

        Ok(())
    }
}
