//! Robot settings document.
//!
//! Every actuator and sensor record lives in one TOML document. Missing
//! sections fall back to the values wired on the reference robot.
//!
//! # Module Structure
//!
//! - `motor` - drive motor wiring and PWM
//! - `servo` - servo PWM, pulse map, manipulator axes
//! - `encoder` - quadrature encoder pins and tick conversion
//! - `sharp` - analog distance sensors
//!
//! # TOML Example
//!
//! ```toml
//! [link]
//! timeout_ms = 250
//!
//! [motor_pwm]
//! frequency_hz = 20000
//! dead_zone = 580
//! resolution_bits = 10
//!
//! [left_motor]
//! direction = "ccw"
//! pin_a = 27
//! pin_b = 21
//! channel = 0
//! ```

pub mod encoder;
pub mod motor;
pub mod servo;
pub mod sharp;

pub use encoder::{ConversionSettings, EncoderPins, Millimeters, Ticks};
pub use motor::{Direction, MotorDriverKind, MotorPwmSettings, MotorSettings, SignedPwm};
pub use servo::{
    AxisSettings, Degrees, ManipulatorSettings, Microseconds, PulsePoint, PulseSettings,
    ServoDriverSettings, ServoPwmSettings,
};
pub use sharp::SharpSettings;

use crate::config::{ConfigError, SharedConfig};
use crate::consts::DEFAULT_LINK_TIMEOUT_MS;
use crate::hal::Edge;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Remote link supervision settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSettings {
    /// Silence after which the link is considered lost.
    pub timeout_ms: u64,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_LINK_TIMEOUT_MS,
        }
    }
}

impl LinkSettings {
    /// Timeout as a `Duration`.
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::invalid("link timeout_ms must be greater than 0"));
        }
        Ok(())
    }
}

/// Complete robot settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotSettings {
    /// Logging and identity.
    pub shared: SharedConfig,
    /// Remote link supervision.
    pub link: LinkSettings,
    /// PWM shared by both drive motors.
    pub motor_pwm: MotorPwmSettings,
    /// Left drive motor.
    pub left_motor: MotorSettings,
    /// Right drive motor.
    pub right_motor: MotorSettings,
    /// Arm and claw servos.
    pub manipulator: ManipulatorSettings,
    /// Tick/distance conversion shared by both encoders.
    pub encoder_conversion: ConversionSettings,
    /// Left wheel encoder.
    pub left_encoder: EncoderPins,
    /// Right wheel encoder.
    pub right_encoder: EncoderPins,
    /// Left distance sensor.
    pub left_distance_sensor: SharpSettings,
    /// Right distance sensor.
    pub right_distance_sensor: SharpSettings,
}

impl Default for RobotSettings {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            link: LinkSettings::default(),
            motor_pwm: MotorPwmSettings::default(),
            left_motor: MotorSettings {
                kind: MotorDriverKind::DirectionEnable,
                direction: Direction::Ccw,
                pin_a: 27,
                pin_b: 21,
                channel: 0,
            },
            right_motor: MotorSettings {
                kind: MotorDriverKind::DirectionEnable,
                direction: Direction::Cw,
                pin_a: 19,
                pin_b: 18,
                channel: 1,
            },
            manipulator: ManipulatorSettings::default(),
            encoder_conversion: ConversionSettings::default(),
            left_encoder: EncoderPins {
                phase_a: 32,
                phase_b: 33,
                edge: Edge::Rising,
            },
            right_encoder: EncoderPins {
                phase_a: 25,
                phase_b: 26,
                edge: Edge::Falling,
            },
            left_distance_sensor: SharpSettings::new(34, 10),
            right_distance_sensor: SharpSettings::new(35, 10),
        }
    }
}

impl RobotSettings {
    /// Validate every record.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError::ValidationError` found, prefixed with
    /// the section name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn section(name: &str, result: Result<(), ConfigError>) -> Result<(), ConfigError> {
            result.map_err(|e| match e {
                ConfigError::ValidationError(msg) => {
                    ConfigError::ValidationError(format!("[{name}] {msg}"))
                }
                other => other,
            })
        }

        section("shared", self.shared.validate())?;
        section("link", self.link.validate())?;
        section("motor_pwm", self.motor_pwm.validate())?;
        section("left_motor", self.left_motor.validate())?;
        section("right_motor", self.right_motor.validate())?;
        section("manipulator", self.manipulator.validate())?;
        section("encoder_conversion", self.encoder_conversion.validate())?;
        section("left_encoder", self.left_encoder.validate())?;
        section("right_encoder", self.right_encoder.validate())?;
        section("left_distance_sensor", self.left_distance_sensor.validate())?;
        section("right_distance_sensor", self.right_distance_sensor.validate())?;

        let channels = [
            ("left_motor", self.left_motor.channel),
            ("right_motor", self.right_motor.channel),
            ("manipulator.claw", self.manipulator.claw.channel),
            ("manipulator.arm", self.manipulator.arm.channel),
        ];
        for (i, (name, channel)) in channels.iter().enumerate() {
            if let Some((other, _)) = channels[i + 1..].iter().find(|(_, c)| c == channel) {
                return Err(ConfigError::invalid(format!(
                    "{name} and {other} share PWM channel {channel}"
                )));
            }
        }

        Ok(())
    }
}
