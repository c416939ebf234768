//! Drive motor driver.

use crate::mapping::{MotorDrive, MotorMapper};
use std::sync::Arc;
use tracing::{debug, error, info};
use zms_common::hal::{Board, Gpio, HalError, Pwm};
use zms_common::settings::{MotorDriverKind, MotorPwmSettings, MotorSettings, SignedPwm};

/// One drive motor behind an H-bridge.
///
/// # Wiring
///
/// | Kind              | Line A                 | Line B              |
/// |-------------------|------------------------|---------------------|
/// | `DirectionEnable` | digital direction      | PWM on `channel`    |
/// | `DualPwm`         | PWM when line A active | PWM otherwise       |
pub struct MotorDriver {
    board: Arc<dyn Board>,
    settings: MotorSettings,
    pwm: MotorPwmSettings,
    mapper: MotorMapper,
}

impl MotorDriver {
    /// Create a driver with validated settings. Hardware is untouched until
    /// [`MotorDriver::init`].
    pub fn new(
        board: Arc<dyn Board>,
        settings: MotorSettings,
        pwm: MotorPwmSettings,
    ) -> Result<Self, HalError> {
        settings.validate()?;
        let mapper = MotorMapper::new(&pwm, settings.direction)?;

        Ok(Self {
            board,
            settings,
            pwm,
            mapper,
        })
    }

    /// Configure pins and PWM, then stop the motor.
    ///
    /// # Errors
    /// `HalError::PwmSetupFailed` if the board cannot produce the requested
    /// frequency at the requested resolution.
    pub fn init(&self) -> Result<(), HalError> {
        let s = &self.settings;
        info!(
            "motor {:?} pin_a={} pin_b={} channel={}",
            s.kind, s.pin_a, s.pin_b, s.channel
        );

        self.board.configure_output(s.pin_a)?;
        self.board.configure_output(s.pin_b)?;

        let frequency_hz = u32::from(self.pwm.frequency_hz);
        match s.kind {
            MotorDriverKind::DirectionEnable => {
                let achieved = self
                    .board
                    .setup_channel(s.channel, frequency_hz, self.pwm.resolution_bits)
                    .inspect_err(|e| error!("motor PWM setup failed: {e}"))?;
                debug!("motor channel {} running at {} Hz", s.channel, achieved);
                self.board.attach_pin(s.pin_b, s.channel)?;
            }
            MotorDriverKind::DualPwm => {
                self.board
                    .configure_analog_write(frequency_hz, self.pwm.resolution_bits)?;
            }
        }

        debug!(
            "motor max_pwm={} dead_zone={} resolution={}",
            self.mapper.max_pwm(),
            self.pwm.dead_zone,
            self.pwm.resolution_bits
        );

        self.stop();
        Ok(())
    }

    /// Drive with a normalized command in `[-1, 1]`.
    pub fn set(&self, value: f32) {
        self.write(self.mapper.from_normalized(value));
    }

    /// Drive with signed PWM. The value is clamped to `±max_pwm`.
    pub fn write(&self, pwm: SignedPwm) {
        let MotorDrive {
            line_a_active,
            duty,
        } = self.mapper.drive(pwm);
        let s = &self.settings;

        match s.kind {
            MotorDriverKind::DirectionEnable => {
                self.board.write(s.pin_a, line_a_active);
                self.board.write_duty(s.channel, duty);
            }
            MotorDriverKind::DualPwm => {
                let (a, b) = if line_a_active { (duty, 0) } else { (0, duty) };
                self.board.analog_write(s.pin_a, a);
                self.board.analog_write(s.pin_b, b);
            }
        }
    }

    /// Zero output.
    #[inline]
    pub fn stop(&self) {
        self.write(0);
    }

    /// Normalized command to PWM conversion in use.
    pub fn mapper(&self) -> &MotorMapper {
        &self.mapper
    }
}
