//! Position servo on a PWM channel.

use crate::mapping::ServoMapper;
use std::sync::Arc;
use tracing::{debug, info};
use zms_common::hal::{Board, HalError, Pwm};
use zms_common::settings::{AxisSettings, Degrees, ServoDriverSettings};

/// One servo axis: angle command in, PWM duty out.
pub struct ServoAxis {
    board: Arc<dyn Board>,
    name: &'static str,
    axis: AxisSettings,
    driver: ServoDriverSettings,
    mapper: ServoMapper,
}

impl ServoAxis {
    /// Create an axis. The axis range must lie inside the pulse map.
    pub fn new(
        board: Arc<dyn Board>,
        name: &'static str,
        axis: AxisSettings,
        driver: ServoDriverSettings,
    ) -> Result<Self, HalError> {
        let mapper = ServoMapper::new(&driver, &axis)?;
        Ok(Self {
            board,
            name,
            axis,
            driver,
            mapper,
        })
    }

    /// Set up the PWM channel and route it to the signal pin.
    pub fn init(&self) -> Result<(), HalError> {
        info!(
            "servo {} pin={} channel={} range={}..={}",
            self.name, self.axis.pin, self.axis.channel, self.axis.min_angle, self.axis.max_angle
        );

        let achieved = self.board.setup_channel(
            self.axis.channel,
            self.driver.pwm.frequency_hz,
            self.driver.pwm.resolution_bits,
        )?;
        debug!("servo {} channel running at {} Hz", self.name, achieved);

        self.board.attach_pin(self.axis.pin, self.axis.channel)
    }

    /// Move to `angle`, clamped to the axis range.
    pub fn set(&self, angle: Degrees) {
        self.board
            .write_duty(self.axis.channel, self.mapper.duty_from_angle(angle));
    }

    /// Release the signal line (duty 0).
    pub fn disable(&self) {
        self.board.write_duty(self.axis.channel, 0);
    }

    /// Axis name used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Angle to duty conversion in use.
    pub fn mapper(&self) -> &ServoMapper {
        &self.mapper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::simulation::SimulationBoard;
    use zms_common::settings::ManipulatorSettings;

    #[test]
    fn set_and_disable() {
        let (board, _clock) = SimulationBoard::with_manual_clock();
        let defaults = ManipulatorSettings::default();
        let servo = ServoAxis::new(board.clone(), "arm", defaults.arm, defaults.driver).unwrap();
        servo.init().unwrap();

        assert_eq!(board.channel(14).unwrap().pins, vec![14]);

        servo.set(180);
        assert_eq!(board.channel_duty(14), Some(122));

        servo.set(-90);
        assert_eq!(board.channel_duty(14), Some(25));

        servo.disable();
        assert_eq!(board.channel_duty(14), Some(0));
    }
}
