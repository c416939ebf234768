//! Every device on the robot, built from one settings document.

use crate::devices::{Manipulator, MotorDriver, QuadratureCounter, Sharp};
use std::sync::Arc;
use tracing::{error, info, warn};
use zms_common::hal::{Board, HalError};
use zms_common::settings::{Millimeters, RobotSettings};

/// Device context owned by the control service.
///
/// # Lifecycle
///
/// 1. [`Periphery::new`] validates the full settings document and builds
///    every driver without touching hardware
/// 2. [`Periphery::init`] configures the board; drive outputs start stopped
/// 3. Command methods and accessors are used from the poll loop
pub struct Periphery {
    board: Arc<dyn Board>,
    left_motor: MotorDriver,
    right_motor: MotorDriver,
    manipulator: Manipulator,
    left_encoder: QuadratureCounter,
    right_encoder: QuadratureCounter,
    left_distance: Sharp,
    right_distance: Sharp,
}

impl Periphery {
    /// Build every driver from `settings`.
    ///
    /// # Errors
    /// `HalError::ConfigError` naming the offending section.
    pub fn new(board: Arc<dyn Board>, settings: &RobotSettings) -> Result<Self, HalError> {
        settings.validate()?;

        Ok(Self {
            left_motor: MotorDriver::new(board.clone(), settings.left_motor, settings.motor_pwm)?,
            right_motor: MotorDriver::new(
                board.clone(),
                settings.right_motor,
                settings.motor_pwm,
            )?,
            manipulator: Manipulator::new(board.clone(), &settings.manipulator)?,
            left_encoder: QuadratureCounter::new(
                board.clone(),
                settings.left_encoder,
                settings.encoder_conversion,
            )?,
            right_encoder: QuadratureCounter::new(
                board.clone(),
                settings.right_encoder,
                settings.encoder_conversion,
            )?,
            left_distance: Sharp::new(board.clone(), settings.left_distance_sensor)?,
            right_distance: Sharp::new(board.clone(), settings.right_distance_sensor)?,
            board,
        })
    }

    /// Configure every device on the board.
    ///
    /// The manipulator is left released until the first command.
    pub fn init(&self) -> Result<(), HalError> {
        info!("Initializing periphery on board '{}'", self.board.name());

        self.left_motor
            .init()
            .inspect_err(|e| error!("left motor init failed: {e}"))?;
        self.right_motor
            .init()
            .inspect_err(|e| error!("right motor init failed: {e}"))?;
        self.manipulator.init()?;
        self.left_encoder
            .init()
            .inspect_err(|e| error!("left encoder init failed: {e}"))?;
        self.right_encoder
            .init()
            .inspect_err(|e| error!("right encoder init failed: {e}"))?;
        self.left_distance
            .init()
            .inspect_err(|e| error!("left distance sensor init failed: {e}"))?;
        self.right_distance
            .init()
            .inspect_err(|e| error!("right distance sensor init failed: {e}"))?;

        self.manipulator.disable();
        info!("Periphery ready");
        Ok(())
    }

    /// Stop both drive motors and release both servos.
    pub fn failsafe(&self) {
        warn!("Failsafe: stopping motors, releasing manipulator");
        self.stop_motors();
        self.manipulator.disable();
    }

    /// Drive both motors with normalized commands.
    pub fn set_motors(&self, left: f32, right: f32) {
        self.left_motor.set(left);
        self.right_motor.set(right);
    }

    /// Stop both drive motors.
    pub fn stop_motors(&self) {
        self.left_motor.stop();
        self.right_motor.stop();
    }

    /// Averaged left and right distance readings. Blocks for both sample windows.
    pub fn distances(&self) -> (Millimeters, Millimeters) {
        (
            self.left_distance.read_millimeters(),
            self.right_distance.read_millimeters(),
        )
    }

    /// Board the devices run on.
    pub fn board(&self) -> &Arc<dyn Board> {
        &self.board
    }

    /// Left drive motor.
    pub fn left_motor(&self) -> &MotorDriver {
        &self.left_motor
    }

    /// Right drive motor.
    pub fn right_motor(&self) -> &MotorDriver {
        &self.right_motor
    }

    /// Arm and claw.
    pub fn manipulator(&self) -> &Manipulator {
        &self.manipulator
    }

    /// Left wheel encoder.
    pub fn left_encoder(&self) -> &QuadratureCounter {
        &self.left_encoder
    }

    /// Right wheel encoder.
    pub fn right_encoder(&self) -> &QuadratureCounter {
        &self.right_encoder
    }

    /// Left distance sensor.
    pub fn left_distance(&self) -> &Sharp {
        &self.left_distance
    }

    /// Right distance sensor.
    pub fn right_distance(&self) -> &Sharp {
        &self.right_distance
    }
}
