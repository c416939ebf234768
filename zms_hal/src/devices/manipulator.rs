//! Two-axis manipulator (arm + claw).

use super::servo::ServoAxis;
use std::sync::Arc;
use tracing::error;
use zms_common::hal::{Board, HalError};
use zms_common::settings::{Degrees, ManipulatorSettings};

/// Arm and claw servos sharing one PWM configuration and pulse map.
///
/// The axes are independent: commanding or releasing one never touches the
/// other.
pub struct Manipulator {
    arm: ServoAxis,
    claw: ServoAxis,
}

impl Manipulator {
    /// Create both axes from validated settings.
    pub fn new(board: Arc<dyn Board>, settings: &ManipulatorSettings) -> Result<Self, HalError> {
        settings.validate()?;
        Ok(Self {
            arm: ServoAxis::new(board.clone(), "arm", settings.arm, settings.driver)?,
            claw: ServoAxis::new(board, "claw", settings.claw, settings.driver)?,
        })
    }

    /// Initialize both axes.
    pub fn init(&self) -> Result<(), HalError> {
        self.arm
            .init()
            .inspect_err(|e| error!("arm servo init failed: {e}"))?;
        self.claw
            .init()
            .inspect_err(|e| error!("claw servo init failed: {e}"))
    }

    /// Move the arm.
    pub fn set_arm(&self, angle: Degrees) {
        self.arm.set(angle);
    }

    /// Move the claw.
    pub fn set_claw(&self, angle: Degrees) {
        self.claw.set(angle);
    }

    /// Release the arm.
    pub fn disable_arm(&self) {
        self.arm.disable();
    }

    /// Release the claw.
    pub fn disable_claw(&self) {
        self.claw.disable();
    }

    /// Release both axes.
    pub fn disable(&self) {
        self.disable_arm();
        self.disable_claw();
    }
}
