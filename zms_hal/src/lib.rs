//! # ZMS HAL Library
//!
//! Device drivers and board backends for the Zoomers robot.
//!
//! Drivers are written against the capability traits in `zms_common::hal`
//! and never against a concrete board, so the same stack runs on hardware
//! and on [`drivers::simulation::SimulationBoard`].
//!
//! # Module Structure
//!
//! - [`mapping`] - normalized/angle command to PWM duty conversion
//! - [`devices`] - encoder, motor, servo, manipulator, distance sensor
//! - [`periphery`] - every device of the robot in one context struct
//! - [`board_registry`] - board backend factory registration
//! - [`drivers`] - board backend implementations
//! - [`clock`] - system and manual clocks
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        zms_hal                               │
//! │  ┌──────────────┐   ┌───────────────┐   ┌─────────────────┐  │
//! │  │  Periphery   │──►│   devices     │──►│    mapping      │  │
//! │  └──────┬───────┘   └──────┬────────┘   └─────────────────┘  │
//! │         │                  │ Gpio/Pwm/Adc/EdgeInterrupts     │
//! │         ▼                  ▼                                 │
//! │  ┌──────────────┐   ┌───────────────┐                        │
//! │  │BoardRegistry │──►│ Arc<dyn Board>│                        │
//! │  └──────────────┘   └───────────────┘                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod board_registry;
pub mod clock;
pub mod devices;
pub mod drivers;
pub mod mapping;
pub mod periphery;

pub use crate::board_registry::BoardRegistry;
pub use crate::clock::{ManualClock, SystemClock};
pub use crate::drivers::simulation::SimulationBoard;
pub use crate::mapping::{MotorDrive, MotorMapper, ServoMapper};
pub use crate::periphery::Periphery;
