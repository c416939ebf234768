//! Device drivers built on the board capability traits.
//!
//! Every driver follows the same lifecycle: `new()` validates settings and
//! refuses to build on invalid ones, `init()` configures the board, after
//! which the command methods never fail.
//!
//! # Module Structure
//!
//! - [`encoder`] - interrupt-driven quadrature counter
//! - [`motor`] - H-bridge drive motor
//! - [`servo`] - PWM position servo axis
//! - [`manipulator`] - arm + claw servo pair
//! - [`sharp`] - analog IR distance sensor

pub mod encoder;
pub mod manipulator;
pub mod motor;
pub mod servo;
pub mod sharp;

pub use encoder::QuadratureCounter;
pub use manipulator::Manipulator;
pub use motor::MotorDriver;
pub use servo::ServoAxis;
pub use sharp::Sharp;
