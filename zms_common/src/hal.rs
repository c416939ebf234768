//! Board capability traits and hardware types.
//!
//! Device drivers in `zms_hal` talk to the controller exclusively through the
//! traits defined here, so the same driver code runs on a physical board
//! backend and on the in-memory simulation.

pub mod board;
pub mod types;

pub use board::{Adc, Board, BoardFactory, Clock, EdgeHandler, EdgeInterrupts, Gpio, HalError, Pwm};
pub use types::{Channel, Edge, Pin};
