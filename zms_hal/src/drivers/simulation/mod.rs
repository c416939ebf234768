//! Simulation backend.
//!
//! Runs the full device stack without hardware. Used by the control service
//! when started with `--board simulation` and by every hardware-facing test.

mod board;

pub use board::{
    ChannelState, FIRST_INPUT_ONLY_PIN, MAX_PWM_RESOLUTION_BITS, PIN_COUNT, PWM_SOURCE_CLOCK_HZ,
    PinMode, SimulationBoard, create_board,
};
