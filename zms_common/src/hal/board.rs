//! Board capability traits and error types.
//!
//! This module defines:
//! - `Gpio`, `Pwm`, `Adc`, `EdgeInterrupts`, `Clock` - capability traits
//! - `Board` - union of all capabilities, implemented by board backends
//! - `EdgeHandler` - interrupt-context callback for edge interrupts
//! - `HalError` enum - Error types for board operations
//! - `BoardFactory` type alias - Factory function type

use crate::config::ConfigError;
use crate::hal::types::{Channel, Edge, Pin};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Error types for board operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HalError {
    /// Driver or board initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Settings rejected by validation
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// PWM peripheral refused the requested frequency/resolution
    #[error("PWM setup failed on channel {channel} ({frequency_hz} Hz, {resolution_bits} bits)")]
    PwmSetupFailed {
        /// Requested channel
        channel: Channel,
        /// Requested frequency
        frequency_hz: u32,
        /// Requested resolution
        resolution_bits: u8,
    },

    /// Pin does not exist or cannot serve the requested function
    #[error("Pin {0} is not available")]
    PinUnavailable(Pin),

    /// Board backend not found
    #[error("Board backend not found: {0}")]
    BoardNotFound(String),
}

impl From<ConfigError> for HalError {
    fn from(error: ConfigError) -> Self {
        Self::ConfigError(error.to_string())
    }
}

/// Factory function type for creating board backends.
pub type BoardFactory = fn() -> Arc<dyn Board>;

/// Digital pin access.
pub trait Gpio: Send + Sync {
    /// Configure `pin` as a digital input.
    fn configure_input(&self, pin: Pin) -> Result<(), HalError>;

    /// Configure `pin` as a digital output.
    fn configure_output(&self, pin: Pin) -> Result<(), HalError>;

    /// Current level of `pin`. Must be safe to call from interrupt context.
    fn read(&self, pin: Pin) -> bool;

    /// Drive `pin` high or low.
    fn write(&self, pin: Pin, high: bool);
}

/// PWM peripheral access.
///
/// Two flavours are exposed: channel-based PWM (a channel is set up once with
/// a frequency/resolution and then attached to a pin) and pin-level
/// `analog_write` sharing one global frequency/resolution.
pub trait Pwm: Send + Sync {
    /// Configure `channel`. Returns the frequency actually achieved.
    ///
    /// # Errors
    /// `HalError::PwmSetupFailed` if the peripheral cannot produce the request.
    fn setup_channel(
        &self,
        channel: Channel,
        frequency_hz: u32,
        resolution_bits: u8,
    ) -> Result<u32, HalError>;

    /// Route `channel` output to `pin`.
    fn attach_pin(&self, pin: Pin, channel: Channel) -> Result<(), HalError>;

    /// Set the duty of a configured channel.
    fn write_duty(&self, channel: Channel, duty: u32);

    /// Configure frequency/resolution used by `analog_write`.
    fn configure_analog_write(&self, frequency_hz: u32, resolution_bits: u8) -> Result<(), HalError>;

    /// Pin-level PWM output.
    fn analog_write(&self, pin: Pin, duty: u32);
}

/// Analog-to-digital converter access.
pub trait Adc: Send + Sync {
    /// Configure `pin` as an analog input sampled at `resolution_bits`.
    fn configure_analog_input(&self, pin: Pin, resolution_bits: u8) -> Result<(), HalError>;

    /// Take one sample from `pin`.
    fn analog_read(&self, pin: Pin) -> u16;
}

/// Callback invoked from interrupt context on a qualifying edge.
///
/// Implementations must complete in bounded time and must not block.
pub trait EdgeHandler: Send + Sync {
    /// Handle one edge. `gpio` gives synchronous access to other pin levels.
    fn on_edge(&self, gpio: &dyn Gpio);
}

/// Edge interrupt controller.
pub trait EdgeInterrupts: Send + Sync {
    /// Attach `handler` to `edge` transitions of `pin`, replacing any previous handler.
    fn attach_interrupt(
        &self,
        pin: Pin,
        edge: Edge,
        handler: Arc<dyn EdgeHandler>,
    ) -> Result<(), HalError>;

    /// Detach the handler of `pin`. Detaching an unattached pin is a no-op.
    fn detach_interrupt(&self, pin: Pin);
}

/// Monotonic time source.
pub trait Clock: Send + Sync {
    /// Time elapsed since the board started.
    fn now(&self) -> Duration;

    /// Milliseconds since start, wrapping at `u32::MAX` like an MCU tick counter.
    fn millis(&self) -> u32 {
        self.now().as_millis() as u32
    }

    /// Busy-wait or sleep for `duration`.
    fn delay(&self, duration: Duration);
}

/// Complete controller board: every capability a device driver may need.
///
/// # Lifecycle
///
/// 1. Backend constructed by its `BoardFactory`
/// 2. Drivers configure pins/channels during their `init()`
/// 3. Drivers read and write through the capability traits from the poll loop
///    and from `EdgeHandler`s
pub trait Board: Gpio + Pwm + Adc + EdgeInterrupts + Clock {
    /// Returns the backend's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;
}
