//! Outbound half of the bridge.

use super::error::BridgeError;
use super::message::{Message, Telemetry};
use super::stream::OutputStream;
use crate::settings::Millimeters;

/// Encodes messages onto a borrowed output stream.
///
/// Each write is checked. A failure stops the message where it happened;
/// bytes already written stay written.
pub struct Sender<'a, W: OutputStream + ?Sized> {
    out: &'a mut W,
}

impl<'a, W: OutputStream + ?Sized> Sender<'a, W> {
    /// Wrap an output stream.
    pub fn new(out: &'a mut W) -> Self {
        Self { out }
    }

    /// Write opcode and arguments of `message`.
    ///
    /// # Errors
    /// `CodeWriteFail` if the opcode could not be written,
    /// `ArgumentWriteFail` if any argument could not be written.
    pub fn send<M: Message>(&mut self, message: &M) -> Result<(), BridgeError> {
        let code = message.opcode();
        self.out
            .write_u8(code)
            .map_err(|_| BridgeError::CodeWriteFail(code))?;
        message
            .encode_args(&mut *self.out)
            .map_err(|_| BridgeError::ArgumentWriteFail(code))?;
        self.out
            .flush_bytes()
            .map_err(|_| BridgeError::ArgumentWriteFail(code))
    }

    /// Send the robot uptime.
    pub fn send_millis(&mut self, millis: u32) -> Result<(), BridgeError> {
        self.send(&Telemetry::Millis(millis))
    }

    /// Send a log line, truncated to 255 bytes.
    pub fn send_log(&mut self, text: &str) -> Result<(), BridgeError> {
        self.send(&Telemetry::log(text))
    }

    /// Send both distance readings.
    pub fn send_distances(
        &mut self,
        left_mm: Millimeters,
        right_mm: Millimeters,
    ) -> Result<(), BridgeError> {
        self.send(&Telemetry::distances(left_mm, right_mm))
    }
}
