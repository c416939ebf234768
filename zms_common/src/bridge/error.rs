//! Bridge protocol errors.

use thiserror::Error;

/// Per-message protocol failure.
///
/// None of these close the channel: the offending message is dropped and the
/// next poll starts at the next opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// Opcode byte has no entry in the instruction table.
    #[error("Unknown opcode 0x{0:02X}")]
    UnknownOpcode(u8),

    /// Opcode byte could not be read.
    #[error("Failed to read opcode")]
    CodeReadFail,

    /// Opcode byte could not be written.
    #[error("Failed to write opcode 0x{0:02X}")]
    CodeWriteFail(u8),

    /// Arguments of the given opcode were truncated or unreadable.
    #[error("Failed to read arguments of opcode 0x{0:02X}")]
    ArgumentReadFail(u8),

    /// Arguments of the given opcode could not be written.
    #[error("Failed to write arguments of opcode 0x{0:02X}")]
    ArgumentWriteFail(u8),
}

impl BridgeError {
    /// Opcode the error relates to, if it was known.
    pub const fn opcode(&self) -> Option<u8> {
        match *self {
            Self::UnknownOpcode(code)
            | Self::CodeWriteFail(code)
            | Self::ArgumentReadFail(code)
            | Self::ArgumentWriteFail(code) => Some(code),
            Self::CodeReadFail => None,
        }
    }
}
