//! Inbound half of the bridge.

use super::error::BridgeError;
use super::message::Message;
use super::stream::InputStream;

/// Decode at most one message from `input`.
///
/// Returns `None` when no byte is pending. Otherwise one opcode byte is
/// consumed and its arguments are decoded. Unknown opcodes consume only the
/// opcode byte; truncated arguments consume what was available.
pub fn receive<M, R>(input: &mut R) -> Option<Result<M, BridgeError>>
where
    M: Message,
    R: InputStream + ?Sized,
{
    if input.available() == 0 {
        return None;
    }

    let code = match input.read_u8() {
        Ok(code) => code,
        Err(_) => return Some(Err(BridgeError::CodeReadFail)),
    };

    Some(M::decode(code, input))
}

/// Receiver statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    /// Messages decoded successfully.
    pub received: u64,
    /// Messages dropped with an error.
    pub dropped: u64,
    /// Last error seen.
    pub last_error: Option<BridgeError>,
}

impl ReceiverStats {
    /// Account for one `receive` result.
    pub fn record<M>(&mut self, result: &Result<M, BridgeError>) {
        match result {
            Ok(_) => self.received += 1,
            Err(e) => {
                self.dropped += 1;
                self.last_error = Some(*e);
            }
        }
    }
}
