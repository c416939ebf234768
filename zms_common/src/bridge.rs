//! Opcode-framed binary bridge between the robot and a host.
//!
//! Every message is `[opcode: u8][arguments...]`. Argument layout is fixed per
//! opcode, so a reader always knows how many bytes to consume; the only
//! variable-length payload (`Log`) carries its own length byte.
//!
//! # Module Structure
//!
//! - `error` - per-message protocol errors
//! - `stream` - byte stream traits and the in-memory stream
//! - `message` - opcode catalogue, `Instruction` and `Telemetry`
//! - `sender` - outbound encoding
//! - `receiver` - inbound decoding
//!
//! # Example
//!
//! ```rust
//! use zms_common::bridge::{BridgeChannel, Instruction, MemoryStream};
//!
//! let mut channel = BridgeChannel::new(MemoryStream::new());
//! channel.stream_mut().feed(&[0x03, 0xF4, 0x01, 0x0C, 0xFE]);
//!
//! let received = channel.poll::<Instruction>();
//! assert_eq!(
//!     received,
//!     Some(Ok(Instruction::SetMotors { left: 500, right: -500 }))
//! );
//! ```

pub mod error;
pub mod message;
pub mod receiver;
pub mod sender;
pub mod stream;

pub use error::BridgeError;
pub use message::{
    AxisCommand, Instruction, LogPayload, Message, Opcode, Telemetry, normalize_motor_command,
};
pub use receiver::{ReceiverStats, receive};
pub use sender::Sender;
pub use stream::{InputStream, MemoryStream, OutputStream};

/// Both halves of the bridge over one owned stream.
pub struct BridgeChannel<S> {
    stream: S,
    stats: ReceiverStats,
}

impl<S: InputStream + OutputStream> BridgeChannel<S> {
    /// Wrap a stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            stats: ReceiverStats::default(),
        }
    }

    /// Decode at most one pending message. See [`receive`].
    pub fn poll<M: Message>(&mut self) -> Option<Result<M, BridgeError>> {
        let result = receive::<M, S>(&mut self.stream)?;
        self.stats.record(&result);
        Some(result)
    }

    /// Sender over the channel's stream.
    pub fn sender(&mut self) -> Sender<'_, S> {
        Sender::new(&mut self.stream)
    }

    /// Encode one message.
    pub fn send<M: Message>(&mut self, message: &M) -> Result<(), BridgeError> {
        self.sender().send(message)
    }

    /// Receiver statistics.
    pub fn stats(&self) -> ReceiverStats {
        self.stats
    }

    /// Underlying stream.
    pub fn stream(&self) -> &S {
        &self.stream
    }

    /// Underlying stream, mutably.
    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Unwrap the stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}
