//! Host end of the bridge over TCP.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};
use zms_common::bridge::{
    BridgeChannel, BridgeError, InputStream, Instruction, OutputStream, Telemetry,
};

/// Largest peek used to size `available()`.
const PEEK_WINDOW: usize = 64;

/// Interval between polls while waiting for a reply.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Blocking TCP stream with a bounded read timeout.
///
/// Once the robot closes the connection or the socket fails, `available()`
/// stays 0 and [`HostStream::check`] reports why.
pub struct HostStream {
    stream: TcpStream,
    closed: Option<ErrorKind>,
}

impl HostStream {
    /// Connect to the robot.
    pub fn connect<A: ToSocketAddrs>(addr: A, read_timeout: Duration) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_read_timeout(Some(read_timeout))?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            closed: None,
        })
    }

    /// `Err` once the connection is gone.
    pub fn check(&self) -> io::Result<()> {
        match self.closed {
            Some(kind) => Err(kind.into()),
            None => Ok(()),
        }
    }

    fn close(&mut self, kind: ErrorKind) {
        if self.closed.is_none() {
            tracing::debug!("Connection closed: {}", io::Error::from(kind));
            self.closed = Some(kind);
        }
    }
}

impl InputStream for HostStream {
    fn available(&mut self) -> usize {
        if self.closed.is_some() {
            return 0;
        }

        let mut probe = [0u8; PEEK_WINDOW];
        let peeked = self
            .stream
            .set_nonblocking(true)
            .and_then(|()| self.stream.peek(&mut probe));
        let restored = self.stream.set_nonblocking(false);

        match (peeked, restored) {
            (Ok(0), _) => {
                self.close(ErrorKind::UnexpectedEof);
                0
            }
            (_, Err(e)) => {
                self.close(e.kind());
                0
            }
            (Ok(n), Ok(())) => n,
            (Err(e), Ok(())) if e.kind() == ErrorKind::WouldBlock => 0,
            (Err(e), Ok(())) => {
                self.close(e.kind());
                0
            }
        }
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.check()?;
        self.stream.read_exact(buf)
    }
}

impl OutputStream for HostStream {
    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        self.check()?;
        self.stream.write_all(buf)
    }

    fn flush_bytes(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// Reasons a request went unanswered.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Encoding or sending failed.
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    /// The robot closed the connection.
    #[error("connection lost: {0}")]
    Connection(#[from] io::Error),
    /// No matching reply before the deadline.
    #[error("no reply within {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// Send `instruction` and wait for the first telemetry accepted by `pick`.
///
/// Telemetry that does not match, logs included, is handed to `other`.
pub fn request<T>(
    channel: &mut BridgeChannel<HostStream>,
    instruction: &Instruction,
    timeout: Duration,
    mut pick: impl FnMut(&Telemetry) -> Option<T>,
    mut other: impl FnMut(&Telemetry),
) -> Result<T, RequestError> {
    channel.send(instruction)?;

    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        match channel.poll::<Telemetry>() {
            Some(Ok(telemetry)) => match pick(&telemetry) {
                Some(reply) => return Ok(reply),
                None => other(&telemetry),
            },
            Some(Err(e)) => tracing::warn!("Telemetry dropped: {}", e),
            None => {
                channel.stream().check()?;
                std::thread::sleep(WAIT_POLL_INTERVAL);
            }
        }
    }
    Err(RequestError::Timeout(timeout))
}
