//! Network transports.
//!
//! - [`TcpBridgeStream`] - bridge byte stream to one host at a time
//! - [`spawn_remote_listener`] - UDP thread feeding remote datagrams to a
//!   [`RemoteDemux`]

use crate::remote::RemoteDemux;
use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};
use zms_common::bridge::{InputStream, OutputStream};
use zms_common::hal::Clock;

/// Read timeout for argument bytes of a started message.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Longest a reply may block on a host that stopped reading. Must stay
/// below the link timeout.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(20);

/// Receive timeout of the remote thread; bounds shutdown latency.
const REMOTE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Largest datagram accepted; bigger ones are truncated and reported as unknown.
const MAX_DATAGRAM: usize = 64;

/// Bridge stream over TCP.
///
/// Listens without blocking and serves a single host. When no host is
/// connected, `available()` is 0 and writes fail with `NotConnected`.
/// A host that disconnects is dropped and the next one is accepted.
///
/// Writes block at most `write_timeout`. A host that cannot take a whole
/// frame in that time is dropped, since a partial frame desyncs it.
pub struct TcpBridgeStream {
    listener: TcpListener,
    client: Option<(TcpStream, SocketAddr)>,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl TcpBridgeStream {
    /// Listen on `addr`.
    pub fn bind<A: ToSocketAddrs>(addr: A, read_timeout: Duration) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        info!("Bridge listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            client: None,
            read_timeout,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        })
    }

    /// Bound on a blocked write. Applies to hosts accepted afterwards.
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    /// Bound address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Address of the connected host.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.client.as_ref().map(|(_, peer)| *peer)
    }

    fn accept(&mut self) {
        if self.client.is_some() {
            return;
        }
        match self.listener.accept() {
            Ok((stream, peer)) => match self.configure(&stream) {
                Ok(()) => {
                    info!("Bridge host {} connected", peer);
                    self.client = Some((stream, peer));
                }
                Err(e) => warn!("Bridge host {} rejected: {}", peer, e),
            },
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => warn!("Bridge accept failed: {}", e),
        }
    }

    fn configure(&self, stream: &TcpStream) -> io::Result<()> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(self.read_timeout))?;
        stream.set_write_timeout(Some(self.write_timeout))?;
        stream.set_nodelay(true)
    }

    fn drop_client(&mut self, reason: &dyn std::fmt::Display) {
        if let Some((_, peer)) = self.client.take() {
            info!("Bridge host {} disconnected: {}", peer, reason);
        }
    }

    fn is_fatal(kind: ErrorKind) -> bool {
        matches!(
            kind,
            ErrorKind::UnexpectedEof
                | ErrorKind::BrokenPipe
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::NotConnected
        )
    }

    fn is_fatal_write(kind: ErrorKind) -> bool {
        Self::is_fatal(kind)
            || matches!(
                kind,
                ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::WriteZero
            )
    }
}

impl InputStream for TcpBridgeStream {
    fn available(&mut self) -> usize {
        self.accept();
        let Some((stream, _)) = self.client.as_ref() else {
            return 0;
        };

        let mut probe = [0u8; MAX_DATAGRAM];
        let peeked = stream
            .set_nonblocking(true)
            .and_then(|()| stream.peek(&mut probe));
        let restored = stream.set_nonblocking(false);

        match (peeked, restored) {
            (Ok(0), _) => {
                self.drop_client(&"end of stream");
                0
            }
            (Ok(n), Ok(())) => n,
            (Err(e), _) if e.kind() == ErrorKind::WouldBlock => 0,
            (Err(e), _) | (Ok(_), Err(e)) => {
                self.drop_client(&e);
                0
            }
        }
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let Some((stream, _)) = self.client.as_mut() else {
            return Err(ErrorKind::NotConnected.into());
        };
        let result = stream.read_exact(buf);
        if let Err(e) = &result {
            if Self::is_fatal(e.kind()) {
                self.drop_client(e);
            }
        }
        result
    }
}

impl OutputStream for TcpBridgeStream {
    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        let Some((stream, _)) = self.client.as_mut() else {
            return Err(ErrorKind::NotConnected.into());
        };
        let result = stream.write_all(buf);
        if let Err(e) = &result {
            if Self::is_fatal_write(e.kind()) {
                self.drop_client(e);
            }
        }
        result
    }

    fn flush_bytes(&mut self) -> io::Result<()> {
        match self.client.as_mut() {
            Some((stream, _)) => stream.flush(),
            None => Err(ErrorKind::NotConnected.into()),
        }
    }
}

/// Receive remote datagrams on `addr` until `running` clears.
///
/// Each datagram is handed whole to `demux`.
pub fn spawn_remote_listener<A, C>(
    addr: A,
    demux: RemoteDemux<C>,
    running: Arc<AtomicBool>,
) -> io::Result<JoinHandle<()>>
where
    A: ToSocketAddrs,
    C: Clock + ?Sized + 'static,
{
    let socket = UdpSocket::bind(addr)?;
    socket.set_read_timeout(Some(REMOTE_POLL_INTERVAL))?;
    info!("Remote listening on {}", socket.local_addr()?);

    std::thread::Builder::new()
        .name("zms-remote".into())
        .spawn(move || {
            let mut buf = [0u8; MAX_DATAGRAM];
            while running.load(Ordering::SeqCst) {
                match socket.recv_from(&mut buf) {
                    Ok((len, peer)) => {
                        debug!("{} byte datagram from {}", len, peer);
                        demux.handle(&buf[..len]);
                    }
                    Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
                    Err(e) => warn!("Remote receive failed: {}", e),
                }
            }
            debug!("Remote listener stopped");
        })
}
