//! Byte stream abstraction used by the bridge.
//!
//! The bridge only needs to know how many bytes are ready, to read an exact
//! number of them, and to write. Multi-byte values are little-endian.

use std::collections::VecDeque;
use std::io;

/// Readable half of a bridge stream.
pub trait InputStream {
    /// Bytes that can be read without blocking.
    fn available(&mut self) -> usize;

    /// Fill `buf` completely.
    ///
    /// # Errors
    /// `io::ErrorKind::UnexpectedEof` (or the transport's error) if the
    /// stream ends or times out first. Bytes read before the failure are
    /// consumed.
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Read one byte.
    fn read_u8(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.read_bytes(&mut buf)?;
        Ok(buf[0])
    }

    /// Read a little-endian `u16`.
    fn read_u16(&mut self) -> io::Result<u16> {
        let mut buf = [0u8; 2];
        self.read_bytes(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Read a little-endian `i16`.
    fn read_i16(&mut self) -> io::Result<i16> {
        let mut buf = [0u8; 2];
        self.read_bytes(&mut buf)?;
        Ok(i16::from_le_bytes(buf))
    }

    /// Read a little-endian `u32`.
    fn read_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_bytes(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}

/// Writable half of a bridge stream.
pub trait OutputStream {
    /// Write all of `buf`.
    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Push buffered bytes to the transport.
    fn flush_bytes(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Write one byte.
    fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.write_bytes(&[value])
    }

    /// Write a little-endian `u16`.
    fn write_u16(&mut self, value: u16) -> io::Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Write a little-endian `i16`.
    fn write_i16(&mut self, value: i16) -> io::Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Write a little-endian `u32`.
    fn write_u32(&mut self, value: u32) -> io::Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }
}

/// In-memory loopback stream.
///
/// Incoming bytes are queued with [`MemoryStream::feed`], outgoing bytes are
/// collected and taken with [`MemoryStream::take_output`]. An optional output
/// limit makes writes fail once reached, to emulate a stalled transport.
#[derive(Debug, Default)]
pub struct MemoryStream {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    tx_limit: Option<usize>,
}

impl MemoryStream {
    /// Empty stream with unlimited output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream whose output fails after `limit` bytes.
    pub fn with_output_limit(limit: usize) -> Self {
        Self {
            tx_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Queue bytes for reading.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Bytes written so far; clears the output buffer.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }

    /// Bytes written so far.
    pub fn output(&self) -> &[u8] {
        &self.tx
    }
}

impl InputStream for MemoryStream {
    fn available(&mut self) -> usize {
        self.rx.len()
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<()> {
        if self.rx.len() < buf.len() {
            self.rx.clear();
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("needed {} bytes", buf.len()),
            ));
        }

        let n = buf.len();
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(())
    }
}

impl OutputStream for MemoryStream {
    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        if let Some(limit) = self.tx_limit {
            let room = limit.saturating_sub(self.tx.len());
            if buf.len() > room {
                self.tx.extend_from_slice(&buf[..room]);
                return Err(io::Error::new(io::ErrorKind::WriteZero, "output limit reached"));
            }
        }

        self.tx.extend_from_slice(buf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_round_trip() {
        let mut stream = MemoryStream::new();
        stream.write_u16(0x1234).unwrap();
        stream.write_i16(-2).unwrap();
        stream.write_u32(0xDEADBEEF).unwrap();

        let bytes = stream.take_output();
        assert_eq!(&bytes[..2], &[0x34, 0x12]);

        stream.feed(&bytes);
        assert_eq!(stream.available(), 8);
        assert_eq!(stream.read_u16().unwrap(), 0x1234);
        assert_eq!(stream.read_i16().unwrap(), -2);
        assert_eq!(stream.read_u32().unwrap(), 0xDEADBEEF);
        assert_eq!(stream.available(), 0);
    }

    #[test]
    fn exact_read_takes_only_what_was_asked() {
        let mut stream = MemoryStream::new();
        stream.feed(&[1, 2, 3, 4, 5]);

        let mut buf = [0u8; 3];
        stream.read_bytes(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(stream.available(), 2);

        let mut empty = [0u8; 0];
        stream.read_bytes(&mut empty).unwrap();
        assert_eq!(stream.available(), 2);
    }

    #[test]
    fn short_read_fails_and_consumes_partial_bytes() {
        let mut stream = MemoryStream::new();
        stream.feed(&[0x01]);

        let err = stream.read_u16().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(stream.available(), 0);

        stream.feed(&[0x07]);
        assert_eq!(stream.read_u8().unwrap(), 0x07);
    }

    #[test]
    fn output_limit_truncates_and_fails() {
        let mut stream = MemoryStream::with_output_limit(3);
        stream.write_u16(0xAAAA).unwrap();

        assert!(stream.write_u16(0xBBBB).is_err());
        assert_eq!(stream.output(), &[0xAA, 0xAA, 0xBB]);
        assert!(stream.write_u8(0).is_err());
    }
}
