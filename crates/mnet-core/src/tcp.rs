//! TCP transport adapter (§6.7): proxies bytes to a transparent
//! serial-tunnel endpoint (`host:port`).
//!
//! This is the only transport this crate ships; a real serial port adapter
//! would implement the same [`ByteChannel`] trait using a platform serial
//! library, which is outside this core's scope (§1).

use std::{
    io::{ErrorKind, Read, Write},
    net::{TcpStream, ToSocketAddrs},
    time::{Duration, Instant},
};

use crate::{
    channel::ByteChannel,
    error::{ChannelError, Result},
};

/// A [`ByteChannel`] backed by a TCP stream to a serial-tunnel endpoint.
pub struct TcpByteChannel {
    stream: TcpStream,
}

impl TcpByteChannel {
    /// Connect to `addr` and configure the socket for the read-with-deadline
    /// semantics [`ByteChannel::read`] needs.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Io`] if the connection cannot be established.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }
}

impl ByteChannel for TcpByteChannel {
    fn read(&mut self, max_len: usize, deadline: Instant) -> Result<Vec<u8>> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(ChannelError::Timeout { requested: max_len });
        }
        self.stream.set_read_timeout(Some(remaining))?;

        let mut buf = vec![0u8; max_len];
        match self.stream.read(&mut buf) {
            Ok(0) => Err(ChannelError::Closed),
            Ok(n) => {
                buf.truncate(n);
                Ok(buf)
            },
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                Err(ChannelError::Timeout { requested: max_len })
            },
            Err(e) => Err(ChannelError::Io(e)),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes).map_err(ChannelError::Io)
    }

    fn clear_input(&mut self) {
        // Drain whatever is already buffered without blocking.
        let _ = self.stream.set_read_timeout(Some(Duration::from_millis(1)));
        let mut scratch = [0u8; 256];
        loop {
            match self.stream.read(&mut scratch) {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
    }
}
