//! Errors raised by the byte-channel abstraction.
//!
//! These are transport-layer failures: the channel cannot give the caller
//! bytes, either because the underlying I/O failed or because the deadline
//! elapsed first. Protocol-level failures (bad CRC, bad framing) belong to
//! `mnet-proto::ProtocolError` and are layered on top by the client.

use std::io;

use thiserror::Error;

/// Result alias for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;

/// Errors raised while reading from or writing to a [`crate::ByteChannel`].
#[derive(Error, Debug)]
pub enum ChannelError {
    /// The underlying transport (serial port, TCP socket) failed.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),

    /// The caller's deadline elapsed before enough bytes arrived.
    #[error("timed out waiting for {requested} bytes")]
    Timeout {
        /// Number of bytes the caller asked for.
        requested: usize,
    },

    /// The channel was closed by the peer or by the caller.
    #[error("channel closed")]
    Closed,
}

impl ChannelError {
    /// `true` for failures that a caller may reasonably retry without
    /// reconstructing the channel (a timeout waiting for a reply), as
    /// opposed to failures that mean the channel itself is no longer usable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
