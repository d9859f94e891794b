//! The transport boundary (§1: "The byte transport ... is out of scope,
//! named only by interface").
//!
//! A [`ByteChannel`] is the only way the core touches bytes outside of pure
//! codec functions. Implementations wrap a serial port or a TCP socket; test
//! code uses [`crate::test_util::MockChannel`].

use std::time::Instant;

use crate::error::Result;

/// A half-duplex byte-oriented transport: read up to `n` bytes (blocking
/// until the deadline), write bytes, and discard buffered input.
///
/// Implementations are not required to be `Send`/`Sync`; a `Client` owns
/// exactly one `ByteChannel` and the caller is responsible for serializing
/// access (§5: "not safe for concurrent operations from multiple callers").
pub trait ByteChannel {
    /// Read up to `max_len` bytes, blocking until either that many bytes are
    /// available or `deadline` elapses.
    ///
    /// Implementations MAY return fewer than `max_len` bytes without error
    /// (a partial read); callers that need an exact frame use
    /// [`crate::driver::ChannelDriver::receive_frame`], which loops until a
    /// complete frame is found or the deadline elapses.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ChannelError::Timeout`] if `deadline` elapses
    /// before any bytes are available, or
    /// [`crate::error::ChannelError::Io`]/[`crate::error::ChannelError::Closed`]
    /// on a transport failure.
    fn read(&mut self, max_len: usize, deadline: Instant) -> Result<Vec<u8>>;

    /// Write `bytes` to the channel.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ChannelError::Io`]/[`crate::error::ChannelError::Closed`]
    /// on a transport failure.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Discard any buffered, not-yet-consumed input. Used before a fresh
    /// request and between retries, so stray bytes from a previous timeout
    /// never leak into the next frame (§4.4, §5).
    fn clear_input(&mut self);
}
