//! Channel driver (C4, §4.4): a thin, type-blind frame pipe over a
//! [`ByteChannel`].
//!
//! The driver does not interpret packet types or payloads — it only knows
//! how to get a complete, CRC-verified frame out of a byte stream, or fail
//! trying. Everything above it (`mnet-client`'s state machine) owns the
//! meaning of the bytes.

use std::time::Instant;

use mnet_proto::{
    ProtocolError,
    frame::{self, ParsedFrame},
};

use crate::{
    channel::ByteChannel,
    error::ChannelError,
};

/// Upper bound on how many bytes [`ChannelDriver::receive_frame`] will
/// accumulate while hunting for a frame, guarding against a peer that never
/// sends a terminator.
const MAX_ACCUMULATED_BYTES: usize = 4096;

/// How many bytes to request per underlying [`ByteChannel::read`] call while
/// accumulating a frame.
const READ_CHUNK: usize = 256;

/// Frame-level errors the driver surfaces, layering [`mnet_proto::ProtocolError`]
/// over the raw [`ChannelError`].
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The underlying channel failed or timed out.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Bytes were received but did not form a valid frame.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// No complete frame arrived before `deadline`, and no more bytes can be
    /// requested without exceeding the accumulation guard.
    #[error("no complete frame within the accumulation bound")]
    FrameTooLong,
}

/// Owns a [`ByteChannel`] and turns it into a frame-level pipe.
pub struct ChannelDriver<C> {
    channel: C,
}

impl<C: ByteChannel> ChannelDriver<C> {
    /// Wrap a channel.
    pub const fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Borrow the underlying channel (for transport-specific configuration).
    pub const fn channel(&self) -> &C {
        &self.channel
    }

    /// Build and write a frame.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Protocol`] if the payload is too large, or
    /// [`DriverError::Channel`] on a transport failure.
    pub fn send_frame(&mut self, dst: u8, src: u8, packet_type: u16, payload: &[u8]) -> std::result::Result<(), DriverError> {
        let bytes = frame::build(dst, src, packet_type, payload)?;
        self.channel.write(&bytes)?;
        Ok(())
    }

    /// Read bytes until a complete, CRC-verified frame is found or
    /// `deadline` elapses (§4.2's `read_one`: "discards any leading garbage
    /// up to the first SOH").
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Channel`] (including `Timeout`) if the
    /// deadline elapses, [`DriverError::Protocol`] if a complete frame fails
    /// CRC/framing validation, or [`DriverError::FrameTooLong`] if no frame
    /// delimiter appears within [`MAX_ACCUMULATED_BYTES`].
    pub fn receive_frame(&mut self, deadline: Instant) -> std::result::Result<ParsedFrame, DriverError> {
        let mut buf = Vec::new();
        loop {
            if let Some((start, end)) = frame::find_frame(&buf) {
                let parsed = frame::parse(&buf[start..end])?;
                return Ok(parsed);
            }
            if buf.len() >= MAX_ACCUMULATED_BYTES {
                return Err(DriverError::FrameTooLong);
            }
            let chunk = self.channel.read(READ_CHUNK, deadline)?;
            if chunk.is_empty() {
                return Err(DriverError::Channel(ChannelError::Timeout { requested: READ_CHUNK }));
            }
            buf.extend_from_slice(&chunk);
        }
    }

    /// Discard buffered input (§4.4, §5: recovery point between retries).
    pub fn clear(&mut self) {
        self.channel.clear_input();
    }

    /// Unwrap the driver, returning ownership of the channel.
    pub fn into_channel(self) -> C {
        self.channel
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use mnet_proto::frame::build;

    use super::*;
    use crate::test_util::MockChannel;

    #[test]
    fn send_frame_writes_wire_bytes() {
        let mut driver = ChannelDriver::new(MockChannel::new());
        driver.send_frame(0x01, 0xFB, 0x0C28, b"hi").unwrap();
        let written = driver.into_channel().written_bytes();
        assert_eq!(written, build(0x01, 0xFB, 0x0C28, b"hi").unwrap());
    }

    #[test]
    fn receive_frame_assembles_across_chunked_reads() {
        let frame_bytes = build(0xFB, 0x01, 0x0C29, b"ok").unwrap();
        let mut channel = MockChannel::new();
        channel.queue_chunked_input(&frame_bytes, 3);
        let mut driver = ChannelDriver::new(channel);

        let parsed = driver.receive_frame(Instant::now() + Duration::from_secs(1)).unwrap();
        assert_eq!(parsed.payload, b"ok");
    }

    #[test]
    fn receive_frame_skips_leading_garbage() {
        let frame_bytes = build(0xFB, 0x01, 0x0C29, b"ok").unwrap();
        let mut noisy = vec![0u8; 40];
        noisy.extend_from_slice(&frame_bytes);
        let mut channel = MockChannel::new();
        channel.queue_input(&noisy);
        let mut driver = ChannelDriver::new(channel);

        let parsed = driver.receive_frame(Instant::now() + Duration::from_secs(1)).unwrap();
        assert_eq!(parsed.payload, b"ok");
    }

    #[test]
    fn receive_frame_times_out_with_no_data() {
        let mut driver = ChannelDriver::new(MockChannel::new());
        let result = driver.receive_frame(Instant::now());
        assert!(matches!(result, Err(DriverError::Channel(ChannelError::Timeout { .. }))));
    }
}
