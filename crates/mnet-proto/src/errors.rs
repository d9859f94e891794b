//! Wire-level error types shared by the frame codec and data-point codec.
//!
//! These are the failures that can be determined from the bytes alone, before
//! any session or transport context exists. Higher layers (`mnet-client`)
//! wrap these into their own error taxonomy.

use thiserror::Error;

/// Result alias for wire-level codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while building or parsing a frame, or decoding a data point.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Payload exceeds the single-byte `LEN` field (255 bytes).
    #[error("payload too large: {size} bytes exceeds maximum of {max}")]
    FrameTooLarge {
        /// Requested payload size.
        size: usize,
        /// Maximum allowed payload size.
        max: usize,
    },

    /// Input bytes did not contain a complete `SOH ... EOT` frame.
    #[error("bad framing: {reason}")]
    BadFraming {
        /// Human-readable description of what went wrong.
        reason: String,
    },

    /// `LEN` field did not match the de-escaped payload length.
    #[error("bad length: header claims {claimed}, actual de-escaped length is {actual}")]
    BadLength {
        /// Length claimed by the `LEN` field.
        claimed: usize,
        /// Length after de-escaping.
        actual: usize,
    },

    /// CRC-16/XMODEM mismatch.
    #[error("bad crc: expected {expected:#06x}, computed {computed:#06x}")]
    BadCrc {
        /// CRC carried on the wire.
        expected: u16,
        /// CRC computed locally over the de-escaped header and payload.
        computed: u16,
    },

    /// Input bytes ended before a complete frame could be read.
    #[error("truncated frame: have {actual} bytes, need at least {expected}")]
    Truncated {
        /// Bytes required to complete the frame.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// Reading a frame did not complete before the caller's deadline.
    #[error("timed out waiting for a complete frame")]
    Timeout,

    /// The data point's reply payload did not match the shape the decoder
    /// expected for the requested `DataId`/`Averaging` combination.
    #[error("malformed data-point reply: {reason}")]
    MalformedReply {
        /// Human-readable description of the mismatch.
        reason: String,
    },

    /// The controller rejected a `DataId`/`Averaging` combination.
    #[error("unsupported averaging for this data point")]
    UnsupportedAveraging,
}
