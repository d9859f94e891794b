//! Error taxonomy surfaced by [`crate::Client`] (§7).

use mnet_core::{ChannelError, DriverError};
use mnet_proto::ProtocolError;
use thiserror::Error;

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors a [`crate::Client`] operation can return.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The underlying channel read/write failed. Not retried at this layer;
    /// the caller must reconstruct the channel (§7).
    #[error("transport error: {0}")]
    Transport(#[from] ChannelError),

    /// The deadline elapsed awaiting a reply, after exhausting the retry
    /// budget.
    #[error("timed out waiting for a reply after retries")]
    Timeout,

    /// A reply frame was not properly delimited or was truncated.
    #[error("bad framing: {0}")]
    BadFraming(String),

    /// A reply frame's CRC did not match, after exhausting the retry
    /// budget.
    #[error("crc mismatch on reply, after retries")]
    BadCrc,

    /// A reply frame's `LEN` field disagreed with its payload, after
    /// exhausting the retry budget.
    #[error("length mismatch on reply, after retries")]
    BadLength,

    /// The reply's packet type was not the expected request/reply pairing.
    #[error("wrong reply type: expected {expected:#06x}, got {actual:#06x}")]
    WrongReplyType {
        /// Packet type the client expected, per [`mnet_proto::PacketType::reply_for`].
        expected: u16,
        /// Packet type the controller actually sent.
        actual: u16,
    },

    /// The operation requires a prior successful [`crate::Client::login`].
    #[error("operation requires authentication")]
    UnauthenticatedOp,

    /// The controller rejected the login attempt.
    #[error("login rejected by controller")]
    AuthFailed,

    /// The requested `DataID`/averaging combination is not supported.
    #[error("unsupported averaging for this data point")]
    UnsupportedAveraging,

    /// A server-side error payload not covered by a more specific variant.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The operation's deadline elapsed or it was explicitly cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The client is in [`crate::SessionState::Broken`] and must be
    /// [`crate::Client::reset`] before any operation can proceed.
    #[error("client is broken; call reset() to recover")]
    NotReady,
}

impl ClientError {
    /// `true` for failures the internal retry loop handles by retrying
    /// (§7's propagation policy): `BadCrc`, the driver's own `Timeout`,
    /// `WrongReplyType`, `BadFraming`, `BadLength`.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::BadCrc | Self::Timeout | Self::WrongReplyType { .. } | Self::BadFraming(_) | Self::BadLength
        )
    }
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::UnsupportedAveraging => Self::UnsupportedAveraging,
            ProtocolError::BadCrc { .. } => Self::BadCrc,
            ProtocolError::BadLength { .. } => Self::BadLength,
            ProtocolError::BadFraming { reason } => Self::BadFraming(reason),
            ProtocolError::Timeout => Self::Timeout,
            other => Self::Protocol(other.to_string()),
        }
    }
}

impl From<DriverError> for ClientError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Channel(ChannelError::Timeout { .. }) => Self::Timeout,
            DriverError::Channel(channel_err) => Self::Transport(channel_err),
            DriverError::Protocol(ProtocolError::BadCrc { .. }) => Self::BadCrc,
            DriverError::Protocol(ProtocolError::BadLength { .. }) => Self::BadLength,
            DriverError::Protocol(ProtocolError::BadFraming { reason }) => Self::BadFraming(reason),
            DriverError::Protocol(other) => Self::Protocol(other.to_string()),
            DriverError::FrameTooLong => Self::BadFraming("no frame delimiter found".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_variants_match_propagation_policy() {
        assert!(ClientError::Timeout.is_retryable());
        assert!(ClientError::BadCrc.is_retryable());
        assert!(ClientError::BadLength.is_retryable());
        assert!(ClientError::BadFraming(String::new()).is_retryable());
        assert!(ClientError::WrongReplyType { expected: 1, actual: 2 }.is_retryable());
    }

    #[test]
    fn terminal_variants_are_not_retryable() {
        assert!(!ClientError::AuthFailed.is_retryable());
        assert!(!ClientError::UnauthenticatedOp.is_retryable());
        assert!(!ClientError::NotReady.is_retryable());
        assert!(!ClientError::Protocol("x".to_string()).is_retryable());
    }

    #[test]
    fn driver_timeout_maps_to_client_timeout() {
        let err: ClientError = DriverError::Channel(ChannelError::Timeout { requested: 4 }).into();
        assert!(matches!(err, ClientError::Timeout));
    }
}
