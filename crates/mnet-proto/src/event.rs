//! Event stack model (C8, §3, §4.8).

use crate::{
    errors::{ProtocolError, Result},
    timestamp::Timestamp,
};

/// Maximum number of events the controller's event stack holds (§3).
pub const EVENT_STACK_BOUND: usize = 100;

/// Maximum events returned per controller request when batch-fetching the
/// event stack (§4.7: "Chunked at <=4 events per controller request").
pub const EVENT_BATCH_CHUNK: usize = 4;

/// One entry in the controller's event stack.
///
/// Index `0` is the most recent event; higher indices are older.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Position in the stack, `0` = most recent.
    pub index: u8,
    /// Event code.
    pub code: u16,
    /// When the event occurred.
    pub timestamp: Timestamp,
    /// Free-text description, already trimmed.
    pub text: String,
}

impl EventRecord {
    /// Decode a single event record from its reply payload:
    /// `code:u16 || timestamp:u32 || text:ASCII`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedReply`] if `raw` is shorter than
    /// the fixed 6-byte header.
    pub fn decode(index: u8, raw: &[u8]) -> Result<Self> {
        if raw.len() < 6 {
            return Err(ProtocolError::MalformedReply {
                reason: format!("event record shorter than 6-byte header: {} bytes", raw.len()),
            });
        }
        let code = u16::from_be_bytes([raw[0], raw[1]]);
        let timestamp = Timestamp::from_wire_bytes([raw[2], raw[3], raw[4], raw[5]]);
        let text_end = raw[6..].iter().rposition(|&b| b != 0 && b != b' ').map_or(0, |i| i + 1);
        let text = String::from_utf8_lossy(&raw[6..6 + text_end]).into_owned();
        Ok(Self { index, code, timestamp, text })
    }
}
