//! Alarm record model (C8, §3, §4.8).

use crate::{
    errors::{ProtocolError, Result},
    timestamp::Timestamp,
};

/// One alarm definition and its occurrence state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmRecord {
    /// Alarm sub-identifier, used as the cache key for descriptions.
    pub sub_id: u16,
    /// Last time this alarm fired, or [`Timestamp::NEVER`] if it hasn't.
    pub last_occurred: Timestamp,
    /// Human-readable description, cached after the first fetch.
    pub description: String,
    /// `false` when `last_occurred` is the sentinel (§4.8).
    pub has_occurred: bool,
}

impl AlarmRecord {
    /// Build a record from a decoded `last_occurred` timestamp and a
    /// previously cached (or freshly fetched) description.
    #[must_use]
    pub fn new(sub_id: u16, last_occurred: Timestamp, description: String) -> Self {
        let has_occurred = !last_occurred.is_never();
        Self { sub_id, last_occurred, description, has_occurred }
    }

    /// Decode the first-fetch reply payload, which carries both the
    /// description and the occurrence timestamp: `sub_id:u16 ||
    /// timestamp:u32 || description:ASCII`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedReply`] if `raw` is shorter than
    /// the fixed 6-byte header.
    pub fn decode_full(raw: &[u8]) -> Result<Self> {
        if raw.len() < 6 {
            return Err(ProtocolError::MalformedReply {
                reason: format!("alarm record shorter than 6-byte header: {} bytes", raw.len()),
            });
        }
        let sub_id = u16::from_be_bytes([raw[0], raw[1]]);
        let last_occurred = Timestamp::from_wire_bytes([raw[2], raw[3], raw[4], raw[5]]);
        let desc_end = raw[6..].iter().rposition(|&b| b != 0 && b != b' ').map_or(0, |i| i + 1);
        let description = String::from_utf8_lossy(&raw[6..6 + desc_end]).into_owned();
        Ok(Self::new(sub_id, last_occurred, description))
    }

    /// Decode a follow-up poll reply, which carries only `sub_id` and
    /// `last_occurred`; the description is supplied from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedReply`] if `raw.len() != 6`.
    pub fn decode_occurrence(raw: &[u8], cached_description: String) -> Result<Self> {
        if raw.len() != 6 {
            return Err(ProtocolError::MalformedReply {
                reason: format!("alarm occurrence reply: expected 6 bytes, got {}", raw.len()),
            });
        }
        let sub_id = u16::from_be_bytes([raw[0], raw[1]]);
        let last_occurred = Timestamp::from_wire_bytes([raw[2], raw[3], raw[4], raw[5]]);
        Ok(Self::new(sub_id, last_occurred, cached_description))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn never_occurred_sentinel_clears_has_occurred() {
        let mut raw = vec![0x00, 0x11];
        raw.extend_from_slice(&Timestamp::NEVER.epoch_seconds().to_be_bytes());
        raw.extend_from_slice(b"OVERTEMP");

        let alarm = AlarmRecord::decode_full(&raw).unwrap();
        assert!(!alarm.has_occurred);
        assert_eq!(alarm.description, "OVERTEMP");
    }

    #[test]
    fn occurred_alarm_sets_flag() {
        let mut raw = vec![0x00, 0x12];
        raw.extend_from_slice(&1_453_054_813u32.to_be_bytes());
        raw.extend_from_slice(b"GRID FAULT");

        let alarm = AlarmRecord::decode_full(&raw).unwrap();
        assert!(alarm.has_occurred);
    }

    #[test]
    fn occurrence_poll_reuses_cached_description() {
        let mut raw = vec![0x00, 0x12];
        raw.extend_from_slice(&1_453_054_813u32.to_be_bytes());

        let alarm = AlarmRecord::decode_occurrence(&raw, "GRID FAULT".to_string()).unwrap();
        assert_eq!(alarm.description, "GRID FAULT");
        assert!(alarm.has_occurred);
    }

    #[test]
    fn occurrence_poll_rejects_wrong_length() {
        assert!(matches!(
            AlarmRecord::decode_occurrence(&[0; 5], String::new()),
            Err(ProtocolError::MalformedReply { .. })
        ));
    }
}
