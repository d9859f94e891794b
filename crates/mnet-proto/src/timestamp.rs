//! Protocol timestamp encoding (§6.6): `u32` big-endian seconds since the
//! M-net epoch, 1980-01-01 00:00:00 UTC.

use std::time::{Duration, SystemTime};

/// Seconds between the Unix epoch (1970-01-01) and the M-net epoch
/// (1980-01-01), i.e. 10 non-leap years including two leap days (1972,
/// 1976).
const UNIX_TO_MNET_EPOCH_OFFSET_SECS: u64 = 315_532_800;

/// A point in time expressed as whole seconds since the M-net epoch.
///
/// Range is `0..=u32::MAX`, reaching into 2116. There is no signed/negative
/// representation: times before 1980-01-01 UTC cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u32);

impl Timestamp {
    /// Sentinel value meaning "never occurred", used by alarm records
    /// (§3, §4.8): 2032-05-09 00:00:00 UTC, expressed as M-net epoch seconds.
    pub const NEVER: Self = Self(1_652_140_800);

    /// Wrap a raw on-wire seconds-since-epoch value.
    #[must_use]
    pub const fn from_epoch_seconds(seconds: u32) -> Self {
        Self(seconds)
    }

    /// The raw on-wire seconds-since-epoch value.
    #[must_use]
    pub const fn epoch_seconds(self) -> u32 {
        self.0
    }

    /// `true` if this timestamp is the alarm "never occurred" sentinel.
    #[must_use]
    pub const fn is_never(self) -> bool {
        self.0 == Self::NEVER.0
    }

    /// Decode a big-endian 4-byte wire value.
    #[must_use]
    pub fn from_wire_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    /// Encode to the big-endian 4-byte wire representation.
    #[must_use]
    pub fn to_wire_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Convert a [`SystemTime`] into a controller [`Timestamp`], saturating
    /// at the representable range (clamped to `0..=u32::MAX` seconds past
    /// the M-net epoch).
    ///
    /// # Panics
    ///
    /// Never panics; times before the Unix epoch or before the M-net epoch
    /// saturate to zero rather than underflowing.
    #[must_use]
    pub fn from_system_time(time: SystemTime) -> Self {
        let unix_secs = time
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let mnet_secs = unix_secs.saturating_sub(UNIX_TO_MNET_EPOCH_OFFSET_SECS);
        Self(u32::try_from(mnet_secs).unwrap_or(u32::MAX))
    }

    /// Convert back to a [`SystemTime`].
    #[must_use]
    pub fn to_system_time(self) -> SystemTime {
        SystemTime::UNIX_EPOCH
            + Duration::from_secs(UNIX_TO_MNET_EPOCH_OFFSET_SECS + u64::from(self.0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn s4_controller_time_matches_capture() {
        // S4: controller time value 0x569BDB5D for the captured sample.
        let ts = Timestamp::from_wire_bytes([0x56, 0x9B, 0xDB, 0x5D]);
        assert_eq!(ts.epoch_seconds(), 1_453_054_813);
    }

    #[test]
    fn never_sentinel_is_not_ordinary_zero() {
        assert!(Timestamp::NEVER.is_never());
        assert!(!Timestamp::from_epoch_seconds(0).is_never());
    }

    #[test]
    fn wire_round_trip_exact() {
        let ts = Timestamp::from_epoch_seconds(1_453_054_813);
        assert_eq!(Timestamp::from_wire_bytes(ts.to_wire_bytes()), ts);
    }

    proptest! {
        #[test]
        fn round_trip(seconds in any::<u32>()) {
            let ts = Timestamp::from_epoch_seconds(seconds);
            prop_assert_eq!(Timestamp::from_wire_bytes(ts.to_wire_bytes()), ts);
        }

        #[test]
        fn system_time_round_trip_within_range(seconds in 0u32..=u32::MAX - 1) {
            let ts = Timestamp::from_epoch_seconds(seconds);
            let back = Timestamp::from_system_time(ts.to_system_time());
            prop_assert_eq!(back, ts);
        }
    }
}
