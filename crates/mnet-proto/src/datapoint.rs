//! Data point identity, averaging, and scaling (part of C5, §4.5).
//!
//! # DataID wire encoding
//!
//! A `DataID` is a logical 32-bit value. On the wire its bytes are permuted
//! per the capture in §6.3's S4 vector: logical `0x0001_53C3` is transmitted
//! as `C3 53 00 01`. Splitting the logical value into two 16-bit halves
//! `hi = 0x0001`, `lo = 0x53C3`, the wire bytes are `lo` little-endian
//! followed by `hi` big-endian — equivalently `[b3, b2, b0, b1]` of the
//! logical big-endian byte array. [`DataId::to_wire_bytes`] implements this
//! exactly and [`DataId::from_wire_bytes`] is its inverse.
//!
//! # Averaging embedding
//!
//! §6.3 describes the single-request payload as "byte-swapped DataID +
//! averaging embedded per convention" within the same 4 bytes — there is no
//! separate averaging field on the wire for a single request. This core
//! resolves that by packing the averaging selector into the low byte of the
//! logical `DataID`, so a read request's logical value is
//! `(base_id << 8) | averaging_code`. See `DESIGN.md` for the resolution
//! record; data points that only ever carry one averaging (or none, like the
//! time DataID used for writes) pass `Averaging::Current`/leave the base id
//! untouched, matching the literal S4 write vector where the full 4-byte
//! value is the id itself.

use crate::errors::{ProtocolError, Result};

/// A 4-byte controller data-point identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataId(u32);

impl DataId {
    /// Data-point identifier for the controller's time-of-day value, used by
    /// `get_controller_time`/`set_controller_time` (§6.3).
    pub const CONTROLLER_TIME: Self = Self(0x0001_53C3);

    /// Construct a `DataId` from its logical 32-bit value.
    #[must_use]
    pub const fn from_logical(value: u32) -> Self {
        Self(value)
    }

    /// The logical 32-bit value.
    #[must_use]
    pub const fn logical(self) -> u32 {
        self.0
    }

    /// Pack a base identifier with an averaging selector into the low byte,
    /// per this core's embedding convention.
    #[must_use]
    pub fn with_averaging(base_id: u32, averaging: Averaging) -> Self {
        Self((base_id & 0xFFFF_FF00) | u32::from(averaging.to_code()))
    }

    /// The averaging code embedded in the low byte.
    #[must_use]
    pub fn averaging(self) -> Averaging {
        Averaging::from_code((self.0 & 0xFF) as u8)
    }

    /// Encode to the 4-byte on-wire representation (§6.3).
    #[must_use]
    pub fn to_wire_bytes(self) -> [u8; 4] {
        swap_u32_to_wire(self.0)
    }

    /// Decode from the 4-byte on-wire representation.
    #[must_use]
    pub fn from_wire_bytes(w: [u8; 4]) -> Self {
        Self(swap_u32_from_wire(w))
    }
}

/// The byte permutation §6.3 uses for both `DataID`s and write values:
/// split the logical big-endian bytes `[b0,b1,b2,b3]` into a high half
/// `[b0,b1]` and low half `[b2,b3]`, then transmit `[b3,b2,b0,b1]`.
#[must_use]
pub fn swap_u32_to_wire(value: u32) -> [u8; 4] {
    let b = value.to_be_bytes();
    [b[3], b[2], b[0], b[1]]
}

/// Inverse of [`swap_u32_to_wire`].
#[must_use]
pub fn swap_u32_from_wire(w: [u8; 4]) -> u32 {
    u32::from_be_bytes([w[2], w[3], w[1], w[0]])
}

/// Averaging window selector (§4.5), co-sent with a `DataID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Averaging {
    /// Instantaneous value, no averaging window.
    Current,
    /// 20 millisecond window.
    Ms20,
    /// 100 millisecond window.
    Ms100,
    /// 1 second window.
    Sec1,
    /// 30 second window.
    Sec30,
    /// 1 minute window.
    Min1,
    /// 10 minute window.
    Min10,
    /// 30 minute window.
    Min30,
    /// 1 hour window.
    Hour1,
    /// 24 hour window.
    Hour24,
    /// A code the controller reported back that this core does not
    /// recognize; preserved rather than dropped so round-tripping a reply
    /// doesn't lose information.
    Unknown(u8),
}

impl Averaging {
    /// Decode a one-byte averaging selector.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Current,
            1 => Self::Ms20,
            2 => Self::Ms100,
            3 => Self::Sec1,
            4 => Self::Sec30,
            5 => Self::Min1,
            6 => Self::Min10,
            7 => Self::Min30,
            8 => Self::Hour1,
            9 => Self::Hour24,
            other => Self::Unknown(other),
        }
    }

    /// Encode to the one-byte wire selector.
    #[must_use]
    pub const fn to_code(self) -> u8 {
        match self {
            Self::Current => 0,
            Self::Ms20 => 1,
            Self::Ms100 => 2,
            Self::Sec1 => 3,
            Self::Sec30 => 4,
            Self::Min1 => 5,
            Self::Min10 => 6,
            Self::Min30 => 7,
            Self::Hour1 => 8,
            Self::Hour24 => 9,
            Self::Unknown(code) => code,
        }
    }
}

/// Numeric scaling applied to a decoded raw 32-bit signed integer (§4.5).
///
/// Two opcodes ("1/4/5" in the legacy client documentation) disagree between
/// the decompiled client spec and the on-wire behavior this core was
/// verified against; per §9 the on-wire behavior is authoritative and is
/// what [`Scaling::apply`] implements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scaling {
    /// No scaling; the raw integer is the value.
    None,
    /// Divide by `10^n`.
    Div10Pow(u32),
    /// Multiply by `10^n`.
    Mul10Pow(u32),
    /// Divide by a literal factor.
    DivN(f64),
    /// Multiply by a literal factor.
    MulN(f64),
    /// Power (watts) conversion used by the `GridPower` data point: the raw
    /// value is tenths of a kilowatt, reported in watts.
    PowerW,
}

impl Scaling {
    /// Apply this scaling to a raw decoded integer, producing the scaled
    /// floating-point reading.
    #[must_use]
    pub fn apply(self, raw: i32) -> f64 {
        let raw = f64::from(raw);
        match self {
            Self::None => raw,
            Self::Div10Pow(n) => raw / 10f64.powi(i32::try_from(n).unwrap_or(i32::MAX)),
            Self::Mul10Pow(n) => raw * 10f64.powi(i32::try_from(n).unwrap_or(i32::MAX)),
            Self::DivN(factor) => raw / factor,
            Self::MulN(factor) => raw * factor,
            Self::PowerW => raw * 100.0,
        }
    }
}

/// How a data point's reply payload should be interpreted, independent of
/// the numeric scaling applied to it (§3: "A value is a tagged union").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// A 4-byte big-endian signed integer, scaled per [`Scaling`].
    Numeric,
    /// Two packed `u16` status-code words (current status codes, §4.5).
    StatusCodes,
}

/// Static descriptor for a supported data point: its base identifier, the
/// scaling its raw reply value requires, and how to interpret the reply
/// bytes. Averaging is supplied per-request, not fixed per descriptor,
/// except where the controller defines only one legal averaging for a point
/// (enforced by callers, not this table).
#[derive(Debug, Clone, Copy)]
pub struct DataPointDescriptor {
    /// Human-readable name, used only for diagnostics.
    pub name: &'static str,
    /// Base identifier, before averaging is packed into the low byte.
    pub base_id: u32,
    /// Scaling applied to the raw decoded integer (ignored for non-numeric
    /// kinds).
    pub scaling: Scaling,
    /// How to interpret the reply payload.
    pub kind: DataKind,
}

/// Wind speed, meters/second (raw tenths).
pub const WIND_SPEED: DataPointDescriptor = DataPointDescriptor {
    name: "WindSpeed",
    base_id: 0x0001_0A00,
    scaling: Scaling::Div10Pow(1),
    kind: DataKind::Numeric,
};
/// Rotor RPM (raw tenths).
pub const ROTOR_RPM: DataPointDescriptor = DataPointDescriptor {
    name: "RotorRpm",
    base_id: 0x0001_0B00,
    scaling: Scaling::Div10Pow(1),
    kind: DataKind::Numeric,
};
/// Generator RPM (raw, unscaled).
pub const GENERATOR_RPM: DataPointDescriptor = DataPointDescriptor {
    name: "GeneratorRpm",
    base_id: 0x0001_0C00,
    scaling: Scaling::None,
    kind: DataKind::Numeric,
};
/// Grid power, watts (raw tenths of a kilowatt).
pub const GRID_POWER: DataPointDescriptor = DataPointDescriptor {
    name: "GridPower",
    base_id: 0x0001_0D00,
    scaling: Scaling::PowerW,
    kind: DataKind::Numeric,
};
/// 3-phase grid voltage, volts (raw tenths). Requested under `Current` or
/// `Min1` averaging (§4.5: "3-phase voltage (current + 1-min averages)").
pub const GRID_VOLTAGE: DataPointDescriptor = DataPointDescriptor {
    name: "GridVoltage",
    base_id: 0x0001_0E00,
    scaling: Scaling::Div10Pow(1),
    kind: DataKind::Numeric,
};
/// Grid current, amps (raw tenths).
pub const GRID_CURRENT: DataPointDescriptor = DataPointDescriptor {
    name: "GridCurrent",
    base_id: 0x0001_0F00,
    scaling: Scaling::Div10Pow(1),
    kind: DataKind::Numeric,
};
/// Current status codes: two packed `u16` fault/state words (§4.5).
pub const CURRENT_STATUS_CODES: DataPointDescriptor = DataPointDescriptor {
    name: "CurrentStatusCodes",
    base_id: 0x0001_1100,
    scaling: Scaling::None,
    kind: DataKind::StatusCodes,
};
/// Runtime counter, hours (raw, unscaled).
pub const RUNTIME_HOURS: DataPointDescriptor = DataPointDescriptor {
    name: "RuntimeHours",
    base_id: 0x0001_1000,
    scaling: Scaling::None,
    kind: DataKind::Numeric,
};

/// Base identifier for the command write point consumed by
/// `send_command` (§4.7). The command code is not embedded in this ID; it is
/// written as the write-data value against this unchanged `DataId`. There is
/// no averaging to embed since this is a write-only point.
pub const COMMAND_BASE_ID: u32 = 0x0001_2000;

/// Base identifier for an event-stack entry read (§4.8). The low byte
/// carries the stack index (`0` = most recent, per [`crate::event::EventRecord`]).
pub const EVENT_BASE_ID: u32 = 0x0001_3000;

/// Reject an averaging selector the descriptor table doesn't recognize as a
/// decoded `Unknown` echoed back by the controller (§4.5:
/// "invalid combinations cause the controller to reply with an error
/// payload surfaced as `UnsupportedAveraging`").
///
/// # Errors
///
/// Returns [`ProtocolError::UnsupportedAveraging`] for `Averaging::Unknown`.
pub fn validate_averaging(averaging: Averaging) -> Result<()> {
    match averaging {
        Averaging::Unknown(_) => Err(ProtocolError::UnsupportedAveraging),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn controller_time_matches_s4_wire_bytes() {
        assert_eq!(DataId::CONTROLLER_TIME.to_wire_bytes(), [0xC3, 0x53, 0x00, 0x01]);
    }

    #[test]
    fn from_wire_bytes_inverts_s4_vector() {
        let id = DataId::from_wire_bytes([0xC3, 0x53, 0x00, 0x01]);
        assert_eq!(id, DataId::CONTROLLER_TIME);
    }

    #[test]
    fn with_averaging_packs_low_byte() {
        let id = DataId::with_averaging(WIND_SPEED.base_id, Averaging::Min1);
        assert_eq!(id.averaging(), Averaging::Min1);
        assert_eq!(id.logical() & 0xFFFF_FF00, WIND_SPEED.base_id & 0xFFFF_FF00);
    }

    #[test]
    fn averaging_code_round_trip_for_named_variants() {
        for code in 0u8..=9 {
            assert_eq!(Averaging::from_code(code).to_code(), code);
        }
    }

    #[test]
    fn unknown_averaging_is_rejected() {
        assert!(matches!(
            validate_averaging(Averaging::Unknown(200)),
            Err(ProtocolError::UnsupportedAveraging)
        ));
    }

    #[test]
    fn power_w_scaling_of_grid_power() {
        // Raw tenths-of-kilowatt 12_345 -> 1_234_500 W.
        assert!((GRID_POWER.scaling.apply(12_345) - 1_234_500.0).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn data_id_wire_round_trip(value in any::<u32>()) {
            let id = DataId::from_logical(value);
            prop_assert_eq!(DataId::from_wire_bytes(id.to_wire_bytes()), id);
        }

        #[test]
        fn averaging_code_round_trip_any_byte(code in any::<u8>()) {
            prop_assert_eq!(Averaging::from_code(code).to_code(), code);
        }
    }
}
