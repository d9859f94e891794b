//! Packet type enumeration (§6.2).
//!
//! Request/reply codes pair by odd/even adjacency within a family: a reply's
//! packet type equals `request_type + 1`. [`PacketType::reply_for`] encodes
//! that pairing so [`crate::frame`] and `mnet-client` can validate it without
//! repeating the arithmetic.

/// A 16-bit M-net packet type, transmitted big-endian in the frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    /// Request data (0x0C28).
    RequestData,
    /// Reply data (0x0C29).
    ReplyData,
    /// Request multiple data (0x0C2A).
    RequestMultipleData,
    /// Reply multiple data (0x0C2B).
    ReplyMultipleData,
    /// Request write data (0x0C2C).
    RequestWriteData,
    /// Reply write data (0x0C2D).
    ReplyWriteData,
    /// Request serial no. / display (0x0C2E).
    RequestSerialNumber,
    /// Reply serial no. / display (0x0C2F).
    ReplySerialNumber,
    /// Remote login (0x138E).
    RemoteLogin,
    /// Remote logout (0x138F).
    RemoteLogout,
    /// Not logged in (0x1390).
    NotLoggedIn,
    /// Acknowledge alarm (0x0BEA).
    AcknowledgeAlarm,
    /// Request alarm code (0x0BEB).
    RequestAlarmCode,
    /// Reply alarm code (0x0BEC).
    ReplyAlarmCode,
    /// Alarm data request/reply family (0x0BFB..0x0C02).
    ///
    /// Carries the raw type so the 1:4 .. 4:4 sub-family can be distinguished;
    /// see [`PacketType::ALARM_DATA_BASE`].
    AlarmData(u16),
    /// Any other type not covered by the subset this core supports.
    ///
    /// Reply-type pairing and CRC/framing still apply; callers that need to
    /// interpret the payload must recognize the type themselves.
    Other(u16),
}

impl PacketType {
    /// First type code in the alarm data request/reply family (3067).
    pub const ALARM_DATA_BASE: u16 = 0x0BFB;
    /// Last type code in the alarm data request/reply family (3074).
    pub const ALARM_DATA_LAST: u16 = 0x0C02;

    /// Decode a raw big-endian type code into a [`PacketType`].
    #[must_use]
    pub fn from_u16(raw: u16) -> Self {
        match raw {
            0x0C28 => Self::RequestData,
            0x0C29 => Self::ReplyData,
            0x0C2A => Self::RequestMultipleData,
            0x0C2B => Self::ReplyMultipleData,
            0x0C2C => Self::RequestWriteData,
            0x0C2D => Self::ReplyWriteData,
            0x0C2E => Self::RequestSerialNumber,
            0x0C2F => Self::ReplySerialNumber,
            0x138E => Self::RemoteLogin,
            0x138F => Self::RemoteLogout,
            0x1390 => Self::NotLoggedIn,
            0x0BEA => Self::AcknowledgeAlarm,
            0x0BEB => Self::RequestAlarmCode,
            0x0BEC => Self::ReplyAlarmCode,
            Self::ALARM_DATA_BASE..=Self::ALARM_DATA_LAST => Self::AlarmData(raw),
            other => Self::Other(other),
        }
    }

    /// Encode this packet type as its raw big-endian type code.
    #[must_use]
    pub fn to_u16(self) -> u16 {
        match self {
            Self::RequestData => 0x0C28,
            Self::ReplyData => 0x0C29,
            Self::RequestMultipleData => 0x0C2A,
            Self::ReplyMultipleData => 0x0C2B,
            Self::RequestWriteData => 0x0C2C,
            Self::ReplyWriteData => 0x0C2D,
            Self::RequestSerialNumber => 0x0C2E,
            Self::ReplySerialNumber => 0x0C2F,
            Self::RemoteLogin => 0x138E,
            Self::RemoteLogout => 0x138F,
            Self::NotLoggedIn => 0x1390,
            Self::AcknowledgeAlarm => 0x0BEA,
            Self::RequestAlarmCode => 0x0BEB,
            Self::ReplyAlarmCode => 0x0BEC,
            Self::AlarmData(raw) | Self::Other(raw) => raw,
        }
    }

    /// The paired reply type for a request type, per the odd/even adjacency
    /// rule in §3 ("A reply's packet type must equal `request_type + 1`").
    ///
    /// Returns `None` for types that are already replies or that have no
    /// defined pairing (e.g. `RemoteLogout`, `NotLoggedIn`).
    #[must_use]
    pub fn reply_for(self) -> Option<Self> {
        match self {
            Self::RequestData
            | Self::RequestMultipleData
            | Self::RequestWriteData
            | Self::RequestSerialNumber
            | Self::RequestAlarmCode => Some(Self::from_u16(self.to_u16() + 1)),
            Self::AlarmData(raw) if raw % 2 != 0 && raw < Self::ALARM_DATA_LAST => {
                Some(Self::from_u16(raw + 1))
            },
            Self::Other(raw) => Some(Self::from_u16(raw + 1)),
            _ => None,
        }
    }
}
