//! Frame codec (C2): `SOH | DST | SRC | TYPE_HI | TYPE_LO | LEN | PAYLOAD |
//! CRC_HI | CRC_LO | EOT`.
//!
//! This module only deals with already-buffered bytes. Reading bytes off a
//! channel until a complete frame is available is the channel driver's job
//! (C4, in `mnet-client`); this module's [`parse`] is what the driver calls
//! once it thinks it has one.
//!
//! # Escape rule
//!
//! This crate adopts the `0xFF -> 0xFF 0xFF` doubling rule as authoritative,
//! per spec §3's note that some historical documentation disagrees and per
//! the S3 test vector in §8. See `DESIGN.md` for the resolution record.

use crate::{
    crc::crc16,
    errors::{ProtocolError, Result},
};

/// Frame start delimiter.
pub const SOH: u8 = 0x01;
/// Frame end delimiter.
pub const EOT: u8 = 0x04;
/// Byte doubled by the escape rule.
const ESCAPE_BYTE: u8 = 0xFF;
/// Maximum unescaped payload length (`LEN` is a single byte).
pub const MAX_PAYLOAD_LEN: usize = 255;

/// A parsed (de-escaped, CRC-verified) frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFrame {
    /// Destination node address.
    pub dst: u8,
    /// Source node address.
    pub src: u8,
    /// Raw big-endian packet type.
    pub packet_type: u16,
    /// De-escaped payload bytes.
    pub payload: Vec<u8>,
}

/// Escape every `0xFF` in `region` by doubling it, per the wire escape rule.
fn escape(region: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(region.len());
    for &b in region {
        out.push(b);
        if b == ESCAPE_BYTE {
            out.push(ESCAPE_BYTE);
        }
    }
    out
}

/// Reverse the escape rule: collapse every `0xFF 0xFF` pair to a single
/// `0xFF`. Returns `None` if a trailing lone `0xFF` is left dangling (never
/// valid on the wire).
fn unescape(region: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(region.len());
    let mut iter = region.iter().copied();
    while let Some(b) = iter.next() {
        out.push(b);
        if b == ESCAPE_BYTE {
            match iter.next() {
                Some(ESCAPE_BYTE) => {},
                _ => return None,
            }
        }
    }
    Some(out)
}

/// Build the full on-wire frame bytes for `(dst, src, packet_type, payload)`.
///
/// # Errors
///
/// Returns [`ProtocolError::FrameTooLarge`] if `payload.len() >`
/// [`MAX_PAYLOAD_LEN`].
pub fn build(dst: u8, src: u8, packet_type: u16, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::FrameTooLarge { size: payload.len(), max: MAX_PAYLOAD_LEN });
    }

    // Unescaped header+payload region covered by the CRC (§3, §4.1).
    let mut covered = Vec::with_capacity(5 + payload.len());
    covered.push(dst);
    covered.push(src);
    covered.extend_from_slice(&packet_type.to_be_bytes());
    #[allow(clippy::cast_possible_truncation)] // bounded by MAX_PAYLOAD_LEN above
    covered.push(payload.len() as u8);
    covered.extend_from_slice(payload);

    let crc = crc16(&covered);
    let mut on_wire_region = covered;
    on_wire_region.extend_from_slice(&crc.to_be_bytes());

    let mut frame = Vec::with_capacity(on_wire_region.len() * 2 + 2);
    frame.push(SOH);
    frame.extend(escape(&on_wire_region));
    frame.push(EOT);
    Ok(frame)
}

/// Parse a complete `SOH ... EOT` frame previously extracted from the wire.
///
/// # Errors
///
/// - [`ProtocolError::BadFraming`] if `frame_bytes` does not start with
///   [`SOH`] and end with [`EOT`], or contains a dangling escape byte.
/// - [`ProtocolError::Truncated`] if the de-escaped region is shorter than
///   the fixed header.
/// - [`ProtocolError::BadLength`] if `LEN` disagrees with the de-escaped
///   payload length.
/// - [`ProtocolError::BadCrc`] if the trailing CRC does not match.
pub fn parse(frame_bytes: &[u8]) -> Result<ParsedFrame> {
    if frame_bytes.len() < 2 {
        return Err(ProtocolError::BadFraming {
            reason: "frame shorter than the SOH/EOT delimiters".to_string(),
        });
    }
    if frame_bytes[0] != SOH {
        return Err(ProtocolError::BadFraming { reason: "missing leading SOH".to_string() });
    }
    if frame_bytes[frame_bytes.len() - 1] != EOT {
        return Err(ProtocolError::BadFraming { reason: "missing trailing EOT".to_string() });
    }

    let escaped_region = &frame_bytes[1..frame_bytes.len() - 1];
    let region = unescape(escaped_region).ok_or_else(|| ProtocolError::BadFraming {
        reason: "dangling 0xFF escape byte before EOT".to_string(),
    })?;

    // DST SRC TYPE_HI TYPE_LO LEN = 5 fixed bytes, plus 2 CRC bytes.
    const FIXED_OVERHEAD: usize = 5 + 2;
    if region.len() < FIXED_OVERHEAD {
        return Err(ProtocolError::Truncated { expected: FIXED_OVERHEAD, actual: region.len() });
    }

    let dst = region[0];
    let src = region[1];
    let packet_type = u16::from_be_bytes([region[2], region[3]]);
    let len = region[4] as usize;

    let payload_end = FIXED_OVERHEAD - 2 + len;
    if region.len() < payload_end + 2 {
        return Err(ProtocolError::Truncated { expected: payload_end + 2, actual: region.len() });
    }
    if region.len() != payload_end + 2 {
        return Err(ProtocolError::BadLength {
            claimed: len,
            actual: region.len() - FIXED_OVERHEAD,
        });
    }

    let payload = region[5..payload_end].to_vec();
    let crc_bytes = &region[payload_end..payload_end + 2];
    let expected_crc = u16::from_be_bytes([crc_bytes[0], crc_bytes[1]]);
    let computed_crc = crc16(&region[..payload_end]);

    if expected_crc != computed_crc {
        return Err(ProtocolError::BadCrc { expected: expected_crc, computed: computed_crc });
    }

    Ok(ParsedFrame { dst, src, packet_type, payload })
}

/// Scan `buf` for the first complete `SOH ... EOT` frame, tolerating and
/// discarding any leading garbage bytes before the first `SOH` (the receiver
/// must resynchronize on noise left over from a half-received frame).
///
/// Returns the byte range `[start, end)` of the candidate frame (`SOH`
/// inclusive, `EOT` inclusive) within `buf`, or `None` if no complete frame
/// is present yet (caller should keep reading).
///
/// A dangling `0xFF` immediately before the terminator is not treated as an
/// escaped `EOT`; scanning looks for a literal `EOT` byte and lets [`parse`]
/// reject malformed escaping.
#[must_use]
pub fn find_frame(buf: &[u8]) -> Option<(usize, usize)> {
    let start = buf.iter().position(|&b| b == SOH)?;
    let end_rel = buf[start + 1..].iter().position(|&b| b == EOT)?;
    Some((start, start + 1 + end_rel + 1))
}
