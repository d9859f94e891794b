//! Data-point request/reply codec (C5, §4.5).
//!
//! Encoding builds the payload bytes that go inside a frame's `PAYLOAD`
//! field (the frame itself, with its own CRC and escaping, is [`crate::frame`]'s
//! job). Decoding dispatches on the data point's descriptor to interpret a
//! reply payload as a typed [`Value`].

use crate::{
    datapoint::{DataId, DataKind, DataPointDescriptor, Scaling, swap_u32_to_wire},
    errors::{ProtocolError, Result},
    timestamp::Timestamp,
    value::Value,
};

/// Maximum number of items in a single multi-data request (§6.3, §6.4).
pub const MAX_BATCH: usize = 17;

/// Build the payload for a single data request (0x0C28): the 4-byte
/// byte-swapped `DataID`.
#[must_use]
pub fn encode_request_data(id: DataId) -> Vec<u8> {
    id.to_wire_bytes().to_vec()
}

/// Build the payload for a multi-data request (0x0C2A): `count:u8 ||
/// (4-byte DataID) x count`.
///
/// # Errors
///
/// Returns [`ProtocolError::FrameTooLarge`] if `ids.len() > `[`MAX_BATCH`].
pub fn encode_request_multiple_data(ids: &[DataId]) -> Result<Vec<u8>> {
    if ids.len() > MAX_BATCH {
        return Err(ProtocolError::FrameTooLarge { size: ids.len(), max: MAX_BATCH });
    }
    #[allow(clippy::cast_possible_truncation)] // bounded by MAX_BATCH above
    let mut payload = vec![ids.len() as u8];
    for id in ids {
        payload.extend_from_slice(&id.to_wire_bytes());
    }
    Ok(payload)
}

/// Build the payload for a write-data request (0x0C2C): `(id[4] || value[4]
/// byte-swapped) x count`, no leading count byte (§6.3).
///
/// # Errors
///
/// Returns [`ProtocolError::FrameTooLarge`] if `items.len() > `[`MAX_BATCH`].
pub fn encode_request_write_data(items: &[(DataId, u32)]) -> Result<Vec<u8>> {
    if items.len() > MAX_BATCH {
        return Err(ProtocolError::FrameTooLarge { size: items.len(), max: MAX_BATCH });
    }
    let mut payload = Vec::with_capacity(items.len() * 8);
    for &(id, value) in items {
        payload.extend_from_slice(&id.to_wire_bytes());
        payload.extend_from_slice(&swap_u32_to_wire(value));
    }
    Ok(payload)
}

/// Decode a 4-byte reply payload as a raw big-endian signed integer, scaled
/// per `descriptor`.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedReply`] if `raw.len() != 4`.
pub fn decode_numeric_reply(descriptor: &DataPointDescriptor, raw: &[u8]) -> Result<Value> {
    let bytes: [u8; 4] = raw.try_into().map_err(|_| ProtocolError::MalformedReply {
        reason: format!("{}: expected 4-byte numeric reply, got {} bytes", descriptor.name, raw.len()),
    })?;
    let raw_value = i32::from_be_bytes(bytes);
    Ok(match descriptor.scaling {
        Scaling::None => Value::Int32(raw_value),
        other => Value::Float64(other.apply(raw_value)),
    })
}

/// Decode a 4-byte reply payload as a controller [`Timestamp`].
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedReply`] if `raw.len() != 4`.
pub fn decode_timestamp_reply(raw: &[u8]) -> Result<Value> {
    let bytes: [u8; 4] = raw.try_into().map_err(|_| ProtocolError::MalformedReply {
        reason: format!("expected 4-byte timestamp reply, got {} bytes", raw.len()),
    })?;
    Ok(Value::Timestamp(Timestamp::from_wire_bytes(bytes)))
}

/// Decode a 4-byte reply payload as two packed `u16` status codes.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedReply`] if `raw.len() != 4`.
pub fn decode_status_codes_reply(raw: &[u8]) -> Result<Value> {
    let bytes: [u8; 4] = raw.try_into().map_err(|_| ProtocolError::MalformedReply {
        reason: format!("expected 4-byte status-code reply, got {} bytes", raw.len()),
    })?;
    let a = u16::from_be_bytes([bytes[0], bytes[1]]);
    let b = u16::from_be_bytes([bytes[2], bytes[3]]);
    Ok(Value::StatusCodes([a, b]))
}

/// Decode a 4-byte reply payload per `descriptor.kind`, dispatching between
/// the numeric and status-code interpretations (§3, §4.5).
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedReply`] if `raw.len() != 4`.
pub fn decode_value(descriptor: &DataPointDescriptor, raw: &[u8]) -> Result<Value> {
    match descriptor.kind {
        DataKind::Numeric => decode_numeric_reply(descriptor, raw),
        DataKind::StatusCodes => decode_status_codes_reply(raw),
    }
}

/// Decode an ASCII text reply, stripping trailing NUL/space padding.
#[must_use]
pub fn decode_text_reply(raw: &[u8]) -> Value {
    let trimmed_len = raw.iter().rposition(|&b| b != 0 && b != b' ').map_or(0, |i| i + 1);
    Value::Text(String::from_utf8_lossy(&raw[..trimmed_len]).into_owned())
}

/// Decode a multi-data reply into one [`Value`] per descriptor, assuming
/// each item occupies a fixed 4-byte big-endian numeric slot in request
/// order (§3: "batch order is preserved").
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedReply`] if `raw.len()` does not equal
/// `descriptors.len() * 4`.
pub fn decode_multiple_data_reply(
    descriptors: &[DataPointDescriptor],
    raw: &[u8],
) -> Result<Vec<Value>> {
    let expected = descriptors.len() * 4;
    if raw.len() != expected {
        return Err(ProtocolError::MalformedReply {
            reason: format!(
                "multi-data reply: expected {expected} bytes for {} items, got {}",
                descriptors.len(),
                raw.len()
            ),
        });
    }
    descriptors
        .iter()
        .zip(raw.chunks_exact(4))
        .map(|(descriptor, chunk)| decode_value(descriptor, chunk))
        .collect()
}
