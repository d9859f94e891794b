//! Cross-module round-trip properties (§8): frame build/parse, obfuscation,
//! and data-point identity all compose correctly end to end.

#![allow(clippy::unwrap_used)]

use mnet_proto::{
    DataId, Timestamp, Value,
    codec::{decode_numeric_reply, encode_request_data},
    datapoint::{Averaging, GRID_POWER, WIND_SPEED},
    frame::{build, parse},
    obfuscation::{decode as obf_decode, derive_key, encode as obf_encode},
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn obfuscated_request_round_trips_through_a_frame(
        serial in any::<[u8; 4]>(),
        dst in any::<u8>(),
        src in any::<u8>(),
        credential in prop::collection::vec(any::<u8>(), 1..64),
    ) {
        let key = derive_key(serial);
        let obfuscated = obf_encode(&credential, &key);
        let truncated_len = obfuscated.len().min(255);

        let frame_bytes = build(dst, src, 0x138E, &obfuscated[..truncated_len]).unwrap();
        let parsed = parse(&frame_bytes).unwrap();

        let recovered = obf_decode(&parsed.payload, &key);
        prop_assert_eq!(recovered, credential[..truncated_len].to_vec());
    }

    #[test]
    fn data_id_survives_request_build_and_parse(
        base in any::<u32>(),
        averaging_code in 0u8..=9,
    ) {
        let id = DataId::with_averaging(base, Averaging::from_code(averaging_code));
        let payload = encode_request_data(id);

        let frame_bytes = build(0x01, 0xFB, 0x0C28, &payload).unwrap();
        let parsed = parse(&frame_bytes).unwrap();

        let recovered_payload: [u8; 4] = parsed.payload.try_into().unwrap();
        prop_assert_eq!(DataId::from_wire_bytes(recovered_payload), id);
    }

    #[test]
    fn reply_frame_round_trip_preserves_scaled_value(raw in any::<i32>()) {
        let payload = raw.to_be_bytes().to_vec();
        let frame_bytes = build(0xFB, 0x01, 0x0C29, &payload).unwrap();
        let parsed = parse(&frame_bytes).unwrap();

        let value = decode_numeric_reply(&WIND_SPEED, &parsed.payload).unwrap();
        let expected = WIND_SPEED.scaling.apply(raw);
        let Value::Float64(v) = value else {
            panic!("unexpected variant: {value:?}");
        };
        prop_assert!((v - expected).abs() <= expected.abs() * 1e-9 + f64::EPSILON);
    }

    #[test]
    fn timestamp_round_trips_through_a_write_frame(seconds in any::<u32>()) {
        let ts = Timestamp::from_epoch_seconds(seconds);
        let payload = ts.to_wire_bytes().to_vec();
        let frame_bytes = build(0xFB, 0x01, 0x0C2D, &payload).unwrap();
        let parsed = parse(&frame_bytes).unwrap();
        let recovered: [u8; 4] = parsed.payload.try_into().unwrap();
        prop_assert_eq!(Timestamp::from_wire_bytes(recovered), ts);
    }
}

#[test]
fn grid_power_scaling_constant_is_pinned() {
    // Regression pin for the PowerW opcode (§4.5): raw tenths-of-kW -> W.
    let payload = 500i32.to_be_bytes().to_vec();
    let frame_bytes = build(0xFB, 0x01, 0x0C29, &payload).unwrap();
    let parsed = parse(&frame_bytes).unwrap();
    let value = decode_numeric_reply(&GRID_POWER, &parsed.payload).unwrap();
    assert_eq!(value, Value::Float64(50_000.0));
}
