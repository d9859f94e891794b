//! Fuzz target for the obfuscation encode/decode round trip.
//!
//! `decode(encode(plaintext, key), key) == plaintext` for any key and any
//! plaintext, since the chaining recurrence is its own inverse. This should
//! never panic and never diverge from the identity.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mnet_proto::obfuscation;

#[derive(Debug, arbitrary::Arbitrary)]
struct Input {
    key: [u8; 4],
    plaintext: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let ciphertext = obfuscation::encode(&input.plaintext, &input.key);
    let decoded = obfuscation::decode(&ciphertext, &input.key);
    assert_eq!(decoded, input.plaintext);
});
