//! Serial-number-seeded XOR-chaining obfuscation (C3).
//!
//! This is obfuscation, not encryption: it has no secrecy claim and exists
//! only to keep authentication payloads and selected data reads/writes from
//! being trivially legible on the wire. The reverse-engineering catalog this
//! core was built against documents 40+ manufacturer-indexed variants; this
//! crate implements exactly one, the chained-XOR variant the target
//! WP3000/IC1000 family actually uses (§4.3, §9 "Obfuscation variant
//! selection").
//!
//! # Key derivation
//!
//! The key schedule is a 4-byte sequence derived from the turbine's 4-byte
//! serial number by XOR-ing it against a fixed manufacturer constant. This
//! keeps `derive_key` deterministic and keyed only by public wire state (the
//! serial is itself read unobfuscated, per §6.3).
//!
//! # Chaining
//!
//! Each output byte depends on the current plaintext byte, the current key
//! byte (cycled modulo key length), and the previous output byte (CBC-like
//! output feedback) — `c[i] = p[i] ^ k[i % len] ^ c[i-1]`, with `c[-1] = 0`.
//! Decoding runs the same recurrence in terms of the ciphertext:
//! `p[i] = c[i] ^ k[i % len] ^ c[i-1]`.

/// Fixed manufacturer constant XORed into the serial number to produce the
/// key schedule. Informational only: changing this breaks interop with real
/// controllers, it is not a secret.
const KEY_CONSTANT: [u8; 4] = [0x4D, 0x54, 0x4B, 0x2A]; // "MTK*"

/// Derive the 4-byte obfuscation key schedule from a turbine serial number.
#[must_use]
pub fn derive_key(serial_bytes: [u8; 4]) -> [u8; 4] {
    let mut key = serial_bytes;
    for (k, c) in key.iter_mut().zip(KEY_CONSTANT) {
        *k ^= c;
    }
    key
}

/// Obfuscate `plaintext` with `key`, cycling the key modulo its length.
///
/// An empty key leaves the input unchanged (there is no state to chain).
#[must_use]
pub fn encode(plaintext: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return plaintext.to_vec();
    }
    let mut out = Vec::with_capacity(plaintext.len());
    let mut prev: u8 = 0;
    for (i, &p) in plaintext.iter().enumerate() {
        let c = p ^ key[i % key.len()] ^ prev;
        out.push(c);
        prev = c;
    }
    out
}

/// Reverse [`encode`]: `decode(encode(x, k), k) == x` for all `x`, `k`.
#[must_use]
pub fn decode(ciphertext: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return ciphertext.to_vec();
    }
    let mut out = Vec::with_capacity(ciphertext.len());
    let mut prev: u8 = 0;
    for (i, &c) in ciphertext.iter().enumerate() {
        let p = c ^ key[i % key.len()] ^ prev;
        out.push(p);
        prev = c;
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn empty_plaintext_round_trips() {
        let key = derive_key([0x12, 0x34, 0x56, 0x78]);
        assert!(encode(&[], &key).is_empty());
        assert!(decode(&[], &key).is_empty());
    }

    #[test]
    fn derive_key_is_deterministic() {
        let serial = [0xDE, 0xAD, 0xBE, 0xEF];
        assert_eq!(derive_key(serial), derive_key(serial));
    }

    #[test]
    fn different_serials_yield_different_keys() {
        assert_ne!(derive_key([0, 0, 0, 0]), derive_key([1, 0, 0, 0]));
    }

    #[test]
    fn encode_is_not_identity() {
        let key = derive_key([0x01, 0x02, 0x03, 0x04]);
        let plaintext = b"REMOTE_LOGIN_CREDENTIAL";
        assert_ne!(encode(plaintext, &key), plaintext);
    }

    proptest! {
        #[test]
        fn round_trip(
            serial in any::<[u8; 4]>(),
            plaintext in prop::collection::vec(any::<u8>(), 0..256),
        ) {
            let key = derive_key(serial);
            let ciphertext = encode(&plaintext, &key);
            prop_assert_eq!(decode(&ciphertext, &key), plaintext);
        }

        #[test]
        fn chaining_differs_from_plain_xor(
            serial in any::<[u8; 4]>(),
            plaintext in prop::collection::vec(any::<u8>(), 8..256),
        ) {
            let key = derive_key(serial);
            let ciphertext = encode(&plaintext, &key);
            let plain_xor: Vec<u8> = plaintext
                .iter()
                .enumerate()
                .map(|(i, &p)| p ^ key[i % key.len()])
                .collect();
            // Once the running ciphertext differs from plain_xor anywhere,
            // the chain (dependence on prev output) must keep them apart.
            if plaintext.len() > key.len() {
                prop_assert_ne!(ciphertext, plain_xor);
            }
        }
    }
}
