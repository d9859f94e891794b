//! Remote login payload encoding (§6.5).
//!
//! "Login payload embeds a manufacturer code byte selecting a credential."
//! This core targets a single fixed controller family, so the credential
//! slot is the one-byte manufacturer code itself, obfuscated with the
//! session key derived from the turbine serial (§4.3) — there is no richer
//! credential structure documented for the WP3000/IC1000 family this core
//! targets.

use crate::obfuscation;

/// Special manufacturer code reserved for the Mita-Teknik master credential
/// (§6.5: "special code 1 (Mita-Teknik master)").
pub const MITA_TEKNIK_MASTER: u8 = 1;

/// Build the obfuscated login payload for `manufacturer_code`, keyed by the
/// session's derived obfuscation key.
#[must_use]
pub fn encode_login_payload(manufacturer_code: u8, key: &[u8; 4]) -> Vec<u8> {
    obfuscation::encode(&[manufacturer_code], key)
}

/// Recover the manufacturer code from a login payload this core itself
/// built, given the same key. Exposed so login can be round-trip tested
/// without a live controller (§4.3: "expose the encode/decode pair as pure
/// functions so authentication ... can be tested end-to-end").
#[must_use]
pub fn decode_login_payload(payload: &[u8], key: &[u8; 4]) -> Option<u8> {
    let plaintext = obfuscation::decode(payload, key);
    plaintext.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_manufacturer_code() {
        let key = [0x11, 0x22, 0x33, 0x44];
        let payload = encode_login_payload(MITA_TEKNIK_MASTER, &key);
        assert_eq!(decode_login_payload(&payload, &key), Some(MITA_TEKNIK_MASTER));
    }

    #[test]
    fn payload_is_obfuscated_not_plaintext() {
        let key = [0xAA, 0xBB, 0xCC, 0xDD];
        let payload = encode_login_payload(42, &key);
        assert_ne!(payload, vec![42]);
    }
}
