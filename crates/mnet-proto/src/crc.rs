//! CRC-16/XMODEM (C1).
//!
//! Polynomial `0x1021`, initial value `0x0000`, no input/output reflection,
//! no final XOR. This is the integrity check carried by every frame (C2) over
//! `DST | SRC | TYPE_HI | TYPE_LO | LEN | PAYLOAD`.

/// Table-driven CRC-16/XMODEM state.
///
/// Built once as a `const` table so `crc16` has no setup cost per call.
const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut byte = 0usize;
    while byte < 256 {
        let mut crc = (byte as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x1021 } else { crc << 1 };
            bit += 1;
        }
        table[byte] = crc;
        byte += 1;
    }
    table
}

static TABLE: [u16; 256] = build_table();

/// Compute CRC-16/XMODEM over `bytes`.
///
/// # Examples
///
/// ```
/// assert_eq!(mnet_proto::crc::crc16(b"123456789"), 0x31C3);
/// ```
#[must_use]
pub fn crc16(bytes: &[u8]) -> u16 {
    let mut crc: u16 = 0x0000;
    for &b in bytes {
        let index = (((crc >> 8) ^ u16::from(b)) & 0x00FF) as usize;
        crc = (crc << 8) ^ TABLE[index];
    }
    crc
}

/// Bitwise reference implementation, kept to cross-check the table in tests.
#[cfg(test)]
fn crc16_bitwise(bytes: &[u8]) -> u16 {
    let mut crc: u16 = 0x0000;
    for &b in bytes {
        crc ^= u16::from(b) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x1021 } else { crc << 1 };
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn canonical_check_value() {
        // S1: the standard XMODEM check value.
        assert_eq!(crc16(b"123456789"), 0x31C3);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(crc16(b""), 0x0000);
    }

    proptest! {
        #[test]
        fn table_matches_bitwise(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(crc16(&bytes), crc16_bitwise(&bytes));
        }
    }
}
