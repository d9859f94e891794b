//! Fuzz target for `frame::parse`.
//!
//! Arbitrary bytes, including ones that happen to contain `SOH`/`EOT`
//! delimiters, are fed straight into the frame parser. It must never panic:
//! every malformed case (bad CRC, truncated header, dangling escape byte,
//! length mismatch) has to come back as an `Err`.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mnet_proto::frame;

fuzz_target!(|data: &[u8]| {
    let _ = frame::parse(data);
    let _ = frame::find_frame(data);
});
