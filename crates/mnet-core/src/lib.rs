//! Transport boundary for the M-net client: the [`ByteChannel`] abstraction,
//! a TCP adapter, the frame-level channel driver (C4), and an injectable
//! [`Clock`] for deterministic retry-policy testing.
//!
//! This crate has no notion of M-net sessions, login, or retries — that is
//! `mnet-client`'s job. It only knows how to move and frame bytes.

pub mod channel;
pub mod clock;
pub mod driver;
pub mod error;
pub mod tcp;

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use channel::ByteChannel;
pub use clock::{Clock, SystemClock};
pub use driver::{ChannelDriver, DriverError};
pub use error::ChannelError;
pub use tcp::TcpByteChannel;
