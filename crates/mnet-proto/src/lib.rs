//! Wire codec for the M-net client protocol (WP3000/IC1000/IC1100
//! controllers): CRC, frame escaping/framing, obfuscation, and the
//! data-point request/reply codec.
//!
//! This crate is transport-agnostic and stateless: it has no notion of a
//! session, a channel, or retries. Those live in `mnet-core` (the channel
//! abstraction) and `mnet-client` (the stateful session on top of it).

pub mod alarm;
pub mod codec;
pub mod crc;
pub mod datapoint;
pub mod errors;
pub mod event;
pub mod frame;
pub mod lcd;
pub mod login;
pub mod obfuscation;
pub mod opcode;
pub mod timestamp;
pub mod value;

pub use alarm::AlarmRecord;
pub use codec::MAX_BATCH;
pub use datapoint::{Averaging, DataId, DataKind, DataPointDescriptor, Scaling};
pub use errors::ProtocolError;
pub use event::EventRecord;
pub use frame::ParsedFrame;
pub use lcd::RemoteDisplay;
pub use opcode::PacketType;
pub use timestamp::Timestamp;
pub use value::Value;
