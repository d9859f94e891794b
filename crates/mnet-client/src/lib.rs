//! Stateful client for the M-net WP3000/IC1000/IC1100 protocol.
//!
//! # Architecture
//!
//! Unlike the workspace's other client crates, this one is not sans-IO: the
//! underlying protocol is a half-duplex, synchronous request/reply exchange
//! over a single serial-style channel (§5: "Exactly three [suspension
//! points]: channel read, channel write, and timer wait"), with no
//! concurrent sessions, state sync, or group membership to reconcile. An
//! event/action split would only relocate the blocking instead of removing
//! it, so [`Client`] exposes direct blocking methods on top of
//! [`mnet_core::ChannelDriver`] and retries internally per its
//! [`RetryPolicy`].
//!
//! # Components
//!
//! - [`Client`]: owns one [`mnet_core::ByteChannel`], tracks [`SessionState`],
//!   and implements the full request/reply API (C7).
//! - [`error::ClientError`]: the error taxonomy surfaced to callers.
//! - [`Command`]: the turbine command enum for [`Client::send_command`].
//! - [`RetryPolicy`]: per-client timeout/retry knobs.

pub mod client;
pub mod command;
pub mod error;
pub mod policy;

pub use client::{Client, Direction, LogSink, SessionState, DEFAULT_HOST_ADDRESS};
pub use command::Command;
pub use error::ClientError;
pub use policy::RetryPolicy;
