//! Stateful client session (C6, C7, §4.6, §4.7): a request/reply transaction
//! loop on top of [`ChannelDriver`], with retry/timeout policy, session
//! state, and the high-level M-net operations.

use std::collections::HashMap;

use mnet_core::{ByteChannel, ChannelDriver, Clock, SystemClock};
use mnet_proto::{
    AlarmRecord, Averaging, DataId, DataPointDescriptor, EventRecord, PacketType, ParsedFrame,
    RemoteDisplay, Timestamp, Value,
    codec::{self, MAX_BATCH},
    datapoint::{self, COMMAND_BASE_ID, EVENT_BASE_ID},
    event::EVENT_BATCH_CHUNK,
    login, obfuscation,
};

use crate::{command::Command, error::ClientError, error::Result, policy::RetryPolicy};

/// Host address this client presents as `SRC` on every frame, absent an
/// explicit override (§6.1's captures use `0xFB` for the host side).
pub const DEFAULT_HOST_ADDRESS: u8 = 0xFB;

/// Direction of a logged wire frame, passed to [`LogSink::log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Bytes sent to the controller.
    Tx,
    /// Bytes received from the controller.
    Rx,
}

/// Injected observability sink (§1, §7's design note "Global/process state
/// -> injected sinks"): `log` sees raw wire traffic, `debug` sees protocol
/// events (state transitions, retries). Both are best-effort; a `LogSink`
/// must not panic or block meaningfully, since it runs inline in the
/// transaction loop.
pub trait LogSink: Send {
    /// Called with the hex-encoded bytes of a frame's payload as it crosses
    /// the wire.
    fn log(&self, hex_bytes: &str, direction: Direction);

    /// Called with a human-readable protocol event.
    fn debug(&self, msg: &str);
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Session state (C6, §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No serial, no key. Only [`Client::get_serial_number`] is permitted.
    Fresh,
    /// Serial cached, obfuscation key derived. [`Client::login`] and reads
    /// of non-protected points are permitted.
    SerialKnown,
    /// All operations permitted.
    Authenticated,
    /// The transport itself failed. Every operation returns
    /// [`ClientError::NotReady`] until [`Client::reset`].
    Broken,
}

/// A stateful M-net session over one [`ByteChannel`] (§5: "a `Client`
/// represents a single logical session ... not safe for concurrent
/// operations from multiple callers").
pub struct Client<C: ByteChannel, K: Clock = SystemClock> {
    driver: ChannelDriver<C>,
    clock: K,
    src: u8,
    state: SessionState,
    serial: Option<[u8; 4]>,
    key: Option<[u8; 4]>,
    alarm_descriptions: HashMap<u16, String>,
    retry_policy: RetryPolicy,
    log_sink: Option<Box<dyn LogSink>>,
    last_retries: u32,
}

impl<C: ByteChannel> Client<C, SystemClock> {
    /// Build a client over `channel`, using the real wall clock.
    pub fn new(channel: C) -> Self {
        Self::with_clock(channel, SystemClock)
    }
}

impl<C: ByteChannel, K: Clock> Client<C, K> {
    /// Build a client over `channel` with an injected [`Clock`] (tests use
    /// [`mnet_core::test_util::MockClock`] for deterministic retry timing).
    pub fn with_clock(channel: C, clock: K) -> Self {
        Self {
            driver: ChannelDriver::new(channel),
            clock,
            src: DEFAULT_HOST_ADDRESS,
            state: SessionState::Fresh,
            serial: None,
            key: None,
            alarm_descriptions: HashMap::new(),
            retry_policy: RetryPolicy::default(),
            log_sink: None,
            last_retries: 0,
        }
    }

    /// Override the host address presented as `SRC` on outgoing frames.
    pub const fn set_host_address(&mut self, src: u8) {
        self.src = src;
    }

    /// Replace the retry/timeout policy (defaults match §6.4).
    pub fn set_retry_policy(&mut self, policy: RetryPolicy) {
        self.retry_policy = policy;
    }

    /// Install a [`LogSink`] for wire traffic and protocol events.
    pub fn set_log_sink(&mut self, sink: Box<dyn LogSink>) {
        self.log_sink = Some(sink);
    }

    /// Current session state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Number of retries the most recently completed transaction needed
    /// (`0` if it succeeded on the first attempt).
    #[must_use]
    pub const fn last_retry_count(&self) -> u32 {
        self.last_retries
    }

    /// The cached serial number, if [`Client::get_serial_number`] has been
    /// called.
    #[must_use]
    pub const fn serial_number(&self) -> Option<[u8; 4]> {
        self.serial
    }

    /// Return to [`SessionState::Fresh`], discarding the cached serial, key,
    /// and any buffered input (§4.6: "`Broken` -> reconnect -> `Fresh`").
    pub fn reset(&mut self) {
        self.state = SessionState::Fresh;
        self.serial = None;
        self.key = None;
        self.alarm_descriptions.clear();
        self.driver.clear();
        self.note("reset to Fresh");
    }

    fn note(&self, msg: &str) {
        tracing::debug!(state = ?self.state, "{msg}");
        if let Some(sink) = &self.log_sink {
            sink.debug(msg);
        }
    }

    /// Drive the session to [`SessionState::Broken`] on a genuine transport
    /// failure (§4.6: "the state machine does not transition to `Broken`
    /// unless the transport itself errored"), then hand the error back
    /// unchanged. Non-transport errors (protocol/auth/usage errors) pass
    /// through without touching `self.state`.
    fn fail(&mut self, err: ClientError) -> ClientError {
        if matches!(err, ClientError::Transport(_)) {
            self.state = SessionState::Broken;
            self.note("transport error; session broken, call reset() to recover");
        }
        err
    }

    fn require_not_broken(&self) -> Result<()> {
        if self.state == SessionState::Broken { Err(ClientError::NotReady) } else { Ok(()) }
    }

    fn require_serial_known(&self) -> Result<()> {
        self.require_not_broken()?;
        if self.state == SessionState::Fresh { Err(ClientError::UnauthenticatedOp) } else { Ok(()) }
    }

    fn require_authenticated(&self) -> Result<()> {
        self.require_not_broken()?;
        if self.state != SessionState::Authenticated { Err(ClientError::UnauthenticatedOp) } else { Ok(()) }
    }

    /// Run one request/reply transaction against `dst`, retrying per
    /// `self.retry_policy` up to `max_retries` additional attempts
    /// (§4.6: "Before writing, clear() the input buffer... between retries,
    /// re-clear").
    ///
    /// If `request_type.reply_for()` is `None` (login has no defined
    /// pairing, §6.2), any reply frame is accepted and the caller is
    /// responsible for inspecting its packet type.
    fn transact(
        &mut self,
        dst: u8,
        request_type: PacketType,
        payload: &[u8],
        max_retries: u32,
    ) -> Result<ParsedFrame> {
        let expected_reply = request_type.reply_for();
        // Every loop iteration either returns or falls through to the next
        // attempt; `last_err` only backstops the type checker, which can't
        // see that the final attempt always returns explicitly.
        let mut last_err = ClientError::Timeout;

        for attempt in 0..=max_retries {
            self.last_retries = attempt;
            if attempt > 0 {
                // §5: a timed-out/cancelled request must not leave half a
                // frame visible to the next attempt; re-clear before
                // retrying, not before the transaction's first attempt
                // (nothing stale to discard yet there).
                self.note(&format!("retry {attempt}/{max_retries} for {:#06x}", request_type.to_u16()));
                self.clock.sleep(self.retry_policy.packet_send_delay);
                self.driver.clear();
            }

            if let Err(err) = self.driver.send_frame(dst, self.src, request_type.to_u16(), payload).map_err(ClientError::from) {
                return Err(self.fail(err));
            }
            if let Some(sink) = &self.log_sink {
                sink.log(&to_hex(payload), Direction::Tx);
            }

            let deadline = self.clock.deadline_after(self.retry_policy.per_request_timeout);
            let outcome = self
                .driver
                .receive_frame(deadline)
                .map_err(ClientError::from)
                .and_then(|frame| match expected_reply {
                    Some(expected) if frame.packet_type != expected.to_u16() => {
                        Err(ClientError::WrongReplyType { expected: expected.to_u16(), actual: frame.packet_type })
                    },
                    _ => Ok(frame),
                });

            match outcome {
                Ok(frame) => {
                    if let Some(sink) = &self.log_sink {
                        sink.log(&to_hex(&frame.payload), Direction::Rx);
                    }
                    return Ok(frame);
                },
                Err(err) if err.is_retryable() && attempt < max_retries => {
                    last_err = err;
                },
                Err(err) => return Err(self.fail(err)),
            }
        }
        Err(last_err)
    }

    /// Mandatory first call (§4.7): fetch and cache the 4-byte serial number
    /// and derive the obfuscation key from it. The request payload is
    /// unobfuscated.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotReady`] if the client is [`SessionState::Broken`],
    /// or a transaction error on transport/framing failure.
    pub fn get_serial_number(&mut self, dst: u8) -> Result<[u8; 4]> {
        self.require_not_broken()?;
        let frame = self.transact(dst, PacketType::RequestSerialNumber, &[], self.retry_policy.max_retries)?;
        let serial: [u8; 4] = frame.payload.as_slice().try_into().map_err(|_| {
            ClientError::Protocol(format!("serial reply: expected 4 bytes, got {}", frame.payload.len()))
        })?;
        self.serial = Some(serial);
        self.key = Some(obfuscation::derive_key(serial));
        if self.state == SessionState::Fresh {
            self.state = SessionState::SerialKnown;
        }
        self.note("serial number cached");
        Ok(serial)
    }

    /// Authenticate with `manufacturer_code` (§6.5). `RemoteLogin` has no
    /// defined reply pairing (§6.2); the controller answers either with
    /// `RemoteLogin` itself (success) or `NotLoggedIn` (rejection).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnauthenticatedOp`] if called before
    /// [`Client::get_serial_number`], or [`ClientError::AuthFailed`] if the
    /// controller rejects the credential.
    pub fn login(&mut self, dst: u8, manufacturer_code: u8) -> Result<()> {
        self.require_serial_known()?;
        let key = self.key.ok_or(ClientError::UnauthenticatedOp)?;
        let payload = login::encode_login_payload(manufacturer_code, &key);
        let frame = self.transact(dst, PacketType::RemoteLogin, &payload, self.retry_policy.max_retries)?;

        match PacketType::from_u16(frame.packet_type) {
            PacketType::RemoteLogin => {
                self.state = SessionState::Authenticated;
                self.note("authenticated");
                Ok(())
            },
            PacketType::NotLoggedIn => {
                tracing::warn!("login rejected by controller");
                Err(ClientError::AuthFailed)
            },
            other => Err(ClientError::WrongReplyType {
                expected: PacketType::RemoteLogin.to_u16(),
                actual: other.to_u16(),
            }),
        }
    }

    /// Read a single data point (§4.5, §4.7).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnsupportedAveraging`] for `Averaging::Unknown`,
    /// or a transaction/decode error.
    pub fn request_data(&mut self, dst: u8, descriptor: &DataPointDescriptor, averaging: Averaging) -> Result<Value> {
        self.require_serial_known()?;
        datapoint::validate_averaging(averaging)?;
        let id = DataId::with_averaging(descriptor.base_id, averaging);
        let payload = codec::encode_request_data(id);
        let frame = self.transact(dst, PacketType::RequestData, &payload, self.retry_policy.max_retries)?;
        codec::decode_value(descriptor, &frame.payload).map_err(ClientError::from)
    }

    /// Read up to [`MAX_BATCH`] data points in one controller request,
    /// chunking transparently if `items` exceeds that bound (§4.7:
    /// "large batches ... are split transparently; results are concatenated
    /// preserving order").
    ///
    /// # Errors
    ///
    /// As [`Client::request_data`], for any sub-batch.
    pub fn request_multiple_data(
        &mut self,
        dst: u8,
        items: &[(DataPointDescriptor, Averaging)],
    ) -> Result<Vec<Value>> {
        self.require_serial_known()?;
        let mut values = Vec::with_capacity(items.len());
        for chunk in items.chunks(MAX_BATCH) {
            for &(_, averaging) in chunk {
                datapoint::validate_averaging(averaging)?;
            }
            let ids: Vec<DataId> =
                chunk.iter().map(|(descriptor, averaging)| DataId::with_averaging(descriptor.base_id, *averaging)).collect();
            let payload = codec::encode_request_multiple_data(&ids).map_err(ClientError::from)?;
            let frame = self.transact(dst, PacketType::RequestMultipleData, &payload, self.retry_policy.max_retries)?;
            let descriptors: Vec<DataPointDescriptor> = chunk.iter().map(|(descriptor, _)| *descriptor).collect();
            values.extend(codec::decode_multiple_data_reply(&descriptors, &frame.payload).map_err(ClientError::from)?);
        }
        Ok(values)
    }

    /// Write `cmd` to the controller's command data point (§4.7).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnauthenticatedOp`] unless the session is
    /// [`SessionState::Authenticated`].
    pub fn send_command(&mut self, dst: u8, cmd: Command) -> Result<()> {
        self.require_authenticated()?;
        let id = DataId::from_logical(COMMAND_BASE_ID);
        let payload = codec::encode_request_write_data(&[(id, cmd.code())]).map_err(ClientError::from)?;
        self.transact(dst, PacketType::RequestWriteData, &payload, self.retry_policy.max_retries)?;
        self.note(&format!("sent command {cmd:?}"));
        Ok(())
    }

    /// Read the controller's time-of-day (§4.7, §6.3).
    ///
    /// # Errors
    ///
    /// As [`Client::request_data`].
    pub fn get_controller_time(&mut self, dst: u8) -> Result<Timestamp> {
        self.require_serial_known()?;
        let payload = codec::encode_request_data(DataId::CONTROLLER_TIME);
        let frame = self.transact(dst, PacketType::RequestData, &payload, self.retry_policy.max_retries)?;
        match codec::decode_timestamp_reply(&frame.payload).map_err(ClientError::from)? {
            Value::Timestamp(ts) => Ok(ts),
            other => Err(ClientError::Protocol(format!("expected Timestamp, decoded {other:?}"))),
        }
    }

    /// Write `time` to the controller's time-of-day data point, via
    /// write-data (§6.3: "Set controller time ... uses Request write data").
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnauthenticatedOp`] unless authenticated.
    pub fn set_controller_time(&mut self, dst: u8, time: Timestamp) -> Result<()> {
        self.require_authenticated()?;
        let payload =
            codec::encode_request_write_data(&[(DataId::CONTROLLER_TIME, time.epoch_seconds())]).map_err(ClientError::from)?;
        self.transact(dst, PacketType::RequestWriteData, &payload, self.retry_policy.max_retries)?;
        self.note("controller time set");
        Ok(())
    }

    /// Read the raw 138-byte remote display buffer (§4.8). Shares the
    /// serial-number packet type (0x0C2E/0x0C2F, §6.2); the reply's length
    /// distinguishes a display buffer from a 4-byte serial number.
    ///
    /// # Errors
    ///
    /// As [`Client::request_data`].
    pub fn get_remote_display(&mut self, dst: u8) -> Result<RemoteDisplay> {
        self.require_serial_known()?;
        let frame = self.transact(dst, PacketType::RequestSerialNumber, &[], self.retry_policy.max_retries)?;
        RemoteDisplay::from_bytes(&frame.payload).map_err(ClientError::from)
    }

    /// [`Client::get_remote_display`], rendered as trimmed text lines.
    ///
    /// # Errors
    ///
    /// As [`Client::get_remote_display`].
    pub fn get_remote_display_text(&mut self, dst: u8) -> Result<Vec<String>> {
        Ok(self.get_remote_display(dst)?.text_lines())
    }

    /// Read one event-stack entry by index, `0` = most recent (§4.8).
    ///
    /// # Errors
    ///
    /// As [`Client::request_data`].
    pub fn get_event(&mut self, dst: u8, index: u8) -> Result<EventRecord> {
        self.require_serial_known()?;
        let id = DataId::from_logical(EVENT_BASE_ID | u32::from(index));
        let payload = codec::encode_request_data(id);
        let frame = self.transact(dst, PacketType::RequestData, &payload, self.retry_policy.max_retries)?;
        EventRecord::decode(index, &frame.payload).map_err(ClientError::from)
    }

    /// Read up to `limit` event-stack entries, most recent first, chunked at
    /// [`EVENT_BATCH_CHUNK`] entries per controller request (§4.7).
    ///
    /// # Errors
    ///
    /// As [`Client::get_event`], for any entry in the range.
    pub fn get_events_batch(&mut self, dst: u8, limit: u8) -> Result<Vec<EventRecord>> {
        self.require_serial_known()?;
        let limit = usize::from(limit);
        let mut events = Vec::with_capacity(limit);
        let mut index = 0usize;
        while index < limit {
            let chunk_end = (index + EVENT_BATCH_CHUNK).min(limit);
            for i in index..chunk_end {
                #[allow(clippy::cast_possible_truncation)] // bounded by `limit: u8` above
                let event_index = i as u8;
                events.push(self.get_event(dst, event_index)?);
            }
            index = chunk_end;
        }
        Ok(events)
    }

    /// Read one alarm record by sub-identifier, using the first-fetch
    /// payload (description + occurrence) unless the description is already
    /// cached (§4.8).
    ///
    /// # Errors
    ///
    /// As [`Client::request_data`].
    pub fn get_alarm_record(&mut self, dst: u8, sub_id: u16) -> Result<AlarmRecord> {
        self.require_serial_known()?;
        // The alarm data family's request payload is not captured by any
        // §8 test vector; this selects the target alarm the same way its
        // own reply is keyed (a bare big-endian `sub_id`), since every
        // alarm reply parser in `mnet_proto::alarm` begins with exactly
        // that field. See `DESIGN.md` for the resolution record.
        let payload = sub_id.to_be_bytes().to_vec();
        let request_type = PacketType::AlarmData(PacketType::ALARM_DATA_BASE);
        let frame = self.transact(dst, request_type, &payload, self.retry_policy.max_alarm_retries)?;

        let record = if let Some(cached) = self.alarm_descriptions.get(&sub_id) {
            AlarmRecord::decode_occurrence(&frame.payload, cached.clone())
        } else {
            AlarmRecord::decode_full(&frame.payload)
        }
        .map_err(ClientError::from)?;

        self.alarm_descriptions.entry(sub_id).or_insert_with(|| record.description.clone());
        Ok(record)
    }

    /// Read every alarm named in `sub_ids`, optionally filtered to those
    /// that have occurred at least once (§4.8: "Uses cached descriptions
    /// after first fetch"). This core does not know the controller's full
    /// alarm table ahead of time, so the caller supplies which sub-ids to
    /// poll.
    ///
    /// # Errors
    ///
    /// As [`Client::get_alarm_record`], for any sub-id in the range.
    pub fn get_alarm_history_batch(
        &mut self,
        dst: u8,
        sub_ids: &[u16],
        only_occurred: bool,
    ) -> Result<Vec<AlarmRecord>> {
        self.require_serial_known()?;
        let mut records = Vec::with_capacity(sub_ids.len());
        for &sub_id in sub_ids {
            let record = self.get_alarm_record(dst, sub_id)?;
            if !only_occurred || record.has_occurred {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Instant;

    use mnet_core::{ChannelError, test_util::{MockChannel, MockClock}};
    use mnet_proto::{datapoint::WIND_SPEED, frame};

    use super::*;

    fn reply_frame(dst: u8, src: u8, packet_type: u16, payload: &[u8]) -> Vec<u8> {
        frame::build(dst, src, packet_type, payload).unwrap()
    }

    /// Queue a reply one byte per `read` call. `ChannelDriver::receive_frame`
    /// stops reading as soon as it has assembled one complete frame, so a
    /// `MockChannel` given several replies up front must never hand back more
    /// than the current frame in a single `read` — otherwise the next
    /// frame's bytes get pulled into this one's buffer and are dropped when
    /// it returns, starving the following transaction. Byte-at-a-time reads
    /// make that impossible.
    fn queue_reply(channel: &mut MockChannel, frame: &[u8]) {
        channel.queue_chunked_input(frame, 1);
    }

    /// A [`ByteChannel`] whose first `drop_reads` reads time out before it
    /// starts returning `reply` whole. `MockChannel`'s shared input queue
    /// can't express "this reply only becomes readable after a retry" since
    /// `clear_input` drains it unconditionally; this double exists
    /// specifically for the S6 retry-on-timeout scenario.
    struct FlakyChannel {
        drop_reads: usize,
        reads_seen: usize,
        reply: Vec<u8>,
    }

    impl ByteChannel for FlakyChannel {
        fn read(&mut self, max_len: usize, _deadline: Instant) -> mnet_core::error::Result<Vec<u8>> {
            self.reads_seen += 1;
            if self.reads_seen <= self.drop_reads {
                return Err(ChannelError::Timeout { requested: max_len });
            }
            Ok(self.reply.clone())
        }

        fn write(&mut self, _bytes: &[u8]) -> mnet_core::error::Result<()> {
            Ok(())
        }

        fn clear_input(&mut self) {}
    }

    /// A [`ByteChannel`] that returns the same reply bytes on every `read`,
    /// for scenarios that need a wrong-type (or otherwise invalid) reply to
    /// recur across every retry attempt.
    struct RepeatingChannel {
        reply: Vec<u8>,
    }

    impl ByteChannel for RepeatingChannel {
        fn read(&mut self, _max_len: usize, _deadline: Instant) -> mnet_core::error::Result<Vec<u8>> {
            Ok(self.reply.clone())
        }

        fn write(&mut self, _bytes: &[u8]) -> mnet_core::error::Result<()> {
            Ok(())
        }

        fn clear_input(&mut self) {}
    }

    #[test]
    fn fresh_client_rejects_ops_before_serial() {
        let mut client = Client::new(MockChannel::new());
        let result = client.request_data(0x01, &WIND_SPEED, Averaging::Current);
        assert!(matches!(result, Err(ClientError::UnauthenticatedOp)));
    }

    #[test]
    fn get_serial_number_transitions_to_serial_known() {
        let mut channel = MockChannel::new();
        channel.queue_input(&reply_frame(0xFB, 0x01, 0x0C2F, &[0xDE, 0xAD, 0xBE, 0xEF]));
        let mut client = Client::new(channel);

        let serial = client.get_serial_number(0x01).unwrap();
        assert_eq!(serial, [0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(client.state(), SessionState::SerialKnown);
    }

    #[test]
    fn login_success_transitions_to_authenticated() {
        let mut channel = MockChannel::new();
        queue_reply(&mut channel, &reply_frame(0xFB, 0x01, 0x0C2F, &[0x01, 0x02, 0x03, 0x04]));
        queue_reply(&mut channel, &reply_frame(0xFB, 0x01, 0x138E, &[0, 0, 0, 0]));
        let mut client = Client::new(channel);

        client.get_serial_number(0x01).unwrap();
        client.login(0x01, login::MITA_TEKNIK_MASTER).unwrap();
        assert_eq!(client.state(), SessionState::Authenticated);
    }

    #[test]
    fn login_rejection_surfaces_auth_failed() {
        let mut channel = MockChannel::new();
        queue_reply(&mut channel, &reply_frame(0xFB, 0x01, 0x0C2F, &[0x01, 0x02, 0x03, 0x04]));
        queue_reply(&mut channel, &reply_frame(0xFB, 0x01, 0x1390, &[]));
        let mut client = Client::new(channel);

        client.get_serial_number(0x01).unwrap();
        let result = client.login(0x01, 99);
        assert!(matches!(result, Err(ClientError::AuthFailed)));
        assert_eq!(client.state(), SessionState::SerialKnown);
    }

    #[test]
    fn dropped_first_reply_retries_and_succeeds() {
        // S6: first reply dropped by the transport, second arrives after
        // packet_send_delay; call succeeds with retries=1.
        let channel = FlakyChannel {
            drop_reads: 1,
            reads_seen: 0,
            reply: reply_frame(0xFB, 0x01, 0x0C2F, &[1, 2, 3, 4]),
        };
        let mut client = Client::with_clock(channel, MockClock::new());
        client.set_retry_policy(RetryPolicy { max_retries: 1, ..RetryPolicy::default() });

        let serial = client.get_serial_number(0x01).unwrap();
        assert_eq!(serial, [1, 2, 3, 4]);
        assert_eq!(client.last_retry_count(), 1);
    }

    #[test]
    fn exhausted_retries_surface_timeout() {
        let mut client = Client::with_clock(MockChannel::new(), MockClock::new());
        client.set_retry_policy(RetryPolicy { max_retries: 2, ..RetryPolicy::default() });

        let result = client.get_serial_number(0x01);
        assert!(matches!(result, Err(ClientError::Timeout)));
        assert_eq!(client.last_retry_count(), 2);
    }

    #[test]
    fn wrong_reply_type_is_retried_then_fails() {
        // Every attempt gets the same wrong-type reply for a serial-number
        // request; the retry budget is exhausted without ever seeing a
        // correct one.
        let channel = RepeatingChannel { reply: reply_frame(0xFB, 0x01, 0x0C29, &[0, 0, 0, 0]) };
        let mut client = Client::with_clock(channel, MockClock::new());
        client.set_retry_policy(RetryPolicy { max_retries: 1, ..RetryPolicy::default() });

        let result = client.get_serial_number(0x01);
        assert!(matches!(result, Err(ClientError::WrongReplyType { .. })));
        assert_eq!(client.last_retry_count(), 1);
    }

    #[test]
    fn broken_state_rejects_everything_until_reset() {
        let mut client = Client::new(MockChannel::new());
        client.state = SessionState::Broken;
        assert!(matches!(client.get_serial_number(0x01), Err(ClientError::NotReady)));
        client.reset();
        assert_eq!(client.state(), SessionState::Fresh);
    }

    /// A [`ByteChannel`] whose `write` always fails, for exercising the
    /// transport-error-to-`Broken` transition without poking the state field.
    struct DeadChannel;

    impl ByteChannel for DeadChannel {
        fn read(&mut self, max_len: usize, _deadline: Instant) -> mnet_core::error::Result<Vec<u8>> {
            Err(ChannelError::Timeout { requested: max_len })
        }

        fn write(&mut self, _bytes: &[u8]) -> mnet_core::error::Result<()> {
            Err(ChannelError::Closed)
        }

        fn clear_input(&mut self) {}
    }

    #[test]
    fn transport_error_drives_session_to_broken() {
        let mut client = Client::new(DeadChannel);
        let result = client.get_serial_number(0x01);
        assert!(matches!(result, Err(ClientError::Transport(_))));
        assert_eq!(client.state(), SessionState::Broken);

        let result = client.get_serial_number(0x01);
        assert!(matches!(result, Err(ClientError::NotReady)));
        client.reset();
        assert_eq!(client.state(), SessionState::Fresh);
    }

    #[test]
    fn request_data_decodes_scaled_value() {
        let mut channel = MockChannel::new();
        queue_reply(&mut channel, &reply_frame(0xFB, 0x01, 0x0C2F, &[9, 9, 9, 9]));
        queue_reply(&mut channel, &reply_frame(0xFB, 0x01, 0x0C29, &70i32.to_be_bytes()));
        let mut client = Client::new(channel);

        client.get_serial_number(0x01).unwrap();
        let value = client.request_data(0x01, &WIND_SPEED, Averaging::Current).unwrap();
        assert_eq!(value, Value::Float64(7.0));
    }

    #[test]
    fn send_command_requires_authentication() {
        let mut client = Client::new(MockChannel::new());
        let result = client.send_command(0x01, Command::Start);
        assert!(matches!(result, Err(ClientError::UnauthenticatedOp)));
    }

    #[test]
    fn events_batch_chunks_across_multiple_requests() {
        let mut channel = MockChannel::new();
        queue_reply(&mut channel, &reply_frame(0xFB, 0x01, 0x0C2F, &[1, 1, 1, 1]));
        for _ in 0..6u8 {
            let mut payload = 0x2Au16.to_be_bytes().to_vec();
            payload.extend_from_slice(&1_453_054_813u32.to_be_bytes());
            payload.extend_from_slice(b"EVT");
            queue_reply(&mut channel, &reply_frame(0xFB, 0x01, 0x0C29, &payload));
        }
        let mut client = Client::new(channel);
        client.get_serial_number(0x01).unwrap();

        let events = client.get_events_batch(0x01, 6).unwrap();
        assert_eq!(events.len(), 6);
        assert_eq!(events[0].index, 0);
        assert_eq!(events[5].index, 5);
    }

    #[test]
    fn alarm_record_caches_description_on_second_fetch() {
        let mut channel = MockChannel::new();
        queue_reply(&mut channel, &reply_frame(0xFB, 0x01, 0x0C2F, &[2, 2, 2, 2]));
        let mut first = vec![0x00, 0x11];
        first.extend_from_slice(&Timestamp::NEVER.epoch_seconds().to_be_bytes());
        first.extend_from_slice(b"OVERTEMP");
        queue_reply(&mut channel, &reply_frame(0xFB, 0x01, 0x0BFC, &first));
        let mut second = vec![0x00, 0x11];
        second.extend_from_slice(&1_453_054_813u32.to_be_bytes());
        queue_reply(&mut channel, &reply_frame(0xFB, 0x01, 0x0BFC, &second));
        let mut client = Client::new(channel);
        client.get_serial_number(0x01).unwrap();

        let first_poll = client.get_alarm_record(0x01, 0x0011).unwrap();
        assert!(!first_poll.has_occurred);
        assert_eq!(first_poll.description, "OVERTEMP");

        let second_poll = client.get_alarm_record(0x01, 0x0011).unwrap();
        assert!(second_poll.has_occurred);
        assert_eq!(second_poll.description, "OVERTEMP");
    }

    #[test]
    fn hex_encode_matches_expected_format() {
        assert_eq!(to_hex(&[0x0a, 0xff]), "0aff");
    }
}
