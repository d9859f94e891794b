//! Test doubles for [`crate::ByteChannel`] and [`crate::Clock`], exposed
//! behind the `test-util` feature so `mnet-client` can drive its state
//! machine and retry policy deterministically without a real transport.

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use crate::{
    channel::ByteChannel,
    clock::Clock,
    error::{ChannelError, Result},
};

/// A [`ByteChannel`] backed by in-memory queues: bytes pushed with
/// [`MockChannel::queue_input`] are what subsequent `read` calls return;
/// bytes passed to `write` accumulate and are inspectable with
/// [`MockChannel::written_bytes`].
#[derive(Debug, Default)]
pub struct MockChannel {
    input: VecDeque<u8>,
    chunk_len: Option<usize>,
    written: Vec<u8>,
    clear_count: usize,
}

impl MockChannel {
    /// An empty channel: reads time out immediately, nothing has been
    /// written.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `bytes` to be returned, in order, by future `read` calls.
    pub fn queue_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    /// Queue `bytes` but cap each `read` call to at most `chunk_len` bytes,
    /// simulating a slow link that delivers a frame over multiple reads.
    pub fn queue_chunked_input(&mut self, bytes: &[u8], chunk_len: usize) {
        self.queue_input(bytes);
        self.chunk_len = Some(chunk_len.max(1));
    }

    /// Everything written to this channel so far.
    #[must_use]
    pub fn written_bytes(&self) -> Vec<u8> {
        self.written.clone()
    }

    /// How many times [`ByteChannel::clear_input`] has been called.
    #[must_use]
    pub const fn clear_count(&self) -> usize {
        self.clear_count
    }
}

impl ByteChannel for MockChannel {
    fn read(&mut self, max_len: usize, deadline: Instant) -> Result<Vec<u8>> {
        if self.input.is_empty() {
            let _ = deadline; // no data will ever arrive; fail immediately rather than spin
            return Err(ChannelError::Timeout { requested: max_len });
        }
        let take = max_len.min(self.chunk_len.unwrap_or(usize::MAX)).min(self.input.len());
        Ok((0..take).filter_map(|_| self.input.pop_front()).collect())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    fn clear_input(&mut self) {
        self.input.clear();
        self.clear_count += 1;
    }
}

/// A [`Clock`] whose `sleep` is a no-op and whose `now` advances only when
/// explicitly asked to, so retry-policy tests run instantly and
/// deterministically.
#[derive(Debug, Default)]
pub struct MockClock {
    advanced: Duration,
}

impl MockClock {
    /// A clock starting at the real current instant.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move this clock's notion of "now" forward without blocking.
    pub fn advance(&mut self, duration: Duration) {
        self.advanced += duration;
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        Instant::now() + self.advanced
    }

    fn sleep(&self, _duration: Duration) {
        // Deterministic tests don't want to actually block.
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn queue_and_read_round_trip() {
        let mut channel = MockChannel::new();
        channel.queue_input(b"hello");
        let read = channel.read(10, Instant::now()).unwrap();
        assert_eq!(read, b"hello");
    }

    #[test]
    fn chunked_input_limits_each_read() {
        let mut channel = MockChannel::new();
        channel.queue_chunked_input(b"hello", 2);
        assert_eq!(channel.read(10, Instant::now()).unwrap(), b"he");
        assert_eq!(channel.read(10, Instant::now()).unwrap(), b"ll");
        assert_eq!(channel.read(10, Instant::now()).unwrap(), b"o");
    }

    #[test]
    fn empty_channel_times_out() {
        let mut channel = MockChannel::new();
        assert!(matches!(
            channel.read(4, Instant::now()),
            Err(ChannelError::Timeout { requested: 4 })
        ));
    }

    #[test]
    fn clear_input_resets_queue_and_counts() {
        let mut channel = MockChannel::new();
        channel.queue_input(b"data");
        channel.clear_input();
        assert_eq!(channel.clear_count(), 1);
        assert!(matches!(channel.read(4, Instant::now()), Err(ChannelError::Timeout { .. })));
    }

    #[test]
    fn mock_clock_advances_without_blocking() {
        let mut clock = MockClock::new();
        let start = clock.now();
        clock.advance(Duration::from_secs(3600));
        assert!(clock.now() >= start + Duration::from_secs(3600));
    }
}
