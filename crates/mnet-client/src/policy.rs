//! Retry and timeout policy (§4.6, §5, §6.4).

use std::time::Duration;

/// Default per-request reply timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
/// Default retry budget for ordinary operations.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default retry budget for alarm operations (§6.4: "Alarm retries = 6").
pub const DEFAULT_MAX_ALARM_RETRIES: u32 = 6;
/// Default delay inserted between retries (§5, §6.4).
pub const DEFAULT_PACKET_SEND_DELAY: Duration = Duration::from_millis(50);

/// Retry/timeout knobs shared across [`crate::Client`] operations.
///
/// Defaults match §6.4. There is no per-call override: the whole policy is
/// replaced at once via [`crate::Client::set_retry_policy`] and applies to
/// every subsequent operation on that client until replaced again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// How long to wait for a reply before considering the attempt timed
    /// out.
    pub per_request_timeout: Duration,
    /// Maximum additional attempts after the first, for ordinary
    /// operations.
    pub max_retries: u32,
    /// Maximum additional attempts after the first, for alarm operations.
    pub max_alarm_retries: u32,
    /// Delay inserted before each retry attempt (not before the first).
    pub packet_send_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            per_request_timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            max_alarm_retries: DEFAULT_MAX_ALARM_RETRIES,
            packet_send_delay: DEFAULT_PACKET_SEND_DELAY,
        }
    }
}
