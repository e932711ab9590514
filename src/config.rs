//! Protocol constants and tunables.

use std::time::Duration;

/// Number of outstanding frames the sender may have in flight, and the
/// number of out-of-order frames the receiver may buffer. Fixed by the
/// protocol, not negotiated.
pub const SEND_WINDOW_SIZE: usize = 5;
pub const RECV_WINDOW_SIZE: usize = SEND_WINDOW_SIZE;

/// Retransmission timeout: how long the sender waits for an ACK before
/// re-sending an unacknowledged frame.
pub const TIMEOUT: Duration = Duration::from_secs(1);

/// Largest payload a single DATA frame may carry.
pub const MAX_DATA_SIZE: usize = 1400;

/// Wire header size: 1 type byte + 4 big-endian sequence bytes.
pub const HEADER_SIZE: usize = 5;

/// How often the sender's retransmit-sweep thread wakes to check slot
/// deadlines. Shorter than `TIMEOUT` so retransmission latency stays close
/// to `TIMEOUT` without spinning.
pub const RETRANSMIT_TICK: Duration = Duration::from_millis(50);

/// Bundles the handful of knobs a caller may want to override. Window size
/// is not one of them: it is fixed at `SEND_WINDOW_SIZE` by the protocol
/// (see spec Non-goals: no dynamic window sizing). This exists mainly so
/// tests can shrink `timeout` and `tick` without touching the protocol
/// constants above.
#[derive(Debug, Clone, Copy)]
pub struct SwpConfig {
    pub timeout: Duration,
    pub tick: Duration,
    pub max_payload: usize,
}

impl SwpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }
}

impl Default for SwpConfig {
    fn default() -> Self {
        Self {
            timeout: TIMEOUT,
            tick: RETRANSMIT_TICK,
            max_payload: MAX_DATA_SIZE,
        }
    }
}
