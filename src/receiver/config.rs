use std::time::Duration;

/// Configuration shared by the listener and polling receivers.
///
/// # Fields
/// - `silence_window`: how long the receiver waits for the next message before shutting down.
/// - `wait_time_seconds`: the longest single long poll issued to the queue.
/// - `visibility_timeout`: optional per-receive override of the queue's visibility timeout.
/// - `receive_error_backoff`: pause before the listener retries after a failed receive.
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    /// Maximum permitted gap between messages before the receiver shuts down.
    pub silence_window: Duration,

    /// The wait time for long polling, in seconds.
    pub wait_time_seconds: u64,

    /// Visibility timeout applied to received messages, in seconds.
    pub visibility_timeout: Option<i32>,

    pub receive_error_backoff: Duration,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        ReceiverConfig {
            silence_window: Duration::from_secs(60),
            wait_time_seconds: 20,
            visibility_timeout: None,
            receive_error_backoff: Duration::from_secs(1),
        }
    }
}

impl ReceiverConfig {
    pub fn with_silence_window(mut self, silence_window: Duration) -> Self {
        self.silence_window = silence_window;
        self
    }

    /// Upper bound for one long poll. Never zero, so polling cannot spin.
    pub(crate) fn max_poll(&self) -> Duration {
        Duration::from_secs(self.wait_time_seconds.max(1))
    }
}
