//! Silence tracking for the listener receiver.
//!
//! Message delivery runs on a background task while the caller waits in
//! [`SilenceDeadline::wait_for_silence`]. The two sides share a single atomic
//! timestamp and nothing else.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::handler::MessageHandler;
use crate::message::Message;
use crate::receiver::{Acknowledger, MessageListener};

/// Time of the last successfully processed message.
///
/// Stored as nanoseconds since the deadline was created so it fits in one
/// `AtomicU64`. Starts at creation time and never moves backwards.
#[derive(Debug)]
pub struct SilenceDeadline {
    origin: Instant,
    last_activity_nanos: AtomicU64,
}

impl Default for SilenceDeadline {
    fn default() -> Self {
        Self::new()
    }
}

impl SilenceDeadline {
    pub fn new() -> Self {
        SilenceDeadline {
            origin: Instant::now(),
            last_activity_nanos: AtomicU64::new(0),
        }
    }

    /// Records activity now.
    pub fn touch(&self) {
        let nanos = u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.last_activity_nanos.fetch_max(nanos, Ordering::AcqRel);
    }

    pub fn last_activity(&self) -> Instant {
        self.origin + Duration::from_nanos(self.last_activity_nanos.load(Ordering::Acquire))
    }

    /// How much of `window` is left before the silence is complete.
    pub fn remaining(&self, window: Duration) -> Duration {
        window.saturating_sub(self.last_activity().elapsed())
    }

    /// Returns once `window` has passed with no call to [`touch`](Self::touch).
    ///
    /// Sleeps for exactly the remaining time and re-checks, so without
    /// concurrent activity it wakes once. A late wake-up is harmless.
    pub async fn wait_for_silence(&self, window: Duration) {
        loop {
            let remaining = self.remaining(window);
            if remaining.is_zero() {
                return;
            }
            tokio::time::sleep(remaining).await;
        }
    }
}

/// Listener that handles, acknowledges, then records activity.
///
/// A failed handler or acknowledgment is logged and leaves the deadline
/// untouched; the message stays unacknowledged.
pub struct SilenceListener<H> {
    handler: H,
    deadline: Arc<SilenceDeadline>,
}

impl<H: MessageHandler> SilenceListener<H> {
    pub fn new(handler: H, deadline: Arc<SilenceDeadline>) -> Self {
        SilenceListener { handler, deadline }
    }
}

#[async_trait]
impl<H: MessageHandler> MessageListener for SilenceListener<H> {
    async fn on_message(&self, message: Message, acknowledger: &Acknowledger) {
        if let Err(e) = self.handler.handle(&message).await {
            tracing::error!(message_id = %message.message_id, "Error processing message: {}", e);
            return;
        }

        if let Err(e) = acknowledger.acknowledge(&message).await {
            tracing::error!(message_id = %message.message_id, "Error processing message: {}", e);
            return;
        }

        tracing::info!("Acknowledged message {}", message.message_id);
        self.deadline.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    fn assert_about(actual: Duration, expected: Duration) {
        let slack = Duration::from_millis(5);
        assert!(
            actual >= expected && actual <= expected + slack,
            "expected about {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[tokio::test(start_paused = true)]
    async fn waits_full_window_without_activity() {
        let deadline = SilenceDeadline::new();
        let started = Instant::now();

        deadline.wait_for_silence(WINDOW).await;

        assert_about(started.elapsed(), WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn touch_pushes_the_deadline_out() {
        let deadline = Arc::new(SilenceDeadline::new());
        let started = Instant::now();

        let toucher = {
            let deadline = deadline.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(45)).await;
                deadline.touch();
            })
        };

        deadline.wait_for_silence(WINDOW).await;
        toucher.await.unwrap();

        assert_about(started.elapsed(), Duration::from_secs(105));
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_shrinks_with_elapsed_time() {
        let deadline = SilenceDeadline::new();
        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(deadline.remaining(WINDOW), Duration::from_secs(40));

        deadline.touch();
        assert_eq!(deadline.remaining(WINDOW), WINDOW);

        tokio::time::advance(Duration::from_secs(90)).await;
        assert_eq!(deadline.remaining(WINDOW), Duration::ZERO);
    }

    #[test]
    fn last_activity_never_moves_backwards() {
        let deadline = SilenceDeadline::new();
        deadline.last_activity_nanos.store(u64::MAX / 2, Ordering::Release);
        deadline.touch();
        assert_eq!(deadline.last_activity_nanos.load(Ordering::Acquire), u64::MAX / 2);
    }
}
