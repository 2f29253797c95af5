//! Blocking-poll receive loop for the wiring receiver.

use std::time::Duration;

use tokio::time::Instant;

use crate::errors::ReceiverError;
use crate::handler::MessageHandler;
use crate::receiver::Consumer;

/// Outcome of a [`receive_until_silence`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumeReport {
    /// Messages handled and acknowledged.
    pub acknowledged: usize,
    /// Messages whose handling or acknowledgment failed, left for redelivery.
    pub failed: usize,
}

/// Receives and handles messages until `window` passes without one.
///
/// Silence is measured from the last acknowledged message, so each receive
/// only waits for what is left of `window`. A handler failure is logged and
/// the message is left unacknowledged; the loop keeps going without resetting
/// the clock. A receive failure ends the run with `Err`.
pub async fn receive_until_silence<H>(
    consumer: &Consumer,
    handler: &H,
    window: Duration,
) -> Result<ConsumeReport, ReceiverError>
where
    H: MessageHandler + ?Sized,
{
    let mut report = ConsumeReport::default();
    let mut last_success = Instant::now();

    loop {
        let remaining = window.saturating_sub(last_success.elapsed());
        let received = if remaining.is_zero() {
            None
        } else {
            tracing::info!(queue = %consumer.queue().name, "Waiting for messages");
            consumer.receive(remaining).await?
        };

        let Some(message) = received else {
            tracing::info!("Shutting down after {} of silence", humanize(window));
            return Ok(report);
        };

        if let Err(e) = handler.handle(&message).await {
            tracing::error!(message_id = %message.message_id, "Error processing message: {}", e);
            report.failed += 1;
            continue;
        }

        match consumer.acknowledge(&message).await {
            Ok(()) => {
                tracing::info!("Acknowledged message {}", message.message_id);
                report.acknowledged += 1;
                last_success = Instant::now();
            }
            Err(e) => {
                tracing::error!(message_id = %message.message_id, "{}", e);
                report.failed += 1;
            }
        }
    }
}

/// Renders a silence window for status lines, e.g. "1 minute" or "90 seconds".
pub fn humanize(window: Duration) -> String {
    let secs = window.as_secs();
    match secs {
        60 => "1 minute".to_string(),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_string(),
        s if s > 0 => format!("{} seconds", s),
        _ => format!("{} ms", window.as_millis()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanizes_windows() {
        assert_eq!(humanize(Duration::from_secs(60)), "1 minute");
        assert_eq!(humanize(Duration::from_secs(300)), "5 minutes");
        assert_eq!(humanize(Duration::from_secs(90)), "90 seconds");
        assert_eq!(humanize(Duration::from_secs(1)), "1 second");
        assert_eq!(humanize(Duration::from_millis(250)), "250 ms");
    }
}
