use async_trait::async_trait;

use super::{Acknowledger, ConnectionState, Consumer};
use crate::message::Message;

/// Callback invoked for every message delivered to a consumer's listener.
///
/// Deliveries happen one at a time on a background task, never on the
/// caller's own task. The listener owns error handling: anything it does
/// not acknowledge is redelivered by the queue after its visibility timeout.
#[async_trait]
pub trait MessageListener: Send + Sync + 'static {
    /// Handles one delivered message.
    ///
    /// # Arguments
    ///
    /// * `message` - The received message
    /// * `acknowledger` - Acknowledges messages on the consumer's queue
    async fn on_message(&self, message: Message, acknowledger: &Acknowledger);
}

/// Background delivery loop behind [`Consumer::set_message_listener`].
///
/// Idles until the connection is started, then long polls and hands each
/// message to the listener until the connection closes. Receive failures are
/// logged and retried after the configured backoff.
pub(super) async fn run_delivery<L: MessageListener>(consumer: Consumer, listener: L) {
    let acknowledger = consumer.acknowledger();
    let transport = consumer.inner.transport.clone();
    let max_poll = consumer.inner.config.max_poll();
    let backoff = consumer.inner.config.receive_error_backoff;
    let queue_url = consumer.queue.url.clone();
    let mut state = consumer.inner.state.subscribe();
    drop(consumer);

    if state
        .wait_for(|s| *s != ConnectionState::Stopped)
        .await
        .is_err()
    {
        return;
    }

    loop {
        if *state.borrow() == ConnectionState::Closed {
            break;
        }

        let received = tokio::select! {
            received = transport.receive(&queue_url, max_poll) => received,
            _ = state.wait_for(|s| *s == ConnectionState::Closed) => break,
        };

        match received {
            Ok(Some(message)) => listener.on_message(message, &acknowledger).await,
            Ok(None) => tracing::trace!(queue_url = %queue_url, "no messages received"),
            Err(e) => {
                tracing::error!("Error receiving messages: {}", e);
                tokio::select! {
                    _ = tokio::time::sleep(backoff) => {}
                    _ = state.wait_for(|s| *s == ConnectionState::Closed) => break,
                }
            }
        }
    }

    tracing::debug!(queue_url = %queue_url, "listener delivery stopped");
}
