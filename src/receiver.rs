//! The connection chain: [`Connection`] → [`Session`] → [`Consumer`].
//!
//! A consumer depends on its session, which depends on its connection.
//! Closing the connection closes every dependant: receives in flight return
//! [`ReceiverError::ConnectionClosed`] and background listener delivery stops.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::client::{ConnectionSettings, create_sqs_client};
use crate::errors::ReceiverError;
use crate::message::Message;
use crate::transport::{QueueTransport, SqsTransport};

pub mod config;
mod functions;

pub use config::ReceiverConfig;
pub use functions::MessageListener;

/// Lifecycle of a [`Connection`]. Listeners only receive messages while `Started`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Stopped,
    Started,
    Closed,
}

/// A queue resolved by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queue {
    pub name: String,
    pub url: String,
}

struct ConnectionInner {
    transport: Arc<dyn QueueTransport>,
    config: ReceiverConfig,
    state: watch::Sender<ConnectionState>,
    deliveries: Mutex<Vec<JoinHandle<()>>>,
}

impl ConnectionInner {
    fn ensure_open(&self) -> Result<(), ReceiverError> {
        if *self.state.borrow() == ConnectionState::Closed {
            return Err(ReceiverError::ConnectionClosed);
        }
        Ok(())
    }
}

/// A transport connection to the queue service.
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

impl Connection {
    pub fn new(transport: impl QueueTransport, config: ReceiverConfig) -> Self {
        let (state, _) = watch::channel(ConnectionState::Stopped);
        Connection {
            inner: Arc::new(ConnectionInner {
                transport: Arc::new(transport),
                config,
                state,
                deliveries: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Connects to SQS with the given settings.
    pub async fn connect(settings: &ConnectionSettings, config: ReceiverConfig) -> Self {
        let sqs_client = create_sqs_client(settings).await;
        let transport = SqsTransport::new(sqs_client).with_visibility_timeout(config.visibility_timeout);
        Connection::new(transport, config)
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.inner.config
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Looks up the named queue, creating it if it does not exist yet.
    pub async fn ensure_queue_exists(&self, queue_name: &str) -> Result<Queue, ReceiverError> {
        self.inner.ensure_open()?;
        let url = self.inner.transport.ensure_queue(queue_name).await?;
        tracing::debug!(queue = queue_name, url = %url, "queue resolved");
        Ok(Queue {
            name: queue_name.to_string(),
            url,
        })
    }

    pub fn create_session(&self) -> Result<Session, ReceiverError> {
        self.inner.ensure_open()?;
        Ok(Session {
            inner: self.inner.clone(),
        })
    }

    /// Starts delivery to message listeners. No listener sees a message before this.
    pub fn start(&self) -> Result<(), ReceiverError> {
        self.inner.ensure_open()?;
        let started = self.inner.state.send_if_modified(|state| {
            if *state == ConnectionState::Stopped {
                *state = ConnectionState::Started;
                true
            } else {
                false
            }
        });
        if started {
            tracing::info!("connection started");
        }
        Ok(())
    }

    /// Closes the connection and everything created from it.
    ///
    /// Waits for listener deliveries to wind down. A message already being
    /// handled finishes but can no longer be acknowledged, so the queue
    /// redelivers it once its visibility timeout expires. Closing twice is a
    /// no-op.
    pub async fn close(&self) {
        if self.inner.state.send_replace(ConnectionState::Closed) == ConnectionState::Closed {
            return;
        }

        let deliveries = std::mem::take(
            &mut *self
                .inner
                .deliveries
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for delivery in deliveries {
            if let Err(e) = delivery.await {
                tracing::error!("listener delivery task failed: {}", e);
            }
        }
        tracing::debug!("connection closed");
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.inner.state.send_replace(ConnectionState::Closed);
    }
}

/// A single-threaded context for creating consumers.
pub struct Session {
    inner: Arc<ConnectionInner>,
}

impl Session {
    pub fn create_consumer(&self, queue: &Queue) -> Result<Consumer, ReceiverError> {
        self.inner.ensure_open()?;
        Ok(Consumer {
            inner: self.inner.clone(),
            queue: queue.clone(),
        })
    }
}

/// Receives messages from one queue, either by blocking receive or through a listener.
pub struct Consumer {
    inner: Arc<ConnectionInner>,
    queue: Queue,
}

impl Consumer {
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Waits for the next message, giving up once `timeout` has passed.
    ///
    /// Issues bounded long polls until a message arrives or the deadline
    /// passes. `Ok(None)` means the timeout elapsed with no message. SQS
    /// long polls are whole seconds, so the last poll is rounded up and a
    /// message arriving up to one second after `timeout` can still be
    /// returned.
    pub async fn receive(&self, timeout: Duration) -> Result<Option<Message>, ReceiverError> {
        let deadline = Instant::now() + timeout;
        let max_poll = self.inner.config.max_poll();
        let mut state = self.inner.state.subscribe();

        loop {
            self.inner.ensure_open()?;

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }

            tokio::select! {
                received = self.inner.transport.receive(&self.queue.url, remaining.min(max_poll)) => {
                    if let Some(message) = received? {
                        return Ok(Some(message));
                    }
                }
                _ = state.wait_for(|s| *s == ConnectionState::Closed) => {
                    return Err(ReceiverError::ConnectionClosed);
                }
            }
        }
    }

    pub async fn acknowledge(&self, message: &Message) -> Result<(), ReceiverError> {
        self.acknowledger().acknowledge(message).await
    }

    pub fn acknowledger(&self) -> Acknowledger {
        Acknowledger {
            inner: self.inner.clone(),
            queue_url: self.queue.url.clone(),
        }
    }

    /// Hands this consumer to a background task that delivers every received
    /// message to `listener`, one at a time, once the connection is started.
    pub fn set_message_listener(self, listener: impl MessageListener) -> Result<(), ReceiverError> {
        self.inner.ensure_open()?;
        let inner = self.inner.clone();
        let delivery = tokio::spawn(functions::run_delivery(self, listener));
        inner
            .deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(delivery);
        Ok(())
    }
}

/// Acknowledges messages received by one consumer.
#[derive(Clone)]
pub struct Acknowledger {
    inner: Arc<ConnectionInner>,
    queue_url: String,
}

impl Acknowledger {
    pub async fn acknowledge(&self, message: &Message) -> Result<(), ReceiverError> {
        self.inner.ensure_open()?;
        self.inner.transport.acknowledge(&self.queue_url, message).await
    }
}
