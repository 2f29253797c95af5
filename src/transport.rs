//! The queue boundary: everything the receivers need from SQS, behind a trait
//! so the connection chain can be driven by other backends.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::QueueAttributeName;

use crate::errors::ReceiverError;
use crate::message::Message;

/// Longest long poll SQS accepts for a single `ReceiveMessage` call.
pub const MAX_WAIT_TIME_SECONDS: u64 = 20;

/// Operations the connection chain delegates to the underlying queue service.
#[async_trait]
pub trait QueueTransport: Send + Sync + 'static {
    /// Looks up the queue, creating it when absent, and returns its URL.
    async fn ensure_queue(&self, queue_name: &str) -> Result<String, ReceiverError>;

    /// Waits up to `wait` for one message. `Ok(None)` means the wait elapsed.
    async fn receive(&self, queue_url: &str, wait: Duration)
    -> Result<Option<Message>, ReceiverError>;

    /// Tells the queue the message was processed and must not be redelivered.
    async fn acknowledge(&self, queue_url: &str, message: &Message) -> Result<(), ReceiverError>;
}

/// [`QueueTransport`] backed by `aws-sdk-sqs`.
#[derive(Clone)]
pub struct SqsTransport {
    sqs_client: aws_sdk_sqs::Client,
    visibility_timeout: Option<i32>,
}

impl SqsTransport {
    pub fn new(sqs_client: aws_sdk_sqs::Client) -> Self {
        SqsTransport {
            sqs_client,
            visibility_timeout: None,
        }
    }

    /// Overrides the queue's visibility timeout for messages received here.
    pub fn with_visibility_timeout(mut self, seconds: Option<i32>) -> Self {
        self.visibility_timeout = seconds;
        self
    }
}

/// Whole seconds to long poll for, rounded up and capped at the SQS maximum.
pub(crate) fn wait_time_seconds(wait: Duration) -> i32 {
    let mut secs = wait.as_secs();
    if wait.subsec_nanos() > 0 {
        secs += 1;
    }
    secs.min(MAX_WAIT_TIME_SECONDS) as i32
}

#[async_trait]
impl QueueTransport for SqsTransport {
    async fn ensure_queue(&self, queue_name: &str) -> Result<String, ReceiverError> {
        let setup_error = |reason: String| ReceiverError::QueueSetupError {
            queue: queue_name.to_string(),
            reason,
        };

        match self
            .sqs_client
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await
        {
            Ok(output) => {
                return output
                    .queue_url()
                    .map(str::to_string)
                    .ok_or_else(|| setup_error("no queue url returned".to_string()));
            }
            Err(e) if e.as_service_error().is_some_and(|e| e.is_queue_does_not_exist()) => {
                tracing::info!(queue = queue_name, "queue does not exist, creating it");
            }
            Err(e) => return Err(setup_error(DisplayErrorContext(&e).to_string())),
        }

        let mut create = self.sqs_client.create_queue().queue_name(queue_name);
        if queue_name.ends_with(".fifo") {
            create = create.attributes(QueueAttributeName::FifoQueue, "true");
        }

        let output = create
            .send()
            .await
            .map_err(|e| setup_error(DisplayErrorContext(&e).to_string()))?;

        output
            .queue_url()
            .map(str::to_string)
            .ok_or_else(|| setup_error("no queue url returned".to_string()))
    }

    async fn receive(
        &self,
        queue_url: &str,
        wait: Duration,
    ) -> Result<Option<Message>, ReceiverError> {
        let output = self
            .sqs_client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(1)
            .wait_time_seconds(wait_time_seconds(wait))
            .set_visibility_timeout(self.visibility_timeout)
            .send()
            .await
            .map_err(|e| ReceiverError::ReceiveError(DisplayErrorContext(&e).to_string()))?;

        Ok(output.messages.unwrap_or_default().into_iter().next().map(Message::from))
    }

    async fn acknowledge(&self, queue_url: &str, message: &Message) -> Result<(), ReceiverError> {
        let Some(receipt_handle) = message.receipt_handle.as_deref() else {
            return Err(ReceiverError::AcknowledgeError {
                message_id: message.message_id.clone(),
                reason: "message has no receipt handle".to_string(),
            });
        };

        self.sqs_client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| ReceiverError::AcknowledgeError {
                message_id: message.message_id.clone(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }
}
