/// One message received from a queue.
///
/// Owned by the consume loop for a single handling cycle and consumed by
/// acknowledgment once the handler succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message_id: String,
    pub body: Option<String>,
    pub receipt_handle: Option<String>,
}

impl Message {
    pub fn new(message_id: impl Into<String>, body: impl Into<String>) -> Self {
        Message {
            message_id: message_id.into(),
            body: Some(body.into()),
            receipt_handle: None,
        }
    }

    pub fn with_receipt_handle(mut self, receipt_handle: impl Into<String>) -> Self {
        self.receipt_handle = Some(receipt_handle.into());
        self
    }
}

impl From<aws_sdk_sqs::types::Message> for Message {
    fn from(message: aws_sdk_sqs::types::Message) -> Self {
        Message {
            message_id: message.message_id.unwrap_or_else(|| "unknown".to_string()),
            body: message.body,
            receipt_handle: message.receipt_handle,
        }
    }
}
