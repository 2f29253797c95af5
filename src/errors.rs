use thiserror::Error;

/// Error types for SQS silence receiver operations.
///
/// Handler failures (`GenericError`) are recovered by the consume loops.
/// Receive failures end the current run; everything else is reported to the
/// caller of the failing operation.
#[derive(Debug, Error)]
pub enum ReceiverError {
    /// The queue could not be looked up or created.
    #[error("failed to set up queue {queue}: {reason}")]
    QueueSetupError { queue: String, reason: String },

    /// The transport failed while waiting for the next message.
    #[error("error receiving from SQS: {0}")]
    ReceiveError(String),

    /// The queue refused the acknowledgment (receipt handle expired, etc).
    #[error("failed to acknowledge message {message_id}: {reason}")]
    AcknowledgeError { message_id: String, reason: String },

    #[error("connection is closed")]
    ConnectionClosed,

    #[error("{0}")]
    GenericError(#[from] GenericError),
}

/// Generic error type for handler failures.
#[derive(Debug, Error)]
pub struct GenericError(String);

impl GenericError {
    /// Creates a new `GenericError` with the provided message.
    pub fn new(message: String) -> Self {
        GenericError(message)
    }
}

impl std::fmt::Display for GenericError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for GenericError {
    fn from(s: String) -> Self {
        GenericError::new(s)
    }
}

impl From<&str> for GenericError {
    fn from(s: &str) -> Self {
        GenericError::new(s.to_string())
    }
}
