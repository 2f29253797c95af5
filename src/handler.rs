//! Message handlers: inspect and process one payload, never acknowledge.
//!
//! Acknowledgment belongs to the caller and happens only after
//! [`MessageHandler::handle`] returns `Ok`.

use std::future::Future;

use async_trait::async_trait;

use crate::errors::{GenericError, ReceiverError};
use crate::message::Message;

#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    async fn handle(&self, message: &Message) -> Result<(), ReceiverError>;
}

/// Prints each message's id and body. A message with no body is a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintingHandler;

#[async_trait]
impl MessageHandler for PrintingHandler {
    async fn handle(&self, message: &Message) -> Result<(), ReceiverError> {
        let Some(body) = message.body.as_deref() else {
            return Err(GenericError::new(format!(
                "message {} has no body",
                message.message_id
            ))
            .into());
        };

        tracing::info!(message_id = %message.message_id, "Got message");
        println!("\tContent: {}", body);
        Ok(())
    }
}

/// Wraps a user function and a shared resource as a [`MessageHandler`].
///
/// The function receives a clone of the message and of the shared resource
/// on every call.
///
/// # Type Parameters
///
/// * `RFn` - The message handler function type
/// * `TShared` - The type of shared resources passed to the handler
pub struct HandlerFn<RFn, TShared> {
    rv_fn: RFn,
    shared_resources: TShared,
}

/// Creates a [`HandlerFn`].
///
/// ```rust
/// use rs_sqs_silence_receiver::{errors::ReceiverError, handler::handler_fn, message::Message};
///
/// let handler = handler_fn(
///     |message: Message, prefix: String| async move {
///         println!("{}{:?}", prefix, message.body);
///         Ok::<(), ReceiverError>(())
///     },
///     "received: ".to_string(),
/// );
/// ```
pub fn handler_fn<RFn, Fut, TShared>(rv_fn: RFn, shared_resources: TShared) -> HandlerFn<RFn, TShared>
where
    RFn: Fn(Message, TShared) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ReceiverError>> + Send + 'static,
    TShared: Send + Sync + Clone + 'static,
{
    HandlerFn {
        rv_fn,
        shared_resources,
    }
}

#[async_trait]
impl<RFn, Fut, TShared> MessageHandler for HandlerFn<RFn, TShared>
where
    RFn: Fn(Message, TShared) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ReceiverError>> + Send + 'static,
    TShared: Send + Sync + Clone + 'static,
{
    async fn handle(&self, message: &Message) -> Result<(), ReceiverError> {
        (self.rv_fn)(message.clone(), self.shared_resources.clone()).await
    }
}
