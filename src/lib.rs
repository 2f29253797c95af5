//! # SQS Silence Receiver
//!
//! AWS SQS consumers that keep running while messages keep arriving and shut
//! down cleanly after a window of silence.
//!
//! ## Features
//!
//! - Connection → session → consumer chain over a pluggable [`transport::QueueTransport`]
//! - Listener delivery on a background task, supervised by a lock-free
//!   [`silence::SilenceDeadline`]
//! - Blocking receive-with-timeout loop ([`consume::receive_until_silence`])
//! - Acknowledgment only after a handler succeeds; failures are left for redelivery
//! - Queues are created on first use
//! - YAML wiring documents with typed binding lookup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use rs_sqs_silence_receiver::{
//!     client::ConnectionSettings,
//!     handler::PrintingHandler,
//!     receiver::{Connection, ReceiverConfig},
//!     silence::{SilenceDeadline, SilenceListener},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReceiverConfig::default();
//!     let window = config.silence_window;
//!     let connection = Connection::connect(&ConnectionSettings::default(), config).await;
//!
//!     let queue = connection.ensure_queue_exists("example-queue").await?;
//!     let consumer = connection.create_session()?.create_consumer(&queue)?;
//!
//!     let deadline = Arc::new(SilenceDeadline::new());
//!     consumer.set_message_listener(SilenceListener::new(PrintingHandler, deadline.clone()))?;
//!     connection.start()?;
//!
//!     deadline.wait_for_silence(window).await;
//!     connection.close().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod consume;
pub mod errors;
pub mod handler;
pub mod logging;
pub mod message;
pub mod receiver;
pub mod silence;
pub mod transport;
pub mod wiring;
