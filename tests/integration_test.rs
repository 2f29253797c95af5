//! Live tests against a real SQS queue (or an emulator via `SQS_ENDPOINT_URL`).
//!
//! Run with `cargo test -- --ignored` after setting `TEST_SQS_QUEUE_NAME`
//! and AWS credentials, e.g. in a `.env` file.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use rs_sqs_silence_receiver::client::{ConnectionSettings, create_sqs_client};
use rs_sqs_silence_receiver::consume::receive_until_silence;
use rs_sqs_silence_receiver::errors::ReceiverError;
use rs_sqs_silence_receiver::handler::{PrintingHandler, handler_fn};
use rs_sqs_silence_receiver::message::Message;
use rs_sqs_silence_receiver::receiver::{Connection, ReceiverConfig};
use rs_sqs_silence_receiver::silence::{SilenceDeadline, SilenceListener};
use tokio::sync::Mutex;
use tokio::time::timeout;

const WINDOW: Duration = Duration::from_secs(5);

fn live_settings() -> (ConnectionSettings, String) {
    dotenvy::dotenv().ok();

    let queue_name = env::var("TEST_SQS_QUEUE_NAME").expect("TEST_SQS_QUEUE_NAME must be set");
    let settings = ConnectionSettings {
        region: env::var("AWS_REGION").ok(),
        endpoint_url: env::var("SQS_ENDPOINT_URL").ok(),
        credentials: None,
    };
    (settings, queue_name)
}

async fn send(settings: &ConnectionSettings, queue_url: &str, body: &str) {
    let sqs_client = create_sqs_client(settings).await;
    sqs_client
        .send_message()
        .queue_url(queue_url)
        .message_body(body)
        .send()
        .await
        .expect("Failed to send test message");
}

#[tokio::test]
#[ignore = "needs a live SQS queue"]
async fn polling_receiver_drains_and_stops() {
    let (settings, queue_name) = live_settings();
    let config = ReceiverConfig::default().with_silence_window(WINDOW);
    let connection = Connection::connect(&settings, config).await;

    let queue = connection
        .ensure_queue_exists(&queue_name)
        .await
        .expect("Failed to create/get queue");
    send(&settings, &queue.url, "Polling test message").await;

    let consumer = connection.create_session().unwrap().create_consumer(&queue).unwrap();
    let report = timeout(
        Duration::from_secs(60),
        receive_until_silence(&consumer, &PrintingHandler, WINDOW),
    )
    .await
    .expect("receiver did not stop after silence")
    .expect("receive failed");

    assert!(report.acknowledged >= 1, "Should have processed at least 1 message");
    connection.close().await;
}

#[tokio::test]
#[ignore = "needs a live SQS queue"]
async fn listener_receiver_drains_and_stops() {
    let (settings, queue_name) = live_settings();
    let config = ReceiverConfig::default().with_silence_window(WINDOW);
    let connection = Connection::connect(&settings, config).await;

    let queue = connection
        .ensure_queue_exists(&queue_name)
        .await
        .expect("Failed to create/get queue");
    send(&settings, &queue.url, "Listener test message").await;

    let bodies = Arc::new(Mutex::new(Vec::<String>::new()));
    let handler = handler_fn(
        |message: Message, bodies: Arc<Mutex<Vec<String>>>| async move {
            bodies.lock().await.extend(message.body);
            Ok::<(), ReceiverError>(())
        },
        bodies.clone(),
    );

    let deadline = Arc::new(SilenceDeadline::new());
    let consumer = connection.create_session().unwrap().create_consumer(&queue).unwrap();
    consumer
        .set_message_listener(SilenceListener::new(handler, deadline.clone()))
        .unwrap();
    connection.start().unwrap();

    timeout(Duration::from_secs(60), deadline.wait_for_silence(WINDOW))
        .await
        .expect("listener did not go silent");
    connection.close().await;

    let bodies = bodies.lock().await;
    assert!(
        bodies.iter().any(|b| b == "Listener test message"),
        "Should have processed the test message, got {:?}",
        *bodies
    );
}
