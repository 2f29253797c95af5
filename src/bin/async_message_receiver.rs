use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use rs_sqs_silence_receiver::client::{ConnectionSettings, StaticCredentials};
use rs_sqs_silence_receiver::consume::humanize;
use rs_sqs_silence_receiver::errors::ReceiverError;
use rs_sqs_silence_receiver::handler::PrintingHandler;
use rs_sqs_silence_receiver::logging;
use rs_sqs_silence_receiver::receiver::{Connection, ReceiverConfig};
use rs_sqs_silence_receiver::silence::{SilenceDeadline, SilenceListener};

/// Receives messages through a listener until the queue has been silent for a while.
#[derive(Parser, Debug)]
#[command(name = "async-message-receiver")]
struct Args {
    /// AWS region; defaults to the provider chain (AWS_REGION, profile, ...)
    #[arg(long)]
    region: Option<String>,

    /// Queue to consume from; created if it does not exist
    #[arg(long, env = "SQS_QUEUE_NAME", default_value = "SQSJMSClientExampleQueue")]
    queue_name: String,

    #[arg(long, requires = "secret_access_key")]
    access_key_id: Option<String>,

    #[arg(long, requires = "access_key_id")]
    secret_access_key: Option<String>,

    #[arg(long, requires = "access_key_id")]
    session_token: Option<String>,

    /// Endpoint override, e.g. a local SQS emulator
    #[arg(long, env = "SQS_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Seconds without a message before shutting down
    #[arg(long, default_value_t = 60)]
    silence_window_secs: u64,

    /// Visibility timeout for received messages, in seconds
    #[arg(long)]
    visibility_timeout: Option<i32>,
}

impl Args {
    fn connection_settings(&self) -> ConnectionSettings {
        let credentials = match (&self.access_key_id, &self.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id: access_key_id.clone(),
                secret_access_key: secret_access_key.clone(),
                session_token: self.session_token.clone(),
            }),
            _ => None,
        };

        ConnectionSettings {
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
            credentials,
        }
    }

    fn receiver_config(&self) -> ReceiverConfig {
        ReceiverConfig {
            visibility_timeout: self.visibility_timeout,
            ..Default::default()
        }
        .with_silence_window(Duration::from_secs(self.silence_window_secs))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init();

    let config = args.receiver_config();
    let window = config.silence_window;
    let connection = Connection::connect(&args.connection_settings(), config).await;

    let result = listen_until_silence(&connection, &args.queue_name, window).await;

    connection.close().await;
    println!("Connection closed");

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn listen_until_silence(
    connection: &Connection,
    queue_name: &str,
    window: Duration,
) -> Result<(), ReceiverError> {
    let queue = connection.ensure_queue_exists(queue_name).await?;
    let consumer = connection.create_session()?.create_consumer(&queue)?;

    let deadline = Arc::new(SilenceDeadline::new());
    consumer.set_message_listener(SilenceListener::new(PrintingHandler, deadline.clone()))?;

    // No messages are delivered until the connection is started.
    connection.start()?;

    deadline.wait_for_silence(window).await;
    println!("Returning after {} of silence", humanize(window));
    Ok(())
}
