use std::process::ExitCode;

use rs_sqs_silence_receiver::consume::{ConsumeReport, receive_until_silence};
use rs_sqs_silence_receiver::errors::ReceiverError;
use rs_sqs_silence_receiver::handler::PrintingHandler;
use rs_sqs_silence_receiver::logging;
use rs_sqs_silence_receiver::receiver::{Connection, ReceiverConfig};
use rs_sqs_silence_receiver::wiring::{StartupError, WiringDocument};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let document = match WiringDocument::from_args(&args) {
        Ok(document) => document,
        Err(e) => return startup_failure(e),
    };

    logging::init();

    let bindings = match document.resolve() {
        Ok(bindings) => bindings,
        Err(e) => {
            eprintln!("In {}:", document.path().display());
            return startup_failure(e);
        }
    };

    let mut config = ReceiverConfig::default();
    if let Some(window) = bindings.silence_window {
        config.silence_window = window;
    }

    let connection = Connection::connect(&bindings.connection, config).await;
    let result = receive_messages(&connection, &bindings.queue_name).await;
    match &result {
        Ok(report) => tracing::info!(
            acknowledged = report.acknowledged,
            failed = report.failed,
            "receive loop finished"
        ),
        Err(e) => tracing::error!("{}", e),
    }

    connection.close().await;
    println!("Connection closed");
    ExitCode::from(run_exit_code(&result))
}

/// Exit status once the connection is up. Usage and wiring problems use 1 to 3.
const TRANSPORT_FAILURE: u8 = 4;

/// `0` after silence or a failed receive, `4` when the queue could not be set up.
fn run_exit_code(result: &Result<ConsumeReport, ReceiverError>) -> u8 {
    match result {
        Ok(_) => 0,
        // A failed receive ends the run but is not a startup failure.
        Err(ReceiverError::ReceiveError(_)) => 0,
        Err(_) => TRANSPORT_FAILURE,
    }
}

async fn receive_messages(
    connection: &Connection,
    queue_name: &str,
) -> Result<ConsumeReport, ReceiverError> {
    let queue = connection.ensure_queue_exists(queue_name).await?;
    let consumer = connection.create_session()?.create_consumer(&queue)?;
    receive_until_silence(&consumer, &PrintingHandler, connection.config().silence_window).await
}

fn startup_failure(e: StartupError) -> ExitCode {
    eprintln!("{}", e);
    ExitCode::from(e.exit_code())
}
