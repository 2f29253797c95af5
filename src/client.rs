use aws_config::{BehaviorVersion, Region};
use aws_sdk_sqs::config::Credentials;
use serde::Deserialize;

/// Everything needed to reach an SQS endpoint.
///
/// Both binaries resolve one of these before connecting: the listener
/// receiver from command-line flags, the wiring receiver from the
/// `connection` binding of its wiring document.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConnectionSettings {
    /// AWS region, e.g. `us-east-1`. Falls back to the provider chain when absent.
    #[serde(default)]
    pub region: Option<String>,

    /// Endpoint override for local SQS emulators such as ElasticMQ or LocalStack.
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Static credentials. When absent the default AWS provider chain is used.
    #[serde(default)]
    pub credentials: Option<StaticCredentials>,
}

/// Explicit access keys for the SQS client.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

/// Creates an AWS SQS client from resolved connection settings.
///
/// Anything the settings leave out is loaded the usual way from the
/// environment:
/// - `AWS_ACCESS_KEY_ID`
/// - `AWS_SECRET_ACCESS_KEY`
/// - `AWS_REGION`
/// - `AWS_PROFILE`
///
/// # Example
///
/// ```rust,no_run
/// use rs_sqs_silence_receiver::client::{ConnectionSettings, create_sqs_client};
///
/// #[tokio::main]
/// async fn main() {
///     let settings = ConnectionSettings {
///         region: Some("us-east-1".to_string()),
///         ..Default::default()
///     };
///     let client = create_sqs_client(&settings).await;
///     // Use the client...
/// }
/// ```
pub async fn create_sqs_client(settings: &ConnectionSettings) -> aws_sdk_sqs::Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &settings.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let Some(endpoint) = &settings.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    if let Some(creds) = &settings.credentials {
        loader = loader.credentials_provider(Credentials::new(
            &creds.access_key_id,
            &creds.secret_access_key,
            creds.session_token.clone(),
            None,
            "static",
        ));
    }

    let config = loader.load().await;
    aws_sdk_sqs::Client::new(&config)
}
