//! Declarative wiring documents for the polling receiver.
//!
//! A wiring document is a YAML map of named bindings:
//!
//! ```yaml
//! connection:
//!   region: us-east-1
//!   endpoint_url: http://localhost:9324   # optional
//!   credentials:                          # optional
//!     access_key_id: AKIA...
//!     secret_access_key: ...
//! QueueName: example-queue
//! SilenceWindowSeconds: 60                # optional
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::client::ConnectionSettings;

pub const CONNECTION_BINDING: &str = "connection";
pub const QUEUE_NAME_BINDING: &str = "QueueName";
pub const SILENCE_WINDOW_BINDING: &str = "SilenceWindowSeconds";

const EXTENSIONS: [&str; 2] = [".yaml", ".yml"];

/// Result of a failed typed lookup.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("no binding named '{name}'")]
    Missing { name: String },

    #[error("binding '{name}' is not a {expected}: {reason}")]
    WrongType {
        name: String,
        expected: &'static str,
        reason: String,
    },
}

/// Failures before any connection is made. Each maps to a distinct exit code.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Usage: {program} <wiring document.yaml>")]
    Usage { program: String },

    #[error("File {} doesn't exist or isn't readable.", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File {} is not a valid wiring document: {}", path.display(), source)]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Can't find the connection to use: {0}")]
    Connection(#[source] BindingError),

    #[error("Can't find the name of the queue to use: {0}")]
    QueueName(#[source] BindingError),

    #[error("Can't read the silence window: {0}")]
    SilenceWindow(#[source] BindingError),
}

impl StartupError {
    /// `1` bad usage, `2` unreadable document, `3` missing or mistyped binding.
    pub fn exit_code(&self) -> u8 {
        match self {
            StartupError::Usage { .. } => 1,
            StartupError::Unreadable { .. } | StartupError::Malformed { .. } => 2,
            StartupError::Connection(_)
            | StartupError::QueueName(_)
            | StartupError::SilenceWindow(_) => 3,
        }
    }
}

/// Bindings the polling receiver needs, resolved and typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WiringBindings {
    pub connection: ConnectionSettings,
    pub queue_name: String,
    pub silence_window: Option<Duration>,
}

/// A parsed wiring document.
#[derive(Debug, Clone)]
pub struct WiringDocument {
    path: PathBuf,
    bindings: Mapping,
}

impl WiringDocument {
    /// Validates the command line (`program`, `document`) and loads the document.
    pub fn from_args(args: &[String]) -> Result<Self, StartupError> {
        let program = args
            .first()
            .map(String::as_str)
            .unwrap_or("wiring-message-receiver");

        match args {
            [_, path] if EXTENSIONS.iter().any(|ext| path.ends_with(*ext)) => Self::load(path),
            _ => Err(StartupError::Usage {
                program: program.to_string(),
            }),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| StartupError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    pub fn parse(path: impl AsRef<Path>, contents: &str) -> Result<Self, StartupError> {
        let path = path.as_ref().to_path_buf();
        match serde_yaml::from_str::<Mapping>(contents) {
            Ok(bindings) => Ok(WiringDocument { path, bindings }),
            Err(source) => Err(StartupError::Malformed { path, source }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Looks up a named binding and converts it to `T`.
    ///
    /// An explicit `null` counts as missing.
    pub fn lookup<T: DeserializeOwned>(&self, name: &str) -> Result<T, BindingError> {
        self.lookup_optional(name)?.ok_or_else(|| BindingError::Missing {
            name: name.to_string(),
        })
    }

    pub fn lookup_optional<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, BindingError> {
        let value = match self.bindings.get(name) {
            None | Some(Value::Null) => return Ok(None),
            Some(value) => value.clone(),
        };

        serde_yaml::from_value(value)
            .map(Some)
            .map_err(|e| BindingError::WrongType {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
                reason: e.to_string(),
            })
    }

    /// Resolves the connection, then the queue name, then the optional window.
    pub fn resolve(&self) -> Result<WiringBindings, StartupError> {
        let connection = self
            .lookup::<ConnectionSettings>(CONNECTION_BINDING)
            .map_err(StartupError::Connection)?;
        let queue_name = self
            .lookup::<String>(QUEUE_NAME_BINDING)
            .map_err(StartupError::QueueName)?;
        let silence_window = self
            .lookup_optional::<u64>(SILENCE_WINDOW_BINDING)
            .map_err(StartupError::SilenceWindow)?
            .map(Duration::from_secs);

        Ok(WiringBindings {
            connection,
            queue_name,
            silence_window,
        })
    }
}
