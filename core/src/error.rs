//! Error types for the sync daemon client.
//!
//! # Design
//! Three failure families stay distinguishable: `ConfigError` (the config
//! file could not be turned into an endpoint), transport failures inside
//! `ApiError` (the daemon could not be reached or sent nothing back), and
//! `DaemonError` (the daemon answered, but reported an operation failure).
//!
//! Daemon failures are returned as ordinary JSON by every operation. The
//! daemon encodes status per operation (`{"error": 0}` on success), so only
//! callers that opt in through `check_daemon_status` get an `Err` for them.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Failures while loading a `ClientConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be opened or read.
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("config {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The JSON parsed but the listen address is absent, empty, or not a string.
    #[error("config {} is missing `{field}`", .path.display())]
    MissingField { path: PathBuf, field: &'static str },

    /// The listen address is not `host:port`.
    #[error("invalid listen address `{address}`: {reason}")]
    InvalidAddress { address: String, reason: &'static str },
}

/// Errors returned by API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be completed: refused, unresolvable, timed out.
    #[error("transport error: {0}")]
    Transport(String),

    /// The daemon answered with no body.
    #[error("empty response from daemon")]
    EmptyResponse,

    /// The daemon returned a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The body was not JSON, or did not match the requested typed view.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The daemon reported an operation failure (see `check_daemon_status`).
    #[error(transparent)]
    Daemon(#[from] DaemonError),
}

impl ApiError {
    /// True when the daemon is unreachable or silent, as opposed to
    /// answering with something unexpected.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::EmptyResponse)
    }
}

/// An operation-level failure reported inside a well-formed response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("daemon error{}", describe(.code, .message))]
pub struct DaemonError {
    pub code: Option<i64>,
    pub message: Option<String>,
}

fn describe(code: &Option<i64>, message: &Option<String>) -> String {
    let code = code.map(|c| format!(" {c}")).unwrap_or_default();
    let message = message.as_ref().map(|m| format!(": {m}")).unwrap_or_default();
    format!("{code}{message}")
}

impl DaemonError {
    /// Extract a failure from a response object.
    ///
    /// A numeric `error` field other than 0, or a string `error` field,
    /// counts as a failure. Arrays, scalars and `{"error": 0}` do not.
    pub fn from_response(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let message = object
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        match object.get("error")? {
            Value::Number(n) => match n.as_i64() {
                Some(0) => None,
                code => Some(DaemonError { code, message }),
            },
            Value::String(s) => Some(DaemonError {
                code: None,
                message: message.or_else(|| Some(s.clone())),
            }),
            _ => None,
        }
    }
}

/// Turn a daemon-reported failure into `Err(ApiError::Daemon)`.
///
/// Responses without a failure marker pass through untouched.
pub fn check_daemon_status(value: Value) -> Result<Value, ApiError> {
    match DaemonError::from_response(&value) {
        Some(err) => Err(err.into()),
        None => Ok(value),
    }
}
