//! Error types
//!
//! One error enum for the whole core. Each startup phase maps to its own
//! variant so a failed `start()` tells configuration, network and model
//! problems apart.

use intentlink_transport::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntentLinkError {
    /// Malformed application model; raised before any network activity.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Registration of app '{app_id}' failed: {message}")]
    Registration { app_id: String, message: String },

    #[error("Intent '{handler}' failed: {message}")]
    Invocation { handler: String, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// `stop()` was called while the session was still starting.
    #[error("Session stopped: {0}")]
    Stopped(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type IntentLinkResult<T> = Result<T, IntentLinkError>;

impl IntentLinkError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn registration(app_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Registration {
            app_id: app_id.into(),
            message: msg.into(),
        }
    }

    /// Startup phase this error belongs to, used in failure logs.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::Precondition(_) => "validate",
            Self::Connection(_) => "connect",
            Self::Registration { .. } => "register",
            Self::Config(_) => "config",
            Self::Stopped(_) => "stop",
            Self::Invocation { .. } => "invoke",
            Self::Protocol(_) | Self::Timeout(_) | Self::Serialization(_) | Self::Io(_) => "rpc",
        }
    }
}

impl From<TransportError> for IntentLinkError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::ConnectionFailed(msg) => Self::Connection(msg),
            TransportError::Timeout(msg) => Self::Connection(format!("timed out: {}", msg)),
        }
    }
}
