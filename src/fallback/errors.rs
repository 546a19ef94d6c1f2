// Error types for the fallback core

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

use super::classify::classify_message;
use super::traits::CapabilityFamily;

/// Normalized classification of a single backend failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Network/timeout/throttling; a different backend may well succeed
    Transient,
    /// The backend cannot serve this operation or these arguments at all
    NotSupported,
    /// Credentials, cookies or API quota are missing
    AuthRequired,
    /// The caller's token fired; never derived from backend output
    Cancelled,
    /// Unclassified fault, original message preserved
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::NotSupported => "not_supported",
            Self::AuthRequired => "auth_required",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure returned by a backend capability call.
///
/// Backends either pick a typed variant or hand over the raw message via
/// `From<String>` and let [`BackendError::kind`] classify it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("transient failure: {0}")]
    Transient(String),

    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("authentication required: {0}")]
    AuthRequired(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl BackendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transient(_) => ErrorKind::Transient,
            Self::NotSupported(_) => ErrorKind::NotSupported,
            Self::AuthRequired(_) => ErrorKind::AuthRequired,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Other(message) => classify_message(message),
        }
    }

    /// The backend's own message, without the kind prefix
    pub fn message(&self) -> String {
        match self {
            Self::Transient(msg)
            | Self::NotSupported(msg)
            | Self::AuthRequired(msg)
            | Self::Other(msg) => msg.clone(),
            Self::Cancelled => "operation cancelled".to_string(),
        }
    }
}

impl From<String> for BackendError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for BackendError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<io::Error> for BackendError {
    fn from(err: io::Error) -> Self {
        let message = err.to_string();
        match err.kind() {
            io::ErrorKind::TimedOut
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock => Self::Transient(message),
            // Missing binary or module, like a yt-dlp that is not installed
            io::ErrorKind::NotFound | io::ErrorKind::Unsupported => Self::NotSupported(message),
            _ => Self::Other(message),
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(format!("invalid JSON from backend: {}", err))
    }
}

/// Registry setup fault. Always a programming or configuration error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("operation name must not be empty")]
    EmptyOperationName,

    #[error("operation name '{0}' is malformed (only lowercase alphanumerics and underscores, at most 64 characters)")]
    InvalidOperationName(String),

    #[error("backend name must not be empty")]
    EmptyBackendName,

    #[error("backend name '{0}' is malformed (only lowercase alphanumerics, '_', '-' and '.', at most 64 characters)")]
    InvalidBackendName(String),

    #[error("backend '{backend}' is already registered for operation '{operation}'")]
    DuplicateBackend { operation: String, backend: String },

    #[error("position {position} is out of range for operation '{operation}' with {len} backend(s)")]
    PositionOutOfRange {
        operation: String,
        position: usize,
        len: usize,
    },

    #[error("operation '{operation}' is registered as {registered}, not {requested}")]
    CapabilityMismatch {
        operation: String,
        registered: CapabilityFamily,
        requested: CapabilityFamily,
    },

    #[error("configuration names operation '{0}', which has no registered backends")]
    UnknownOperation(String),

    #[error("backend '{backend}' is not registered for operation '{operation}'")]
    UnknownBackend { operation: String, backend: String },

    #[error("operation '{0}' would be left without any backend")]
    EmptyChain(String),

    #[error("invalid fallback configuration: {0}")]
    InvalidConfig(String),
}

/// Lookup of an operation nobody registered a backend for
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no backend is registered for operation '{0}'")]
pub struct UnknownOperationError(pub String);

/// Errors `Orchestrator::invoke` returns instead of an envelope
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    UnknownOperation(#[from] UnknownOperationError),
}

/// Accessor called on the wrong side of a `ResultEnvelope`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("result envelope holds a {actual}, not a {requested}")]
pub struct InvalidStateError {
    pub requested: &'static str,
    pub actual: &'static str,
}
