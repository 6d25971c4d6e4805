//! Client error types.

use std::fmt;

use dayboard_core::CoreError;
use dayboard_providers::FetchError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// IO error.
    Io(std::io::Error),
    /// The relay could not be reached or answered with garbage.
    Relay(String),
    /// The relay answered but reported a failure.
    Rejected(String),
    /// Direct calendar fetch failed.
    Fetch(FetchError),
    /// A local collection document could not be used.
    Store(String),
    /// Bad user input (unknown collection, unknown id).
    Input(String),
    /// The embedded relay failed.
    Server(dayboard_server::ServerError),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Relay(msg) => write!(f, "relay error: {}", msg),
            Self::Rejected(msg) => write!(f, "{}", msg),
            Self::Fetch(err) => write!(f, "calendar fetch failed: {}", err),
            Self::Store(msg) => write!(f, "store error: {}", msg),
            Self::Input(msg) => write!(f, "{}", msg),
            Self::Server(err) => write!(f, "server error: {}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Fetch(err) => Some(err),
            Self::Server(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<FetchError> for ClientError {
    fn from(err: FetchError) -> Self {
        Self::Fetch(err)
    }
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        Self::Input(err.to_string())
    }
}

impl From<dayboard_server::ServerError> for ClientError {
    fn from(err: dayboard_server::ServerError) -> Self {
        Self::Server(err)
    }
}
