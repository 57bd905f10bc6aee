//! Error types for the form-submission bridge

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which side of the exchange a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request never produced an HTTP response
    Transport,
    /// The server answered, but not with an image payload
    Application,
    /// Something failed on our side before or after the exchange
    Local,
}

/// Errors that can occur while submitting the form
#[derive(Error, Debug)]
pub enum Error {
    /// Connection refused, DNS failure, timeout and friends
    #[error("Network error: {0}")]
    Transport(String),

    /// The server responded with a non-OK status
    #[error("Request failed with status {status}")]
    Status { status: u16, body: String },

    /// The response body could not be read as text
    #[error("Failed to read response body: {0}")]
    Body(String),

    /// The request record could not be serialized
    #[error("Failed to encode request: {0}")]
    Encode(String),

    /// The returned payload is not valid base64
    #[error("Invalid image payload: {0}")]
    Payload(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Classify the error as a transport, application or local failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Transport(_) => FailureKind::Transport,
            Error::Status { .. } | Error::Body(_) | Error::Payload(_) => FailureKind::Application,
            Error::Encode(_) | Error::Config(_) | Error::Other(_) => FailureKind::Local,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Encode(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Payload(err.to_string())
    }
}
