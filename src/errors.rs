//! Client Error Hierarchy
//!
//! Every failure the client can produce falls in one of these buckets:
//! transport, timeout, protocol, decode, lifecycle or configuration.
//! The watch engine keys its retry policy off the bucket, so new failure
//! sources must map onto an existing variant rather than invent a new one.

use config::ConfigError;

use crate::constants::MAX_ERROR_BODY_LEN;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No response was received (DNS, connect, reset)
    #[error("Transport error: {source}")]
    Transport {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Request was sent on an established connection but no response
    /// arrived in time. Benign for blocking queries.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Response received, but its status code is not allowed for the operation
    #[error("Status message: '{status} {message}'. Body: '{body}'")]
    Protocol { status: u16, message: String, body: String },

    /// Status allowed, body could not be parsed
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    /// API misuse of a watch lifecycle
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Caller supplied arguments that cannot form a request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("Watch already started")]
    AlreadyStarted,

    #[error("An unstarted watch")]
    NotStarted,

    #[error("Watch already stopped")]
    AlreadyStopped,
}

impl Error {
    pub(crate) fn protocol(
        status: u16,
        message: impl Into<String>,
        body: &[u8],
    ) -> Self {
        let end = body.len().min(MAX_ERROR_BODY_LEN);
        Error::Protocol {
            status,
            message: message.into(),
            body: String::from_utf8_lossy(&body[..end]).into_owned(),
        }
    }

    pub(crate) fn transport(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Transport {
            source: Box::new(source),
        }
    }

    /// A timed-out blocking query is the normal "nothing changed" outcome.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }

    /// Whether a watch should keep polling after this error.
    ///
    /// Lifecycle, configuration and request-shape errors never heal by
    /// themselves.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. } | Error::Timeout(_) | Error::Protocol { .. } | Error::Decode(_)
        )
    }

    /// HTTP status carried by a protocol error
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // An elapsed connect timeout is also flagged as a timeout, but no
        // connection was ever made
        if err.is_connect() {
            return Error::transport(err);
        }
        if err.is_timeout() {
            return Error::Timeout(err.to_string());
        }
        if err.is_decode() {
            return Error::Decode(err.to_string());
        }
        if err.is_builder() {
            return Error::InvalidRequest(err.to_string());
        }
        Error::transport(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}
