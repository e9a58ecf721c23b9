//! Error types for the fbrip-otp client
//!
//! `OtpError` is what every fetch operation returns on failure. It keeps four
//! distinct kinds so callers can decide what is worth retrying.
//! `ConfigError` only comes out of configuration loading and validation.

use reqwest::StatusCode;
use thiserror::Error;

/// Boxed cause carried by transport failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `OtpClient` operations
#[derive(Error, Debug)]
pub enum OtpError {
    /// The secret was missing, blank, or cannot be sent as a path segment
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Network-level failure or a non-success HTTP status
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        status: Option<StatusCode>,
        #[source]
        source: Option<BoxError>,
    },

    /// The response body was not the expected JSON document
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The caller cancelled the operation before it completed
    #[error("Operation cancelled")]
    Cancelled,
}

/// Discriminant of `OtpError`, for comparing outcomes without the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    Transport,
    Parse,
    Cancelled,
}

impl OtpError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn transport(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
            source: Some(source.into()),
        }
    }

    pub(crate) fn http_status(status: StatusCode) -> Self {
        Self::Transport {
            message: format!("Response status code does not indicate success: {}", status),
            status: Some(status),
            source: None,
        }
    }

    pub(crate) fn parse(message: impl Into<String>, source: Option<serde_json::Error>) -> Self {
        Self::Parse {
            message: message.into(),
            source,
        }
    }

    /// The kind of failure, without its details
    pub fn kind(&self) -> ErrorKind {
        match self {
            OtpError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            OtpError::Transport { .. } => ErrorKind::Transport,
            OtpError::Parse { .. } => ErrorKind::Parse,
            OtpError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// HTTP status of the response, if the failure came from one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            OtpError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether retrying the same call could plausibly succeed
    ///
    /// Only transport failures qualify: network errors and timeouts, plus
    /// 5xx and 429 responses. The client never retries on its own; this is a
    /// hint for callers.
    pub fn is_transient(&self) -> bool {
        match self {
            OtpError::Transport { status, .. } => {
                status.map_or(true, |s| s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS)
            }
            _ => false,
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid base URL: {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Configuration validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("HTTP client creation failed: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Result type alias for fetch operations
pub type Result<T> = std::result::Result<T, OtpError>;
