//! Error types surfaced by a [`ServiceInvoker`](crate::ServiceInvoker).
//!
//! Key design decisions:
//! - Four variants only; every failure of a call lands in exactly one of them
//! - HTTP status codes stored directly (not parsed from strings)
//! - Transport failures are categorised from `reqwest::Error` flags, never from text
//! - All errors include ErrorLocation, captured through `#[track_caller]`

use crate::error::config::ConfigError;
use crate::error_translator::{ErrorClass, LocalError};

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use thiserror::Error as ThisError;

/// Coarse category of an [`InvokerError`], convenient for matching and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ClientConfiguration,
    Transport,
    RemoteRejection,
    Decoding,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ClientConfiguration => "CLIENT_CONFIGURATION",
            ErrorKind::Transport => "TRANSPORT",
            ErrorKind::RemoteRejection => "REMOTE_REJECTION",
            ErrorKind::Decoding => "DECODING",
        }
    }
}

#[derive(Debug, ThisError)]
pub enum InvokerError {
    /// Fatal at start-up: the client could not be assembled from its properties.
    #[error("Client Configuration Error: {message} {location}")]
    ClientConfiguration {
        message: String,
        location: ErrorLocation,
    },

    /// Network-level failure. Never retried by the invoker.
    #[error("Transport Error: {message} {location}")]
    Transport {
        message: String,
        is_timeout: bool,
        is_connection: bool,
        location: ErrorLocation,
    },

    /// The remote service answered with a non-2xx status.
    #[error("Remote Rejection: HTTP {status} - {message} {location}")]
    RemoteRejection {
        status: HttpStatusCode,
        remote_identifier: Option<String>,
        local: Option<LocalError>,
        message: String,
        body: String,
        location: ErrorLocation,
    },

    /// A payload did not match the expected shape.
    #[error("Decoding Error: {message} {location}")]
    Decoding {
        message: String,
        status: Option<HttpStatusCode>,
        location: ErrorLocation,
    },
}

impl InvokerError {
    #[track_caller]
    pub fn client_configuration(message: impl Into<String>) -> Self {
        InvokerError::ClientConfiguration {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn transport(message: impl Into<String>) -> Self {
        InvokerError::Transport {
            message: message.into(),
            is_timeout: false,
            is_connection: false,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn transport_timeout(message: impl Into<String>) -> Self {
        InvokerError::Transport {
            message: message.into(),
            is_timeout: true,
            is_connection: false,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn remote_rejection(
        status: HttpStatusCode,
        remote_identifier: Option<String>,
        local: Option<LocalError>,
        message: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        InvokerError::RemoteRejection {
            status,
            remote_identifier,
            local,
            message: message.into(),
            body: body.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn decoding(message: impl Into<String>, status: Option<HttpStatusCode>) -> Self {
        InvokerError::Decoding {
            message: message.into(),
            status,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create from reqwest error with proper categorization.
    ///
    /// Only used for request-time failures, so request builder errors are
    /// transport errors rather than configuration ones.
    #[track_caller]
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        // Check for specific error types BEFORE converting to string
        let is_timeout = error.is_timeout();
        let is_connection = error.is_connect();

        if error.is_decode() {
            return InvokerError::decoding(
                error.to_string(),
                error.status().map(|s| HttpStatusCode(s.as_u16())),
            );
        }

        InvokerError::Transport {
            message: error.to_string(),
            is_timeout,
            is_connection,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            InvokerError::ClientConfiguration { .. } => ErrorKind::ClientConfiguration,
            InvokerError::Transport { .. } => ErrorKind::Transport,
            InvokerError::RemoteRejection { .. } => ErrorKind::RemoteRejection,
            InvokerError::Decoding { .. } => ErrorKind::Decoding,
        }
    }

    /// HTTP status carried by the error, when a response was received.
    pub fn status(&self) -> Option<HttpStatusCode> {
        match self {
            InvokerError::RemoteRejection { status, .. } => Some(*status),
            InvokerError::Decoding { status, .. } => *status,
            _ => None,
        }
    }

    pub fn remote_identifier(&self) -> Option<&str> {
        match self {
            InvokerError::RemoteRejection {
                remote_identifier, ..
            } => remote_identifier.as_deref(),
            _ => None,
        }
    }

    /// Local error variant the remote identifier was mapped to, if any.
    pub fn local_error(&self) -> Option<&LocalError> {
        match self {
            InvokerError::RemoteRejection { local, .. } => local.as_ref(),
            _ => None,
        }
    }

    /// True when the remote rejection maps to a declared business error.
    pub fn is_business(&self) -> bool {
        self.local_error()
            .is_some_and(|local| local.class == ErrorClass::Business)
    }
}

impl From<ConfigError> for InvokerError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        InvokerError::ClientConfiguration {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for InvokerError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        InvokerError::Decoding {
            message: error.to_string(),
            status: None,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<url::ParseError> for InvokerError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        InvokerError::ClientConfiguration {
            message: format!("URL Parse Error: {error}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
