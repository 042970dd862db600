//! Exchange observations handed to a metrics backend.
//!
//! The invoker reports one [`Observation`] per exchange. What happens next is
//! up to the [`ObservationSink`]; the crate only ships a logging sink and a
//! no-op sink.

use common::HttpStatusCode;

use std::fmt;
use std::time::Duration;

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Informational,
    Success,
    Redirection,
    ClientError,
    ServerError,
    Unknown,
}

impl Outcome {
    /// `None` means no response was received.
    pub fn from_status(status: Option<HttpStatusCode>) -> Self {
        match status {
            Some(s) if s.is_informational() => Outcome::Informational,
            Some(s) if s.is_success() => Outcome::Success,
            Some(s) if s.is_redirection() => Outcome::Redirection,
            Some(s) if s.is_client_error() => Outcome::ClientError,
            Some(s) if s.is_server_error() => Outcome::ServerError,
            _ => Outcome::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Informational => "INFORMATIONAL",
            Outcome::Success => "SUCCESS",
            Outcome::Redirection => "REDIRECTION",
            Outcome::ClientError => "CLIENT_ERROR",
            Outcome::ServerError => "SERVER_ERROR",
            Outcome::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Service name.
    pub name: String,
    pub method: String,
    /// Request path, without query string.
    pub uri: String,
    pub status: Option<HttpStatusCode>,
    pub outcome: Outcome,
    pub duration: Duration,
}

pub trait ObservationSink: Send + Sync {
    fn record(&self, observation: &Observation);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogObservationSink;

impl ObservationSink for LogObservationSink {
    fn record(&self, observation: &Observation) {
        debug!(
            "observation name={} method={} uri={} status={} outcome={} duration_ms={}",
            observation.name,
            observation.method,
            observation.uri,
            observation
                .status
                .map_or_else(|| "NONE".to_string(), |s| s.to_string()),
            observation.outcome,
            observation.duration.as_millis()
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObservationSink;

impl ObservationSink for NoopObservationSink {
    fn record(&self, _observation: &Observation) {}
}
