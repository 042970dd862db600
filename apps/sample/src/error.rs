use common::ErrorLocation;

use service_invoker::{ConfigError, InvokerError};

use std::panic::Location;

use serde::Serialize;
use thiserror::Error;

/// Errors that stop the sample application.
///
/// Invoker and configuration failures are flattened to their message so the
/// enum stays serializable for structured output.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum SampleError {
    /// Error from this App
    #[error("Sample Error: {message} {location}")]
    Sample {
        message: String,
        location: ErrorLocation,
    },

    /// Configuration could not be loaded or bound
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },

    /// A service invoker could not be built
    #[error("Invoker Error: {message} {location}")]
    Invoker {
        message: String,
        location: ErrorLocation,
    },
}

impl From<ConfigError> for SampleError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        SampleError::Config {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<InvokerError> for SampleError {
    #[track_caller]
    fn from(error: InvokerError) -> Self {
        SampleError::Invoker {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
