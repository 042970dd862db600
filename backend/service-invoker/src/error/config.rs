use std::path::PathBuf;

use common::ErrorLocation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config Read Error: {path}: {source} {location}")]
    ReadError {
        location: ErrorLocation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config Parse Error: {origin}: {reason} {location}")]
    ParseError {
        location: ErrorLocation,
        origin: String,
        reason: String,
    },

    #[error("Config Validation Error: service '{service}': {reason} {location}")]
    ValidationError {
        location: ErrorLocation,
        service: String,
        reason: String,
    },
}
