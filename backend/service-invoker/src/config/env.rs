//! Environment variable overrides for [`ClientProperties`].
//!
//! The property path `{service}.client.{path}` maps to the variable
//! `{SERVICE}_CLIENT_{PATH}`: upper-cased, with `.` and `-` turned into `_`.
//! For example `custom-web-service.client.pool.maxTotal` is read from
//! `CUSTOM_WEB_SERVICE_CLIENT_POOL_MAXTOTAL`.

use super::ClientProperties;

use crate::error::config::ConfigError;

use common::{ErrorLocation, RedactedSecret};

use std::panic::Location;
use std::str::FromStr;

use log::debug;

pub const BASE_URL: &str = "baseUrl";
pub const POOL_MAX_TOTAL: &str = "pool.maxTotal";
pub const POOL_MAX_PER_ROUTE: &str = "pool.maxPerRoute";
pub const CONNECTION_TIMEOUT: &str = "connection.connectionTimeout";
pub const SOCKET_TIMEOUT: &str = "connection.socketTimeout";
pub const RESPONSE_TIMEOUT: &str = "connection.responseTimeout";
pub const FOLLOW_REDIRECTS: &str = "connection.followRedirects";
pub const AUTHORIZATION_ENABLE: &str = "authorization.enable";
pub const AUTHORIZATION_USERNAME: &str = "authorization.username";
pub const AUTHORIZATION_PASSWORD: &str = "authorization.password";

/// Reads from the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Variable name for `{service}.client.{path}`.
pub fn variable_name(service: &str, path: &str) -> String {
    format!("{}_CLIENT_{}", normalize(service), normalize(path))
}

fn normalize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| match c {
            '.' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

/// Apply every override present in `lookup` on top of `properties`.
pub fn apply_overrides<F>(
    service: &str,
    properties: &mut ClientProperties,
    lookup: F,
) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |path: &str| {
        let name = variable_name(service, path);
        lookup(&name).map(|value| (name, value))
    };

    if let Some((name, value)) = read(BASE_URL) {
        debug!("{name} overrides base URL");
        properties.base_url = Some(value);
    }
    if let Some((name, value)) = read(POOL_MAX_TOTAL) {
        properties.pool.max_total = parse(&name, &value)?;
    }
    if let Some((name, value)) = read(POOL_MAX_PER_ROUTE) {
        properties.pool.max_per_route = parse(&name, &value)?;
    }
    if let Some((name, value)) = read(CONNECTION_TIMEOUT) {
        properties.connection.connection_timeout = parse(&name, &value)?;
    }
    if let Some((name, value)) = read(SOCKET_TIMEOUT) {
        properties.connection.socket_timeout = parse(&name, &value)?;
    }
    if let Some((name, value)) = read(RESPONSE_TIMEOUT) {
        properties.connection.response_timeout = parse(&name, &value)?;
    }
    if let Some((name, value)) = read(FOLLOW_REDIRECTS) {
        properties.connection.follow_redirects = parse(&name, &value)?;
    }
    if let Some((name, value)) = read(AUTHORIZATION_ENABLE) {
        properties.authorization.enable = parse(&name, &value)?;
    }
    if let Some((_, value)) = read(AUTHORIZATION_USERNAME) {
        properties.authorization.username = Some(value);
    }
    if let Some((_, value)) = read(AUTHORIZATION_PASSWORD) {
        properties.authorization.password = RedactedSecret::new(value);
    }

    Ok(())
}

#[track_caller]
fn parse<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::ParseError {
        location: ErrorLocation::from(Location::caller()),
        origin: name.to_string(),
        reason: format!("'{value}': {e}"),
    })
}
