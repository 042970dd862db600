//! Per-service client configuration.
//!
//! Each external service is configured under its own name:
//!
//! ```toml
//! [custom-web-service.client]
//! baseUrl = "http://localhost:8080/api"
//!
//! [custom-web-service.client.pool]
//! maxTotal = 50
//! maxPerRoute = 10
//!
//! [custom-web-service.client.connection]
//! connectionTimeout = 2000
//! socketTimeout = 5000
//! followRedirects = false
//!
//! [custom-web-service.client.authorization]
//! enable = true
//! username = "svc"
//! password = "secret"
//! ```
//!
//! Environment variables override file values, see [`env`].

pub mod env;

use crate::error::config::ConfigError;

use common::{ErrorLocation, RedactedSecret};

use std::panic::Location;
use std::path::Path;
use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;
use url::Url;

const CLIENT_SECTION: &str = "client";

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfiguration {
    #[serde(default = "default_max_total")]
    pub max_total: usize,
    #[serde(default = "default_max_per_route")]
    pub max_per_route: usize,
}

impl Default for PoolConfiguration {
    fn default() -> Self {
        Self {
            max_total: default_max_total(),
            max_per_route: default_max_per_route(),
        }
    }
}

/// Timeouts are expressed in milliseconds.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfiguration {
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
    #[serde(default = "default_socket_timeout")]
    pub socket_timeout: u64,
    #[serde(default = "default_response_timeout")]
    pub response_timeout: u64,
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,
}

impl ConnectionConfiguration {
    /// Also bounds how long a caller waits for a pooled connection.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout)
    }

    pub fn socket_timeout(&self) -> Duration {
        Duration::from_millis(self.socket_timeout)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout)
    }
}

impl Default for ConnectionConfiguration {
    fn default() -> Self {
        Self {
            connection_timeout: default_connection_timeout(),
            socket_timeout: default_socket_timeout(),
            response_timeout: default_response_timeout(),
            follow_redirects: default_follow_redirects(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationConfiguration {
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: RedactedSecret,
}

/// Immutable configuration snapshot for one named external service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProperties {
    #[serde(default, alias = "baseServiceUrl")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub pool: PoolConfiguration,
    #[serde(default)]
    pub connection: ConnectionConfiguration,
    #[serde(default)]
    pub authorization: AuthorizationConfiguration,
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_max_total() -> usize {
    25
}
fn default_max_per_route() -> usize {
    5
}
fn default_connection_timeout() -> u64 {
    5_000
}
fn default_socket_timeout() -> u64 {
    10_000
}
fn default_response_timeout() -> u64 {
    30_000
}
fn default_follow_redirects() -> bool {
    true
}

// ============================================
// IMPLEMENTATION
// ============================================

impl ClientProperties {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    pub fn with_pool(mut self, max_total: usize, max_per_route: usize) -> Self {
        self.pool = PoolConfiguration {
            max_total,
            max_per_route,
        };
        self
    }

    /// Set connect, socket and response timeouts (milliseconds).
    pub fn with_timeouts(mut self, connect: u64, socket: u64, response: u64) -> Self {
        self.connection.connection_timeout = connect;
        self.connection.socket_timeout = socket;
        self.connection.response_timeout = response;
        self
    }

    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.connection.follow_redirects = follow;
        self
    }

    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<RedactedSecret>,
    ) -> Self {
        self.authorization = AuthorizationConfiguration {
            enable: true,
            username: Some(username.into()),
            password: password.into(),
        };
        self
    }

    /// Configured base URL with surrounding whitespace removed.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Validate the snapshot and return the parsed base URL.
    ///
    /// Must succeed before any transport resource is allocated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    #[track_caller]
    pub fn validate(&self, service: &str) -> Result<Url, ConfigError> {
        let location = ErrorLocation::from(Location::caller());
        let invalid = |reason: String| ConfigError::ValidationError {
            location,
            service: service.to_string(),
            reason,
        };

        let raw = self
            .base_url()
            .ok_or_else(|| invalid("base URL cannot be null or blank".to_string()))?;

        let url = Url::parse(raw).map_err(|e| invalid(format!("Invalid base URL '{raw}': {e}")))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid(format!(
                "Invalid base URL scheme '{}' (expected http or https)",
                url.scheme()
            )));
        }

        if url.host_str().is_none() {
            return Err(invalid(format!("Base URL '{raw}' has no host")));
        }

        // Pool bounds
        if self.pool.max_total == 0 || self.pool.max_per_route == 0 {
            return Err(invalid("pool sizes must be greater than zero".to_string()));
        }

        if self.pool.max_per_route > self.pool.max_total {
            return Err(invalid(format!(
                "pool.maxPerRoute ({}) exceeds pool.maxTotal ({})",
                self.pool.max_per_route, self.pool.max_total
            )));
        }

        // Timeouts
        let connection = &self.connection;
        if connection.connection_timeout == 0
            || connection.socket_timeout == 0
            || connection.response_timeout == 0
        {
            return Err(invalid("timeouts must be greater than zero".to_string()));
        }

        // Credentials
        if self.authorization.enable
            && self
                .authorization
                .username
                .as_deref()
                .is_none_or(|u| u.trim().is_empty())
        {
            return Err(invalid(
                "authorization is enabled but no username is configured".to_string(),
            ));
        }

        Ok(url)
    }

    /// Bind properties for `service` from environment variables only.
    pub fn from_env(service: &str) -> Result<Self, ConfigError> {
        let mut properties = Self::default();
        env::apply_overrides(service, &mut properties, env::process_env)?;
        Ok(properties)
    }
}

/// Parsed configuration document holding any number of named services.
#[derive(Debug, Clone, Default)]
pub struct ServicesConfig {
    root: toml::Table,
}

impl ServicesConfig {
    /// Load a services document from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file cannot be read and
    /// [`ConfigError::ParseError`] if it is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            location: ErrorLocation::from(Location::caller()),
            path: path.to_path_buf(),
            source: e,
        })?;

        let config = Self::parse(&contents, &path.display().to_string())?;
        info!("Services config loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::parse(contents, "<inline>")
    }

    fn parse(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        let root: toml::Table = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            location: ErrorLocation::from(Location::caller()),
            origin: origin.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { root })
    }

    /// Names of all top-level service sections that carry a `client` table.
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .root
            .iter()
            .filter(|(_, value)| {
                value
                    .as_table()
                    .is_some_and(|table| table.contains_key(CLIENT_SECTION))
            })
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Bind `{service}.client` from the document, then apply environment overrides.
    ///
    /// A missing section yields defaults; the missing base URL is then reported
    /// when the client is built.
    pub fn client_properties(&self, service: &str) -> Result<ClientProperties, ConfigError> {
        self.client_properties_with(service, env::process_env)
    }

    /// Same as [`client_properties`](Self::client_properties) with an explicit variable lookup.
    pub fn client_properties_with<F>(
        &self,
        service: &str,
        lookup: F,
    ) -> Result<ClientProperties, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let section = self
            .root
            .get(service)
            .and_then(toml::Value::as_table)
            .and_then(|table| table.get(CLIENT_SECTION));

        let mut properties = match section {
            Some(value) => value.clone().try_into::<ClientProperties>().map_err(|e| {
                ConfigError::ParseError {
                    location: ErrorLocation::from(Location::caller()),
                    origin: format!("{service}.{CLIENT_SECTION}"),
                    reason: e.to_string(),
                }
            })?,
            None => {
                debug!("No '{service}.{CLIENT_SECTION}' section, starting from defaults");
                ClientProperties::default()
            }
        };

        env::apply_overrides(service, &mut properties, lookup)?;
        Ok(properties)
    }
}
