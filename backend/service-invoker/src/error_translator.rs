//! Translation of non-2xx responses into [`InvokerError::RemoteRejection`].
//!
//! Remote services describe their failures in a JSON body. The translator
//! pulls a remote identifier out of that body and looks it up in a static
//! mapping table built at configuration time:
//!
//! - [`ExceptionExtractType::FullName`]: the body names the error by its
//!   fully-qualified name in `full_name_field`. The name is matched exactly,
//!   then with every scan package prepended.
//! - [`ExceptionExtractType::IdentifierFields`]: the first configured
//!   identifier field present in the body supplies the identifier.
//!
//! A body that is not a JSON object yields a rejection without identifier.

use crate::error::invoker::InvokerError;
use crate::http::HttpResponse;

use std::collections::HashMap;

use log::debug;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExceptionExtractType {
    FullName,
    #[default]
    IdentifierFields,
}

/// Whether a local error is a declared business failure or an unexpected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorClass {
    Business,
    #[default]
    Runtime,
}

/// Local error variant a remote identifier maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalError {
    pub name: String,
    pub class: ErrorClass,
}

impl LocalError {
    pub fn business(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: ErrorClass::Business,
        }
    }

    pub fn runtime(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: ErrorClass::Runtime,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorTranslatorConfig {
    pub extract_type: ExceptionExtractType,
    pub full_name_field: String,
    pub scan_packages: Vec<String>,
    pub identifier_fields: Vec<String>,
    pub message_field: Option<String>,
    /// Class given to identifiers with no entry in `mappings`.
    pub default_class: ErrorClass,
    pub mappings: HashMap<String, LocalError>,
}

impl Default for ErrorTranslatorConfig {
    fn default() -> Self {
        Self {
            extract_type: ExceptionExtractType::default(),
            full_name_field: "errorCode".to_string(),
            scan_packages: Vec::new(),
            identifier_fields: vec!["errorCode".to_string()],
            message_field: Some("message".to_string()),
            default_class: ErrorClass::default(),
            mappings: HashMap::new(),
        }
    }
}

impl ErrorTranslatorConfig {
    pub fn full_name(field: impl Into<String>) -> Self {
        Self {
            extract_type: ExceptionExtractType::FullName,
            full_name_field: field.into(),
            ..Self::default()
        }
    }

    pub fn identifier_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extract_type: ExceptionExtractType::IdentifierFields,
            identifier_fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_scan_package(mut self, package: impl Into<String>) -> Self {
        self.scan_packages.push(package.into());
        self
    }

    pub fn with_message_field(mut self, field: Option<&str>) -> Self {
        self.message_field = field.map(str::to_string);
        self
    }

    pub fn with_default_class(mut self, class: ErrorClass) -> Self {
        self.default_class = class;
        self
    }

    pub fn with_mapping(mut self, remote: impl Into<String>, local: LocalError) -> Self {
        self.mappings.insert(remote.into(), local);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ErrorTranslator {
    config: ErrorTranslatorConfig,
}

impl ErrorTranslator {
    pub fn new(config: ErrorTranslatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ErrorTranslatorConfig {
        &self.config
    }

    /// Pass 2xx responses through, turn everything else into a rejection.
    ///
    /// # Errors
    ///
    /// Returns [`InvokerError::RemoteRejection`] for any non-2xx status.
    pub fn translate(&self, response: HttpResponse) -> Result<HttpResponse, InvokerError> {
        if response.is_success() {
            return Ok(response);
        }

        let status = response.status_code();
        let body = response.text().into_owned();

        let Some(fields) = parse_object(&response.body) else {
            debug!("HTTP {status} body is not a JSON object, no remote identifier");
            return Err(InvokerError::remote_rejection(
                status,
                None,
                None,
                default_message(&response),
                body,
            ));
        };

        let message = self
            .config
            .message_field
            .as_deref()
            .and_then(|field| fields.get(field))
            .and_then(scalar)
            .unwrap_or_else(|| default_message(&response));

        let (identifier, local) = match self.config.extract_type {
            ExceptionExtractType::FullName => self.by_full_name(&fields),
            ExceptionExtractType::IdentifierFields => self.by_identifier_fields(&fields),
        };

        Err(InvokerError::remote_rejection(
            status, identifier, local, message, body,
        ))
    }

    fn by_full_name(&self, fields: &Map<String, Value>) -> (Option<String>, Option<LocalError>) {
        let Some(raw) = fields.get(&self.config.full_name_field).and_then(scalar) else {
            return (None, None);
        };

        let candidates = std::iter::once(raw.clone()).chain(
            self.config
                .scan_packages
                .iter()
                .map(|package| format!("{}.{raw}", package.trim_end_matches('.'))),
        );

        for candidate in candidates {
            if let Some(local) = self.config.mappings.get(&candidate) {
                return (Some(candidate), Some(local.clone()));
            }
        }

        let local = self.fallback(&raw);
        (Some(raw), local)
    }

    fn by_identifier_fields(
        &self,
        fields: &Map<String, Value>,
    ) -> (Option<String>, Option<LocalError>) {
        let identifier = self
            .config
            .identifier_fields
            .iter()
            .find_map(|field| fields.get(field).and_then(scalar));

        match identifier {
            Some(id) => {
                let local = self
                    .config
                    .mappings
                    .get(&id)
                    .cloned()
                    .or_else(|| self.fallback(&id));
                (Some(id), local)
            }
            None => (None, None),
        }
    }

    fn fallback(&self, identifier: &str) -> Option<LocalError> {
        debug!(
            "Remote identifier '{identifier}' has no mapping, classed as {:?}",
            self.config.default_class
        );
        Some(LocalError {
            name: identifier.to_string(),
            class: self.config.default_class,
        })
    }

    /// Decode a successful body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`InvokerError::Decoding`] when the body does not match `T`.
    /// An empty body is read as `null`.
    #[track_caller]
    pub fn decode<T: DeserializeOwned>(&self, response: &HttpResponse) -> Result<T, InvokerError> {
        response.json()
    }
}

fn parse_object(body: &[u8]) -> Option<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Some(fields),
        _ => None,
    }
}

/// Non-empty string or number rendered as text.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn default_message(response: &HttpResponse) -> String {
    response
        .status
        .canonical_reason()
        .unwrap_or("Unknown status")
        .to_string()
}
