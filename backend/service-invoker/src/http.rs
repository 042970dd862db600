//! Per-call request and buffered response types.
//!
//! A [`RequestContext`] is created for every invocation, travels through the
//! interceptor chain by mutable reference, and is dropped once the response
//! has been handled. Responses are fully buffered so the logging interceptor
//! and the error translator can both read the body.

use crate::error::invoker::InvokerError;

use common::HttpStatusCode;

use std::borrow::Cow;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl RequestContext {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `payload` as the JSON request body.
    #[track_caller]
    pub fn with_json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self, InvokerError> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| InvokerError::decoding(format!("Failed to encode request body: {e}"), None))?;
        self.body = Some(body);
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn status_code(&self) -> HttpStatusCode {
        HttpStatusCode(self.status.as_u16())
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Decode the body as JSON. An empty body decodes as `null`, so `()` and
    /// `Option<T>` accept a `204 No Content`.
    #[track_caller]
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, InvokerError> {
        let decoded = if self.body.is_empty() {
            serde_json::from_value(Value::Null)
        } else {
            serde_json::from_slice(&self.body)
        };

        decoded.map_err(|e| {
            InvokerError::decoding(
                format!("Failed to decode response body: {e}"),
                Some(self.status_code()),
            )
        })
    }
}
