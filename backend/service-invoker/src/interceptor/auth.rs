use super::{Interceptor, Next};
use crate::error::invoker::InvokerError;
use crate::http::{HttpResponse, RequestContext};

use common::RedactedSecret;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderValue};

/// Adds `Authorization: Basic ...` unless the caller already set one.
pub struct BasicAuthInterceptor {
    header: HeaderValue,
}

impl BasicAuthInterceptor {
    /// # Errors
    ///
    /// Returns [`InvokerError::ClientConfiguration`] if the encoded
    /// credentials are not a valid header value.
    pub fn new(username: &str, password: &RedactedSecret) -> Result<Self, InvokerError> {
        let mut header = HeaderValue::from_str(&basic_credentials(username, password))
            .map_err(|e| InvokerError::client_configuration(format!("Invalid basic auth credentials: {e}")))?;
        header.set_sensitive(true);
        Ok(Self { header })
    }
}

/// `Basic ` followed by Base64 of the UTF-8 `username:password`.
pub fn basic_credentials(username: &str, password: &RedactedSecret) -> String {
    let encoded = STANDARD.encode(format!("{username}:{}", password.expose()));
    format!("Basic {encoded}")
}

impl std::fmt::Debug for BasicAuthInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BasicAuthInterceptor([REDACTED])")
    }
}

#[async_trait]
impl Interceptor for BasicAuthInterceptor {
    fn name(&self) -> &'static str {
        "basic-auth"
    }

    async fn intercept(
        &self,
        request: &mut RequestContext,
        next: Next<'_>,
    ) -> Result<HttpResponse, InvokerError> {
        if !request.headers.contains_key(AUTHORIZATION) {
            request.headers.insert(AUTHORIZATION, self.header.clone());
        }
        next.run(request).await
    }
}
