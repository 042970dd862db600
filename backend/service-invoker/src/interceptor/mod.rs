//! Interceptor chain wrapped around the transport.
//!
//! Each [`Interceptor`] receives the request by mutable reference and a
//! [`Next`] handle for the rest of the chain; the last link is the transport
//! itself. The chain assembled by [`build_interceptor_chain`] is, outermost
//! first:
//!
//! 1. [`MaskingLogInterceptor`]: sees the final request and every failure below it
//! 2. [`DefaultHeadersInterceptor`]: JSON content negotiation and correlation headers
//! 3. [`BasicAuthInterceptor`]: only when `authorization.enable` is set

pub mod auth;
pub mod defaults;
pub mod logging;

pub use auth::BasicAuthInterceptor;
pub use defaults::DefaultHeadersInterceptor;
pub use logging::MaskingLogInterceptor;

use crate::config::ClientProperties;
use crate::error::invoker::InvokerError;
use crate::http::{HttpResponse, RequestContext};
use crate::masking::FieldMasker;
use crate::transport::Transport;

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

#[async_trait]
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn intercept(
        &self,
        request: &mut RequestContext,
        next: Next<'_>,
    ) -> Result<HttpResponse, InvokerError>;
}

/// Remainder of the chain below the current interceptor.
pub struct Next<'a> {
    transport: &'a Transport,
    remaining: &'a [Arc<dyn Interceptor>],
}

impl Next<'_> {
    pub async fn run(self, request: &mut RequestContext) -> Result<HttpResponse, InvokerError> {
        match self.remaining.split_first() {
            Some((current, rest)) => {
                let next = Next {
                    transport: self.transport,
                    remaining: rest,
                };
                current.intercept(request, next).await
            }
            None => self.transport.execute(request).await,
        }
    }
}

#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interceptor below the ones already present.
    pub fn push(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn with(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.push(interceptor);
        self
    }

    /// Interceptor names, outermost first.
    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub async fn execute(
        &self,
        transport: &Transport,
        request: &mut RequestContext,
    ) -> Result<HttpResponse, InvokerError> {
        Next {
            transport,
            remaining: &self.interceptors,
        }
        .run(request)
        .await
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Standard chain for `service`: logging, default headers, then basic auth if enabled.
///
/// # Errors
///
/// Returns [`InvokerError::ClientConfiguration`] if the credentials cannot be
/// encoded into a header.
pub fn build_interceptor_chain(
    service: &str,
    properties: &ClientProperties,
    masker: Arc<dyn FieldMasker>,
) -> Result<InterceptorChain, InvokerError> {
    let mut chain = InterceptorChain::new()
        .with(Arc::new(MaskingLogInterceptor::new(service, masker)))
        .with(Arc::new(DefaultHeadersInterceptor));

    let auth = &properties.authorization;
    if auth.enable {
        let username = auth.username.as_deref().unwrap_or_default();
        chain.push(Arc::new(BasicAuthInterceptor::new(username, &auth.password)?));
    } else {
        debug!("Basic auth disabled for '{service}'");
    }

    Ok(chain)
}
