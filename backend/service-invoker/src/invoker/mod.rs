//! The per-service façade applications hold.
//!
//! A [`ServiceInvoker`] owns one pooled [`Transport`] and a read-only
//! [`ClientProperties`] snapshot. Every call flows through the interceptor
//! chain, is reported to the observation sink, then passes the error
//! translator before reaching the caller.
//!
//! ```no_run
//! # async fn demo() -> Result<(), service_invoker::InvokerError> {
//! use service_invoker::{ClientProperties, ServiceInvoker};
//!
//! let invoker = ServiceInvoker::builder("custom-web-service")
//!     .properties(ClientProperties::new("http://localhost:8080/api"))
//!     .build()?;
//!
//! let info: serde_json::Value = invoker.get_json("/info").await?;
//! invoker.dispose();
//! # Ok(())
//! # }
//! ```

pub mod registry;

use crate::config::{ClientProperties, ServicesConfig};
use crate::error::invoker::InvokerError;
use crate::error_translator::{ErrorTranslator, ErrorTranslatorConfig};
use crate::http::{HttpResponse, RequestContext};
use crate::interceptor::{InterceptorChain, build_interceptor_chain};
use crate::masking::{FieldMasker, MaskingRules};
use crate::observation::{LogObservationSink, Observation, ObservationSink, Outcome};
use crate::transport::{PooledTransportFactory, Transport};

use std::sync::Arc;
use std::time::Instant;

use log::info;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

/// Join `base` and `path` with exactly one `/` between them.
///
/// A missing or blank path returns `base` unchanged.
pub fn resolve_url(base: &str, path: Option<&str>) -> String {
    let Some(path) = path.filter(|p| !p.trim().is_empty()) else {
        return base.to_string();
    };

    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{base}{}", &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

pub struct ServiceInvoker {
    name: String,
    properties: Arc<ClientProperties>,
    base_url: String,
    transport: Transport,
    chain: InterceptorChain,
    translator: ErrorTranslator,
    sink: Arc<dyn ObservationSink>,
}

impl ServiceInvoker {
    pub fn builder(name: impl Into<String>) -> ServiceInvokerBuilder {
        ServiceInvokerBuilder::new(name)
    }

    /// Build the invoker for `name` from a services document with default collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`InvokerError::ClientConfiguration`] when the section cannot
    /// be bound or fails validation.
    pub fn from_config(config: &ServicesConfig, name: &str) -> Result<Self, InvokerError> {
        let properties = config.client_properties(name)?;
        Self::builder(name).properties(properties).build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &ClientProperties {
        &self.properties
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for `path` under the configured base URL.
    pub fn resolve(&self, path: Option<&str>) -> String {
        resolve_url(&self.base_url, path)
    }

    /// Start a request for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`InvokerError::ClientConfiguration`] if the joined URL does not parse.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestContext, InvokerError> {
        let url = Url::parse(&self.resolve(Some(path)))?;
        Ok(RequestContext::new(method, url))
    }

    /// Send `request` through the chain and translate the response.
    ///
    /// # Errors
    ///
    /// [`InvokerError::Transport`] for network failures and
    /// [`InvokerError::RemoteRejection`] for non-2xx responses. Never retries.
    pub async fn execute(&self, mut request: RequestContext) -> Result<HttpResponse, InvokerError> {
        let started = Instant::now();
        let result = self.chain.execute(&self.transport, &mut request).await;

        let status = result.as_ref().ok().map(HttpResponse::status_code);
        self.sink.record(&Observation {
            name: self.name.clone(),
            method: request.method.to_string(),
            uri: request.url.path().to_string(),
            status,
            outcome: Outcome::from_status(status),
            duration: started.elapsed(),
        });

        self.translator.translate(result?)
    }

    /// Execute and decode a successful body as `T`.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute), plus [`InvokerError::Decoding`] when
    /// the body does not match `T`.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestContext,
    ) -> Result<T, InvokerError> {
        let response = self.execute(request).await?;
        self.translator.decode(&response)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, InvokerError> {
        let request = self.request(Method::GET, path)?;
        self.execute_json(request).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, InvokerError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path)?.with_json(body)?;
        self.execute_json(request).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, InvokerError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path)?.with_json(body)?;
        self.execute_json(request).await
    }

    pub async fn delete(&self, path: &str) -> Result<HttpResponse, InvokerError> {
        let request = self.request(Method::DELETE, path)?;
        self.execute(request).await
    }

    /// Close the transport. Safe to call repeatedly and while calls are in flight.
    pub fn dispose(&self) {
        if self.transport.dispose() {
            info!("Closing HTTP client connections for service: {}", self.name);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.transport.is_disposed()
    }

    /// Connections that can be checked out right now.
    pub fn available_connections(&self) -> usize {
        self.transport.available_connections()
    }
}

impl std::fmt::Debug for ServiceInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceInvoker")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("chain", &self.chain)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

pub struct ServiceInvokerBuilder {
    name: String,
    properties: Option<ClientProperties>,
    masker: Arc<dyn FieldMasker>,
    translator: ErrorTranslatorConfig,
    sink: Arc<dyn ObservationSink>,
}

impl ServiceInvokerBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: None,
            masker: Arc::new(MaskingRules::with_defaults()),
            translator: ErrorTranslatorConfig::default(),
            sink: Arc::new(LogObservationSink),
        }
    }

    pub fn properties(mut self, properties: ClientProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn masker(mut self, masker: Arc<dyn FieldMasker>) -> Self {
        self.masker = masker;
        self
    }

    pub fn error_translator(mut self, config: ErrorTranslatorConfig) -> Self {
        self.translator = config;
        self
    }

    pub fn observation_sink(mut self, sink: Arc<dyn ObservationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Validate the properties, then allocate the transport.
    ///
    /// # Errors
    ///
    /// Returns [`InvokerError::ClientConfiguration`] before anything is
    /// allocated if the properties are missing or invalid.
    pub fn build(self) -> Result<ServiceInvoker, InvokerError> {
        let properties = self.properties.ok_or_else(|| {
            InvokerError::client_configuration(format!(
                "No client properties supplied for service '{}'",
                self.name
            ))
        })?;

        properties.validate(&self.name)?;
        let base_url = properties.base_url().unwrap_or_default().to_string();

        let chain = build_interceptor_chain(&self.name, &properties, self.masker)?;
        let transport = PooledTransportFactory::build(&self.name, &properties)?;

        info!(
            "Service invoker '{}' ready at {base_url} (interceptors: {:?})",
            self.name,
            chain.names()
        );

        Ok(ServiceInvoker {
            name: self.name,
            properties: Arc::new(properties),
            base_url,
            transport,
            chain,
            translator: ErrorTranslator::new(self.translator),
            sink: self.sink,
        })
    }
}
