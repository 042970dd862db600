//! Pooled HTTP transport.
//!
//! [`PooledTransportFactory::build`] validates the properties first and only
//! then allocates the `reqwest` client and the connection pool, so a bad
//! configuration never opens a socket.
//!
//! A [`Transport`] is an explicit resource handle: [`Transport::dispose`]
//! (also run on drop) closes the pool to new checkouts and releases the
//! transport's client handle, which frees its idle connections. Requests
//! already in flight hold their own client handle and pool permit, so they
//! finish normally.

pub(crate) mod pool;

use pool::ConnectionPool;

use crate::config::ClientProperties;
use crate::error::invoker::InvokerError;
use crate::http::{HttpResponse, RequestContext};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use log::{debug, info};
use reqwest::Client;
use reqwest::redirect::Policy;

const MAX_REDIRECTS: usize = 10;

pub struct PooledTransportFactory;

impl PooledTransportFactory {
    /// Build a pooled transport for `service`.
    ///
    /// # Errors
    ///
    /// Returns [`InvokerError::ClientConfiguration`] if the properties are
    /// invalid (missing or malformed base URL included) or the client cannot
    /// be constructed.
    pub fn build(service: &str, properties: &ClientProperties) -> Result<Transport, InvokerError> {
        properties.validate(service)?;

        let connection = &properties.connection;
        let pool = &properties.pool;

        let client = Client::builder()
            .connect_timeout(connection.connect_timeout())
            .read_timeout(connection.socket_timeout())
            .timeout(connection.response_timeout())
            .pool_max_idle_per_host(pool.max_per_route)
            .redirect(redirect_policy(connection.follow_redirects))
            .build()
            .map_err(|e| {
                InvokerError::client_configuration(format!(
                    "Failed to build HTTP client for service '{service}': {e}"
                ))
            })?;

        info!(
            "Transport for '{service}' ready: maxTotal={}, maxPerRoute={}, connect={}ms, socket={}ms, response={}ms, followRedirects={}",
            pool.max_total,
            pool.max_per_route,
            connection.connection_timeout,
            connection.socket_timeout,
            connection.response_timeout,
            connection.follow_redirects
        );

        Ok(Transport {
            service: service.to_string(),
            client: Mutex::new(Some(client)),
            pool: ConnectionPool::new(pool.max_total, pool.max_per_route, connection.connect_timeout()),
            disposed: AtomicBool::new(false),
        })
    }
}

fn redirect_policy(follow_redirects: bool) -> Policy {
    if follow_redirects {
        Policy::limited(MAX_REDIRECTS)
    } else {
        Policy::none()
    }
}

pub struct Transport {
    service: String,
    client: Mutex<Option<Client>>,
    pool: ConnectionPool,
    disposed: AtomicBool,
}

impl Transport {
    /// Execute one exchange and buffer the response.
    ///
    /// # Errors
    ///
    /// Returns [`InvokerError::Transport`] on pool exhaustion, after disposal,
    /// or for any network failure. Never retries.
    pub async fn execute(&self, request: &RequestContext) -> Result<HttpResponse, InvokerError> {
        let _permit = self.pool.acquire(&request.url).await?;
        let client = self.client()?;

        let mut builder = client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| InvokerError::from_reqwest(&e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| InvokerError::from_reqwest(&e))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn client(&self) -> Result<Client, InvokerError> {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| {
                InvokerError::transport(format!(
                    "Transport for service '{}' has been disposed",
                    self.service
                ))
            })
    }

    /// Release pooled connections. Returns `true` only for the call that did the work.
    pub fn dispose(&self) -> bool {
        if self.disposed.swap(true, Ordering::SeqCst) {
            debug!("Transport for '{}' already disposed", self.service);
            return false;
        }

        self.pool.close();
        let released = self
            .client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(released);

        info!(
            "Closed HTTP transport for service '{}' ({} of {} connections were idle)",
            self.service,
            self.pool.available(),
            self.pool.max_total()
        );
        true
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst) || self.pool.is_closed()
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Connections that can be checked out right now.
    pub fn available_connections(&self) -> usize {
        self.pool.available()
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.dispose();
    }
}
