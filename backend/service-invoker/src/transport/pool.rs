//! Bounded connection checkout.
//!
//! `reqwest` keeps idle connections per host but places no ceiling on how
//! many are open at once. This pool enforces `maxTotal` across all routes and
//! `maxPerRoute` per scheme/host/port, with a permit held for the whole
//! exchange. When either bound is exhausted the caller waits, up to the
//! configured connect timeout.

use crate::error::invoker::InvokerError;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::debug;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;
use url::Url;

/// Checked-out slot. Dropping it returns the connection to the pool.
#[derive(Debug)]
pub(crate) struct PoolPermit {
    _route: OwnedSemaphorePermit,
    _total: OwnedSemaphorePermit,
}

#[derive(Debug)]
pub(crate) struct ConnectionPool {
    total: Arc<Semaphore>,
    routes: Mutex<HashMap<String, Arc<Semaphore>>>,
    max_total: usize,
    max_per_route: usize,
    acquire_timeout: Duration,
}

impl ConnectionPool {
    pub(crate) fn new(max_total: usize, max_per_route: usize, acquire_timeout: Duration) -> Self {
        Self {
            total: Arc::new(Semaphore::new(max_total)),
            routes: Mutex::new(HashMap::new()),
            max_total,
            max_per_route,
            acquire_timeout,
        }
    }

    /// Wait for a slot on the route of `url`.
    ///
    /// # Errors
    ///
    /// Returns a timeout [`InvokerError::Transport`] when no slot frees up in
    /// time, and a plain transport error once the pool has been closed.
    pub(crate) async fn acquire(&self, url: &Url) -> Result<PoolPermit, InvokerError> {
        let key = route_key(url);
        let route = self.route(&key);
        let total = Arc::clone(&self.total);

        let acquired = timeout(self.acquire_timeout, async move {
            let route = route.acquire_owned().await?;
            let total = total.acquire_owned().await?;
            Ok::<_, tokio::sync::AcquireError>(PoolPermit {
                _route: route,
                _total: total,
            })
        })
        .await;

        match acquired {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) => Err(InvokerError::transport(format!(
                "Connection pool closed, no new requests accepted for {key}"
            ))),
            Err(_) => Err(InvokerError::transport_timeout(format!(
                "Timed out after {:?} waiting for a pooled connection to {key} (maxTotal={}, maxPerRoute={})",
                self.acquire_timeout, self.max_total, self.max_per_route
            ))),
        }
    }

    fn route(&self, key: &str) -> Arc<Semaphore> {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let semaphore = routes.entry(key.to_string()).or_insert_with(|| {
            debug!("Opening pool route {key} (maxPerRoute={})", self.max_per_route);
            Arc::new(Semaphore::new(self.max_per_route))
        });
        if self.total.is_closed() {
            semaphore.close();
        }
        Arc::clone(semaphore)
    }

    /// Refuse further checkouts. Permits already held stay valid until dropped.
    pub(crate) fn close(&self) {
        self.total.close();
        let routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        for semaphore in routes.values() {
            semaphore.close();
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.total.is_closed()
    }

    /// Connections currently free across all routes.
    pub(crate) fn available(&self) -> usize {
        self.total.available_permits()
    }

    pub(crate) fn max_total(&self) -> usize {
        self.max_total
    }
}

/// `scheme://host:port`, with the scheme's default port filled in.
pub(crate) fn route_key(url: &Url) -> String {
    format!(
        "{}://{}:{}",
        url.scheme(),
        url.host_str().unwrap_or_default(),
        url.port_or_known_default().unwrap_or_default()
    )
}
