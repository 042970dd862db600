//! Named invokers for every external service of an application.

use super::ServiceInvoker;
use crate::config::ServicesConfig;
use crate::error::invoker::InvokerError;

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{info, warn};
use tokio::sync::RwLock;

/// Cloneable handle; all clones share the same invokers.
#[derive(Clone, Default)]
pub struct InvokerRegistry {
    invokers: Arc<RwLock<BTreeMap<String, Arc<ServiceInvoker>>>>,
}

impl InvokerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One invoker per service section of `config`.
    ///
    /// # Errors
    ///
    /// Fails on the first service whose client cannot be built.
    pub async fn from_config(config: &ServicesConfig) -> Result<Self, InvokerError> {
        let registry = Self::new();
        for name in config.service_names() {
            registry
                .register(ServiceInvoker::from_config(config, &name)?)
                .await;
        }
        Ok(registry)
    }

    /// Register `invoker` under its name, disposing any invoker it replaces.
    pub async fn register(&self, invoker: ServiceInvoker) -> Arc<ServiceInvoker> {
        let invoker = Arc::new(invoker);
        let replaced = self
            .invokers
            .write()
            .await
            .insert(invoker.name().to_string(), Arc::clone(&invoker));

        if let Some(previous) = replaced {
            warn!("Replacing invoker for service: {}", previous.name());
            previous.dispose();
        }
        invoker
    }

    pub async fn get(&self, name: &str) -> Option<Arc<ServiceInvoker>> {
        self.invokers.read().await.get(name).cloned()
    }

    pub async fn names(&self) -> Vec<String> {
        self.invokers.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.invokers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.invokers.read().await.is_empty()
    }

    /// Dispose every registered invoker. Handles already given out stay
    /// usable as values but refuse new requests.
    pub async fn dispose_all(&self) {
        let invokers = self.invokers.read().await;
        for invoker in invokers.values() {
            invoker.dispose();
        }
        info!("Disposed {} service invoker(s)", invokers.len());
    }
}
