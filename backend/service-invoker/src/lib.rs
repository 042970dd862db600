//! Pre-wired HTTP clients for calling external services.
//!
//! Given per-service [`ClientProperties`], [`ServiceInvoker`] assembles a
//! pooled `reqwest` transport with connect/socket/response timeouts, a
//! masking request logger, optional basic auth and an error translator, and
//! owns the transport until it is disposed.

pub mod config;
pub mod correlation;
pub mod error;
pub mod error_translator;
pub mod http;
pub mod interceptor;
pub mod invoker;
pub mod masking;
pub mod observation;
pub mod transport;

#[cfg(test)]
mod tests;

pub use config::{ClientProperties, ServicesConfig};
pub use error::{ConfigError, ErrorKind, InvokerError};
pub use error_translator::{ErrorClass, ErrorTranslatorConfig, ExceptionExtractType, LocalError};
pub use http::{HttpResponse, RequestContext};
pub use invoker::registry::InvokerRegistry;
pub use invoker::{ServiceInvoker, resolve_url};
pub use masking::{FieldMasker, MaskingRule, MaskingRules, MaskingStrategy};
pub use observation::{Observation, ObservationSink, Outcome};

pub use reqwest::Method;
