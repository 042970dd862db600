//! Shared building blocks for the service invoker workspace.
//!
//! Small, dependency-light types used by every other crate:
//!
//! - [`ErrorLocation`]: call-site capture attached to every error variant
//! - [`HttpStatusCode`]: numeric status stored as-is, never parsed from text
//! - [`RedactedSecret`]: credential wrapper that never prints its value
//!
//! ## Architecture
//!
//! - **common** (this crate): leaf types, no I/O
//! - **service-invoker**: configuration, transport, interceptors, façade
//! - **sample**: application wiring logger, config and invokers together

pub mod error;
pub mod http_status;
pub mod redacted_secret;

#[cfg(test)]
mod tests;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use http_status::HttpStatusCode;
pub use redacted_secret::RedactedSecret;
