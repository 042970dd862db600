pub mod config;
pub mod invoker;

pub use config::ConfigError;
pub use invoker::{ErrorKind, InvokerError};
