mod config;
mod error;
mod error_translator;
mod pool;
