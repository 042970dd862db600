mod config;
mod helpers;
mod invoker;
mod lifecycle;
