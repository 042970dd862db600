mod error;
mod paths;
