//! Configuration management module
//!
//! Responsible for loading the client configuration from environment variables and configuration files.

pub mod file;
pub mod settings;

pub use settings::{ApiClientConfig, LoggingConfig, Settings};
