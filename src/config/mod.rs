//! Configuration module for the catalog concierge
//!
//! This module provides configuration management and loading utilities.

mod config;

// Re-export the main configuration types
pub use config::{
    CatalogConfig, CompletionConfig, Config, CredentialsConfig, EnvVars, LoggingConfig,
    DEFAULT_BASE_URL,
};
