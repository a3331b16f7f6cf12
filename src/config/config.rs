//! Configuration management for the catalog concierge
//!
//! Precedence, lowest to highest: `.env` files < YAML file < environment
//! variables < CLI flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::discovery::Credentials;
use crate::error::{ConciergeError, Result};

/// Endpoint used when none is configured
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_key_env() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/services.json")
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Environment variable names read by the concierge
pub struct EnvVars;

impl EnvVars {
    pub const ENV: &'static str = "CONCIERGE_ENV";
    pub const API_KEY: &'static str = "CONCIERGE_API_KEY";
    pub const BASE_URL: &'static str = "CONCIERGE_BASE_URL";
    pub const CATALOG_PATH: &'static str = "CONCIERGE_CATALOG_PATH";
    pub const LOG_LEVEL: &'static str = "CONCIERGE_LOG_LEVEL";
    pub const REQUEST_TIMEOUT: &'static str = "CONCIERGE_REQUEST_TIMEOUT_SECS";
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion endpoint credentials
    #[serde(default)]
    pub credentials: CredentialsConfig,
    /// Catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Caller-side completion settings
    #[serde(default)]
    pub completion: CompletionConfig,
    /// Logging configuration
    pub logging: Option<LoggingConfig>,
}

/// Credentials as written in the config store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// API key; prefer `api_key_env` over writing keys into files
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable to read the key from when `api_key` is unset
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
        }
    }
}

/// Catalog source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON array export of the service catalog
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

/// Completion settings owned by the caller, not the resolver
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Upper bound on one resolve call, in seconds. Unset means wait forever.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl CompletionConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, text)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Result<()> {
        match self.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConciergeError::config(format!(
                    "Invalid log level: '{}'. Valid levels: trace, debug, info, warn, error",
                    self.level
                )))
            }
        }

        match self.format.to_lowercase().as_str() {
            "json" | "text" => {}
            _ => {
                return Err(ConciergeError::config(format!(
                    "Invalid log format: '{}'. Valid formats: json, text",
                    self.format
                )))
            }
        }

        Ok(())
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load .env files in order of precedence
    fn load_env_files() {
        let env = std::env::var(EnvVars::ENV).unwrap_or_else(|_| "development".to_string());

        let env_specific_file = format!(".env.{}", env);
        let env_files = [".env", env_specific_file.as_str(), ".env.local"];

        for env_file in env_files {
            match dotenvy::from_filename(env_file) {
                Ok(_) => {
                    tracing::info!("Loaded environment variables from {}", env_file);
                }
                Err(e) if e.not_found() => {
                    tracing::debug!("No {} file found, skipping", env_file);
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", env_file, e);
                }
            }
        }
    }

    /// Load configuration from file with environment variables and CLI overrides
    pub fn load<P: AsRef<Path>>(path: P, log_level_override: Option<String>) -> Result<Self> {
        Self::load_env_files();
        Self::load_with(path, log_level_override, |name| std::env::var(name).ok())
    }

    /// Load from file, resolving overrides through `lookup` instead of the
    /// process environment. No `.env` files are read.
    pub fn load_with<P, F>(path: P, log_level_override: Option<String>, lookup: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.as_ref().exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                ConciergeError::config(format!("Failed to read config file: {}", e))
            })?;
            Self::from_yaml_str(&content)?
        } else {
            tracing::warn!(
                "Config file {} not found, using defaults",
                path.as_ref().display()
            );
            Self::default()
        };

        config.apply_overrides_from(lookup)?;

        if let Some(level) = log_level_override {
            config.logging.get_or_insert_with(LoggingConfig::default).level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse YAML text without applying overrides
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| ConciergeError::config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        // a blank key in the file counts as unset
        if self
            .credentials
            .api_key
            .as_deref()
            .map_or(false, |key| key.trim().is_empty())
        {
            self.credentials.api_key = None;
        }

        if let Some(api_key) = var(EnvVars::API_KEY) {
            self.credentials.api_key = Some(api_key);
        } else if self.credentials.api_key.is_none() {
            if let Some(env_name) = self.credentials.api_key_env.clone() {
                if let Some(api_key) = var(&env_name) {
                    tracing::debug!("Using API key from {}", env_name);
                    self.credentials.api_key = Some(api_key);
                }
            }
        }

        if let Some(base_url) = var(EnvVars::BASE_URL) {
            self.credentials.base_url = base_url;
        }

        if let Some(path) = var(EnvVars::CATALOG_PATH) {
            self.catalog.path = PathBuf::from(path);
        }

        if let Some(level) = var(EnvVars::LOG_LEVEL) {
            self.logging.get_or_insert_with(LoggingConfig::default).level = level;
        }

        if let Some(timeout) = var(EnvVars::REQUEST_TIMEOUT) {
            let secs = timeout.trim().parse().map_err(|e| {
                ConciergeError::config(format!(
                    "Invalid {} environment variable: {}",
                    EnvVars::REQUEST_TIMEOUT,
                    e
                ))
            })?;
            self.completion.request_timeout_secs = Some(secs);
        }

        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Missing credentials are not a configuration error: the session rejects
    /// submissions until they are provided.
    pub fn validate(&self) -> Result<()> {
        let base_url = self.credentials.base_url.trim();
        if !base_url.is_empty() {
            let parsed = url::Url::parse(base_url).map_err(|e| {
                ConciergeError::config(format!("Invalid credentials.base_url '{}': {}", base_url, e))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConciergeError::config(format!(
                    "credentials.base_url must use http or https, got '{}'",
                    parsed.scheme()
                )));
            }
        }

        if self.catalog.path.as_os_str().is_empty() {
            return Err(ConciergeError::config("catalog.path cannot be empty"));
        }

        if self.completion.request_timeout_secs == Some(0) {
            return Err(ConciergeError::config(
                "completion.request_timeout_secs must be > 0",
            ));
        }

        if let Some(ref logging) = self.logging {
            logging.validate()?;
        }

        Ok(())
    }

    /// Credentials for resolve calls, if both fields are set
    pub fn credentials(&self) -> Option<Credentials> {
        Some(self.request_credentials()).filter(Credentials::is_configured)
    }

    /// Credentials exactly as configured, possibly blank. Resolving with blank
    /// credentials fails before any request is sent.
    pub fn request_credentials(&self) -> Credentials {
        Credentials::new(
            self.credentials.api_key.as_deref().unwrap_or_default().trim(),
            self.credentials.base_url.trim(),
        )
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }
}
