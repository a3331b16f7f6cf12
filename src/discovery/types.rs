//! Types for Service Discovery
//!
//! Credentials handed to each resolve call and the validated result it
//! produces.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::catalog::CatalogEntry;
use crate::error::{ConciergeError, Result};

/// Model access credentials, supplied by the caller per resolve call
#[derive(Debug, Clone)]
pub struct Credentials {
    api_key: SecretString,
    base_endpoint: String,
}

impl Credentials {
    pub fn new<K: Into<String>, E: Into<String>>(api_key: K, base_endpoint: E) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            base_endpoint: base_endpoint.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    pub fn base_endpoint(&self) -> &str {
        &self.base_endpoint
    }

    /// Both fields are non-blank
    pub fn is_configured(&self) -> bool {
        self.ensure_present().is_ok()
    }

    /// Fail with [`ConciergeError::MissingCredentials`] if a field is blank
    pub fn ensure_present(&self) -> Result<()> {
        if self.api_key().trim().is_empty() {
            return Err(ConciergeError::missing_credentials("API key"));
        }
        if self.base_endpoint.trim().is_empty() {
            return Err(ConciergeError::missing_credentials("Base URL"));
        }
        Ok(())
    }

    /// `{base_endpoint}/chat/completions`, tolerating a trailing slash
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_endpoint.trim().trim_end_matches('/'))
    }
}

/// Outcome of one resolve call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResult {
    /// Short natural language answer
    pub answer: String,
    /// At most three catalog entries, in the model's order
    pub relevant_services: Vec<CatalogEntry>,
}
