//! Chat completion client
//!
//! Defines the [`CompletionClient`] seam and the OpenAI-compatible
//! implementation used in production.
//!
//! # Failure mapping
//!
//! - non-2xx status → [`ConciergeError::UpstreamHttp`] with the response body
//! - connect / TLS / body read failure → [`ConciergeError::Network`]
//! - 2xx without `choices[0].message.content` → [`ConciergeError::EmptyCompletion`]
//!
//! Exactly one request is made per call. There are no retries, and no timeout
//! is set on the HTTP client; callers that need bounded latency wrap the call.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::prompt::PromptMessages;
use super::types::Credentials;
use crate::error::{ConciergeError, Result};

/// Model identifier sent with every request
pub const COMPLETION_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature; low to keep answers and picks stable
pub const COMPLETION_TEMPERATURE: f64 = 0.3;

/// Sends the system and user messages to a text completion endpoint and
/// returns the raw text of the first completion.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, credentials: &Credentials, prompt: &PromptMessages) -> Result<String>;
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for std::sync::Arc<T> {
    async fn complete(&self, credentials: &Credentials, prompt: &PromptMessages) -> Result<String> {
        (**self).complete(credentials, prompt).await
    }
}

/// OpenAI API request structure
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
}

/// OpenAI message structure
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// OpenAI API response structure
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// OpenAI choice structure
#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatResponseMessage>,
}

/// OpenAI response message structure
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for `POST {base_endpoint}/chat/completions`
#[derive(Debug, Clone)]
pub struct OpenAiCompletionClient {
    client: Client,
}

impl OpenAiCompletionClient {
    /// Create a client with rustls and the built-in root certificates
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .use_rustls_tls()
            .tls_built_in_root_certs(true)
            .build()
            .map_err(|e| ConciergeError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, credentials: &Credentials, prompt: &PromptMessages) -> Result<String> {
        let url = credentials.completions_url();
        let request_body = ChatCompletionRequest {
            model: COMPLETION_MODEL,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: COMPLETION_TEMPERATURE,
        };

        info!("Calling chat completions at {} with model {}", url, COMPLETION_MODEL);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", credentials.api_key()))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!("Completion request failed: {}", e);
                ConciergeError::network(format!("Completion request failed: {}", e))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            ConciergeError::network(format!("Failed to read completion response: {}", e))
        })?;

        if !status.is_success() {
            error!("Completion endpoint returned {}", status);
            return Err(ConciergeError::upstream_http(status.as_u16(), response_text));
        }

        extract_content(&response_text)
    }
}

/// Pull `choices[0].message.content` out of a success body
fn extract_content(response_text: &str) -> Result<String> {
    let parsed: ChatCompletionResponse = serde_json::from_str(response_text).map_err(|e| {
        debug!("Completion body is not a chat completion object: {}", e);
        ConciergeError::EmptyCompletion
    })?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.is_empty())
        .ok_or(ConciergeError::EmptyCompletion)?;

    debug!("Completion received: {} bytes", content.len());
    Ok(content)
}
