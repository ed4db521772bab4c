//! Anthropic Messages API provider
//!
//! Sends one completion request per invocation and classifies failures for
//! the orchestrator: HTTP 429 becomes `CompletionError::RateLimited` with
//! the retry delay read from the `retry-after` header (60 seconds when the
//! header is absent or unparseable). The provider performs no retries of its
//! own; retry and backoff policy belongs to the caller.
//!
//! # Examples
//!
//! ```no_run
//! use covenant_llm::AnthropicProvider;
//!
//! let provider = AnthropicProvider::new("api-key", "claude-3-7-sonnet-20250219");
//! ```

use covenant_domain::{CompletionError, CompletionProvider, CompletionRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";

/// API version header value required by the Messages API
pub const API_VERSION: &str = "2023-06-01";

/// Default request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Retry delay assumed when a 429 carries no usable retry-after header
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Completion provider backed by the Anthropic Messages API
pub struct AnthropicProvider {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    // The status probe sends no system instruction
    #[serde(skip_serializing_if = "String::is_empty")]
    system: String,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl AnthropicProvider {
    /// Create a provider for the default endpoint
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT, api_key, model)
    }

    /// Create a provider for a custom endpoint (proxies, test servers)
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// Model identifier this provider sends
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one completion request
    ///
    /// # Errors
    ///
    /// - `RateLimited` on HTTP 429, with the retry-after delay
    /// - `Http` on any other non-success status
    /// - `Network` when the request never produced a response
    /// - `InvalidResponse` when the body has no text content block
    pub async fn complete_async(
        &self,
        request: &CompletionRequest,
    ) -> Result<String, CompletionError> {
        let url = format!("{}/v1/messages", self.endpoint);

        let body = MessagesRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            system: request.system.clone(),
            messages: vec![Message {
                role: "user",
                content: request.user.clone(),
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = retry_after_seconds(response.headers());
            return Err(CompletionError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            return Err(CompletionError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .ok_or_else(|| {
                CompletionError::InvalidResponse("no text content block".to_string())
            })
    }
}

/// Read the retry delay from a 429 response, in whole seconds
fn retry_after_seconds(headers: &reqwest::header::HeaderMap) -> u64 {
    headers
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            // Some gateways send fractional seconds
            value
                .parse::<u64>()
                .ok()
                .or_else(|| value.parse::<f64>().ok().map(|s| s.ceil() as u64))
        })
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

impl CompletionProvider for AnthropicProvider {
    fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        // Blocking wrapper; the orchestrator calls this through spawn_blocking
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CompletionError::Network(format!("runtime error: {}", e)))?;
        runtime.block_on(self.complete_async(request))
    }
}
