//! Trait boundary for the external text-completion service
//!
//! The pipeline never talks HTTP directly; it goes through
//! `CompletionProvider`. Provider implementations live in `covenant-llm`.

use thiserror::Error;

/// One request to the completion service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// System instruction describing the expected output contract
    pub system: String,

    /// User message carrying the text to analyze
    pub user: String,

    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

/// Failure classification for completion calls
///
/// Rate limits are carried separately from other service failures because
/// the orchestrator treats them differently: a rate limit aborts the
/// document run, any other failure only skips the current chunk.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// The service signalled too many requests
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying, from the response or defaulted
        retry_after_secs: u64,
    },

    /// Non-success HTTP status other than a rate limit
    #[error("service returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body or status text
        message: String,
    },

    /// Transport-level failure (connect, timeout, DNS)
    #[error("network error: {0}")]
    Network(String),

    /// The service responded but the payload shape was unusable
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Trait for text-completion providers
///
/// Implementations perform one network call per invocation and never retry
/// internally; retry and backoff policy belongs to the caller.
pub trait CompletionProvider {
    /// Send one completion request and return the response text payload
    fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;

    /// Verify the service is reachable with a minimal ten-token request
    ///
    /// The response text is discarded; only the failure classification
    /// matters to callers surfacing service health.
    fn check_status(&self) -> Result<(), CompletionError> {
        let request = CompletionRequest {
            system: String::new(),
            user: "API check".to_string(),
            max_tokens: 10,
        };
        self.complete(&request).map(|_| ())
    }
}
