//! Covenant LLM Provider Layer
//!
//! Implementations of the `CompletionProvider` trait from `covenant-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: deterministic mock for testing, with a scriptable
//!   per-call response queue
//! - `AnthropicProvider`: HTTP client for the Anthropic Messages API
//!
//! # Examples
//!
//! ```
//! use covenant_llm::MockProvider;
//! use covenant_domain::{CompletionProvider, CompletionRequest};
//!
//! let provider = MockProvider::new(r#"{"obligations":[]}"#);
//! let request = CompletionRequest {
//!     system: "instructions".to_string(),
//!     user: "contract text".to_string(),
//!     max_tokens: 4000,
//! };
//! let result = provider.complete(&request).unwrap();
//! assert_eq!(result, r#"{"obligations":[]}"#);
//! ```

#![warn(missing_docs)]

pub mod anthropic;

use covenant_domain::{CompletionError, CompletionProvider, CompletionRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub use anthropic::AnthropicProvider;

/// Mock completion provider for deterministic testing
///
/// Returns a fixed default response; when responses and errors have been
/// scripted with `push_response`/`push_error`, it consumes the script in
/// order, one entry per call. This lets orchestrator tests fail a specific
/// chunk (e.g. rate-limit chunk 2 of 3) without any network.
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    script: Arc<Mutex<VecDeque<Result<String, CompletionError>>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockProvider {
    /// Create a provider that returns `response` for every call
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Queue a response for the next unscripted call
    pub fn push_response(&self, response: impl Into<String>) {
        self.script.lock().unwrap().push_back(Ok(response.into()));
    }

    /// Queue an error for the next unscripted call
    pub fn push_error(&self, error: CompletionError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Number of times `complete` was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(r#"{"obligations":[]}"#)
    }
}

impl CompletionProvider for MockProvider {
    fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
        *self.call_count.lock().unwrap() += 1;

        if let Some(scripted) = self.script.lock().unwrap().pop_front() {
            return scripted;
        }

        Ok(self.default_response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "system".to_string(),
            user: "user".to_string(),
            max_tokens: 100,
        }
    }

    #[test]
    fn test_mock_default_response() {
        let provider = MockProvider::new("fixed");
        assert_eq!(provider.complete(&request()).unwrap(), "fixed");
        assert_eq!(provider.complete(&request()).unwrap(), "fixed");
        assert_eq!(provider.call_count(), 2);
    }

    #[test]
    fn test_mock_scripted_responses_in_order() {
        let provider = MockProvider::new("default");
        provider.push_response("first");
        provider.push_response("second");

        assert_eq!(provider.complete(&request()).unwrap(), "first");
        assert_eq!(provider.complete(&request()).unwrap(), "second");
        // Script exhausted, falls back to the default
        assert_eq!(provider.complete(&request()).unwrap(), "default");
    }

    #[test]
    fn test_mock_scripted_rate_limit() {
        let provider = MockProvider::new("default");
        provider.push_error(CompletionError::RateLimited {
            retry_after_secs: 30,
        });

        let err = provider.complete(&request()).unwrap_err();
        assert_eq!(err, CompletionError::RateLimited { retry_after_secs: 30 });
    }

    #[test]
    fn test_check_status_healthy_by_default() {
        let provider = MockProvider::default();
        assert!(provider.check_status().is_ok());
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn test_check_status_reports_scripted_failure() {
        let provider = MockProvider::default();
        provider.push_error(CompletionError::Http {
            status: 503,
            message: "unavailable".to_string(),
        });

        let err = provider.check_status().unwrap_err();
        assert!(matches!(err, CompletionError::Http { status: 503, .. }));
    }

    #[test]
    fn test_mock_clone_shares_state() {
        let provider1 = MockProvider::new("x");
        let provider2 = provider1.clone();

        provider1.complete(&request()).unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
