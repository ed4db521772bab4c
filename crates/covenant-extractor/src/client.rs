//! One completion call per chunk, with failure classification

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::prompt::{clause_analysis_request, PromptBuilder};
use covenant_domain::{CompletionError, CompletionProvider, CompletionRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

// The single-clause prompt asks for one small object
const CLAUSE_MAX_TOKENS: u32 = 1_000;

/// Wraps a single call to the completion service: builds the prompt for one
/// chunk, sends it, and classifies failures. Performs no retries; retry
/// and backoff policy belongs to the orchestrator's caller.
pub struct ExtractionClient<P: CompletionProvider> {
    provider: Arc<P>,
    call_timeout: Duration,
    max_tokens: u32,
}

impl<P> ExtractionClient<P>
where
    P: CompletionProvider + Send + Sync + 'static,
{
    /// Create a client over the given provider
    pub fn new(provider: Arc<P>, config: &ExtractorConfig) -> Self {
        Self {
            provider,
            call_timeout: config.extraction_timeout(),
            max_tokens: config.max_tokens,
        }
    }

    /// Request obligation extraction for one chunk, returning the raw
    /// response text
    pub async fn extract_chunk(
        &self,
        chunk: &str,
        chunk_index: usize,
        total_chunks: usize,
        document_id: &str,
    ) -> Result<String, ExtractorError> {
        debug!(
            document_id,
            chunk = chunk_index + 1,
            total = total_chunks,
            chars = chunk.len(),
            "requesting extraction"
        );
        let request = PromptBuilder::new(chunk)
            .position(chunk_index, total_chunks)
            .build(self.max_tokens);
        self.send(request).await
    }

    /// Request single-clause analysis, returning the raw response text
    pub async fn analyze_clause(&self, text: &str) -> Result<String, ExtractorError> {
        let request = clause_analysis_request(text, CLAUSE_MAX_TOKENS.min(self.max_tokens));
        self.send(request).await
    }

    async fn send(&self, request: CompletionRequest) -> Result<String, ExtractorError> {
        let provider = Arc::clone(&self.provider);
        let call = tokio::task::spawn_blocking(move || provider.complete(&request));

        match timeout(self.call_timeout, call).await {
            Err(_) => Err(ExtractorError::Timeout),
            Ok(Err(join_error)) => {
                Err(ExtractorError::Service(format!("task join error: {}", join_error)))
            }
            Ok(Ok(result)) => result.map_err(classify),
        }
    }
}

/// Map provider failures to pipeline errors: rate limits keep their retry
/// delay, everything else degrades to a per-chunk service error
fn classify(error: CompletionError) -> ExtractorError {
    match error {
        CompletionError::RateLimited { retry_after_secs } => {
            ExtractorError::RateLimited { retry_after_secs }
        }
        other => ExtractorError::Service(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_llm::MockProvider;

    fn client(provider: MockProvider) -> ExtractionClient<MockProvider> {
        ExtractionClient::new(Arc::new(provider), &ExtractorConfig::default())
    }

    #[tokio::test]
    async fn test_extract_chunk_returns_response_text() {
        let provider = MockProvider::new("raw response");
        let client = client(provider);

        let response = client.extract_chunk("chunk text", 0, 1, "doc").await.unwrap();
        assert_eq!(response, "raw response");
    }

    #[tokio::test]
    async fn test_rate_limit_classified_with_delay() {
        let provider = MockProvider::new("unused");
        provider.push_error(CompletionError::RateLimited { retry_after_secs: 42 });
        let client = client(provider);

        let err = client.extract_chunk("chunk", 0, 1, "doc").await.unwrap_err();
        assert!(matches!(
            err,
            ExtractorError::RateLimited { retry_after_secs: 42 }
        ));
    }

    #[tokio::test]
    async fn test_other_failures_become_service_errors() {
        let provider = MockProvider::new("unused");
        provider.push_error(CompletionError::Http {
            status: 500,
            message: "overloaded".to_string(),
        });
        let client = client(provider);

        let err = client.extract_chunk("chunk", 0, 1, "doc").await.unwrap_err();
        assert!(matches!(err, ExtractorError::Service(_)));
    }
}
