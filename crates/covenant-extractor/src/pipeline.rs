//! Document-level extraction orchestration
//!
//! Chunks are processed strictly sequentially, never in parallel, to respect
//! the completion service's rate limits and keep retry semantics
//! deterministic. One malformed response skips one chunk; a rate limit
//! aborts the run and surfaces the retry delay to the caller.

use crate::chunking::DocumentChunker;
use crate::client::ExtractionClient;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::normalizer::{normalize, normalize_clause};
use crate::parser::{parse_obligations, parse_single};
use crate::types::{ChunkOutcome, ExtractionMetadata, ExtractionReport};
use covenant_domain::{ClauseAnalysis, CompletionProvider, Obligation};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// The pipeline orchestrator: document text in, obligation records out
pub struct ObligationExtractor<P: CompletionProvider> {
    client: ExtractionClient<P>,
    config: ExtractorConfig,
}

impl<P> ObligationExtractor<P>
where
    P: CompletionProvider + Send + Sync + 'static,
{
    /// Create an extractor over the given provider
    pub fn new(provider: P, config: ExtractorConfig) -> Self {
        let provider = Arc::new(provider);
        Self {
            client: ExtractionClient::new(provider, &config),
            config,
        }
    }

    /// Extract obligation records from a document
    ///
    /// # Errors
    ///
    /// - `EmptyDocument` for blank input
    /// - `TextTooLong` when the document exceeds the configured limit
    /// - `RateLimited` when the service throttles mid-run; progress already
    ///   aggregated is intentionally discarded so the caller can retry the
    ///   whole document after the delay
    ///
    /// Any other per-chunk failure is absorbed: the chunk contributes zero
    /// records and processing continues.
    pub async fn extract(
        &self,
        text: &str,
        document_id: &str,
    ) -> Result<ExtractionReport, ExtractorError> {
        let start = Instant::now();

        if text.len() > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(
                text.len(),
                self.config.max_text_length,
            ));
        }

        let chunks = DocumentChunker::new(self.config.max_chunk_size).split(text)?;
        let total = chunks.len();

        info!(document_id, chunks = total, chars = text.len(), "starting extraction");

        let mut obligations: Vec<Obligation> = Vec::new();
        let mut outcomes: Vec<ChunkOutcome> = Vec::with_capacity(total);
        let mut candidates_attempted = 0usize;

        for (index, chunk) in chunks.iter().enumerate() {
            match self.process_chunk(chunk, index, total, document_id).await {
                Ok(records) => {
                    candidates_attempted += records.len();
                    outcomes.push(ChunkOutcome::Extracted {
                        index,
                        count: records.len(),
                    });
                    obligations.extend(records);
                }
                Err(error @ ExtractorError::RateLimited { .. }) => {
                    warn!(
                        document_id,
                        chunk = index + 1,
                        total,
                        "rate limited, aborting document run"
                    );
                    return Err(error);
                }
                Err(error) => {
                    warn!(
                        document_id,
                        chunk = index + 1,
                        total,
                        error = %error,
                        "chunk skipped"
                    );
                    outcomes.push(ChunkOutcome::Skipped {
                        index,
                        reason: error.to_string(),
                    });
                }
            }
        }

        let chunks_skipped = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, ChunkOutcome::Skipped { .. }))
            .count();

        info!(
            document_id,
            extracted = obligations.len(),
            skipped = chunks_skipped,
            "extraction complete"
        );

        Ok(ExtractionReport {
            obligations,
            outcomes,
            metadata: ExtractionMetadata {
                document_id: document_id.to_string(),
                model_name: self.config.model.clone(),
                chunk_count: total,
                chunks_skipped,
                candidates_attempted,
                processing_time_ms: start.elapsed().as_millis() as u64,
            },
        })
    }

    /// Analyze one isolated clause (single-object mode)
    pub async fn analyze_clause(&self, text: &str) -> Result<ClauseAnalysis, ExtractorError> {
        if text.trim().is_empty() {
            return Err(ExtractorError::EmptyDocument);
        }

        let raw = self.client.analyze_clause(text).await?;
        let candidate = parse_single(&raw)?;
        Ok(normalize_clause(&candidate))
    }

    async fn process_chunk(
        &self,
        chunk: &str,
        index: usize,
        total: usize,
        document_id: &str,
    ) -> Result<Vec<Obligation>, ExtractorError> {
        let raw = self
            .client
            .extract_chunk(chunk, index, total, document_id)
            .await?;
        let candidates = parse_obligations(&raw)?;
        Ok(candidates
            .iter()
            .map(|candidate| normalize(candidate, document_id))
            .collect())
    }
}
