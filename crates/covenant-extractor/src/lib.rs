//! Covenant Extractor
//!
//! Converts unstructured contract text into structured obligation records by
//! delegating semantic extraction to an LLM completion service and
//! recovering structured data from its output.
//!
//! # Architecture
//!
//! ```text
//! Text → Chunker → ExtractionClient → RecoveryParser → FieldNormalizer → Obligations
//! ```
//!
//! The hard problem is not calling the model, it is surviving the model: the
//! response channel is adversarial and non-deterministic. Responses arrive
//! wrapped in markdown fences, padded with prose, truncated mid-array, with
//! unquoted keys or single-quoted strings, or rate-limited mid-run. The
//! recovery parser applies a tiered chain of increasingly aggressive repair
//! strategies, and the normalizer coerces whatever survives into the
//! canonical schema instead of rejecting it.
//!
//! # Key Behaviors
//!
//! - **Chunking**: paragraph-boundary splitting with lossless rejoin
//! - **Layered recovery**: five parse tiers, first to yield candidates wins
//! - **Defensive normalization**: safe fallbacks, never a hard failure
//! - **Rate-limit isolation**: a 429 aborts the document run and surfaces
//!   the retry delay; any other per-chunk failure skips only that chunk
//!
//! # Example Usage
//!
//! ```no_run
//! use covenant_extractor::{ObligationExtractor, ExtractorConfig};
//! use covenant_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = MockProvider::new(
//!     r#"{"obligations":[{"text":"Pay rent","original_text":"Tenant shall pay rent"}]}"#,
//! );
//! let extractor = ObligationExtractor::new(provider, ExtractorConfig::default());
//!
//! let report = extractor.extract("Tenant shall pay rent monthly.", "doc_001").await?;
//! println!("Extracted {} obligations", report.obligations.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunking;
mod client;
mod config;
mod error;
mod normalizer;
mod parser;
mod pipeline;
mod prompt;
mod types;


pub use chunking::DocumentChunker;
pub use client::ExtractionClient;
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use normalizer::{normalize, normalize_clause};
pub use parser::{parse_obligations, parse_single};
pub use pipeline::ObligationExtractor;
pub use types::{
    ChunkOutcome, ClauseCandidate, ExtractionMetadata, ExtractionReport, ObligationCandidate,
};
