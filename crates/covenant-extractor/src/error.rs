//! Error types for the extraction pipeline

use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Document text was empty or blank (fatal, aborts before chunking)
    #[error("no text provided for obligation extraction")]
    EmptyDocument,

    /// Document exceeds the configured maximum length
    #[error("text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// The completion service signalled too many requests.
    /// Propagated to the document-level caller, never retried internally.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// Transient completion-service failure (caught at chunk granularity)
    #[error("completion service error: {0}")]
    Service(String),

    /// The completion call outlived the configured timeout
    #[error("extraction timed out")]
    Timeout,

    /// All recovery parser tiers were exhausted for a response
    #[error("unrecoverable response format: {0}")]
    Unrecoverable(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}
