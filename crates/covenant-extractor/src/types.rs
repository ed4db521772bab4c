//! Candidate and report types for extraction

use covenant_domain::Obligation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A loosely-typed obligation candidate recovered from a model response
///
/// Every field beyond `text`/`original_text` is optional, and fields the
/// model is known to mistype (numbers as strings, booleans as strings) stay
/// as raw JSON values so the normalizer can coerce them. Presence of the
/// required fields is enforced at the parser boundary, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObligationCandidate {
    /// One-sentence summary of the obligation
    pub text: Option<String>,

    /// Verbatim clause wording
    pub original_text: Option<String>,

    /// Free-text category
    #[serde(rename = "type")]
    pub category: Option<String>,

    /// Start date as emitted by the model
    pub start_date: Option<String>,

    /// Due date as emitted by the model
    pub due_date: Option<String>,

    /// Responsible party
    pub responsible_party: Option<String>,

    /// Priority as emitted by the model
    pub priority: Option<String>,

    /// Clause number from the contract
    pub clause_number: Option<String>,

    /// Section name from the contract
    pub section_name: Option<String>,

    /// Page number, possibly a string
    pub page_number: Option<Value>,

    /// Confidence score, possibly a string or float
    pub confidence_score: Option<Value>,

    /// Recurrence flag, possibly a string
    pub is_recurring: Option<Value>,

    /// Recurrence pattern name
    pub recurrence_type: Option<String>,

    /// Interval between occurrences, possibly a string
    pub recurrence_interval: Option<Value>,

    /// Day of month/week, possibly a string
    pub recurrence_day: Option<Value>,

    /// Month of year, possibly a string
    pub recurrence_month: Option<Value>,

    /// Description of a custom recurrence pattern
    pub recurrence_custom_text: Option<String>,
}

impl ObligationCandidate {
    /// Whether the candidate carries the fields required at the parser
    /// boundary. Salvage tiers relax the `original_text` requirement.
    pub fn has_required_fields(&self, require_original: bool) -> bool {
        let has_text = self.text.as_deref().is_some_and(|t| !t.trim().is_empty());
        if !require_original {
            return has_text;
        }
        has_text
            && self
                .original_text
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty())
    }
}

/// A loosely-typed single-clause analysis candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClauseCandidate {
    /// Free-text category
    #[serde(rename = "type")]
    pub category: Option<String>,

    /// Start date as emitted by the model
    pub start_date: Option<String>,

    /// Due date as emitted by the model
    pub due_date: Option<String>,

    /// Responsible party
    pub responsible_party: Option<String>,

    /// Priority as emitted by the model
    pub priority: Option<String>,

    /// Confidence score, possibly a string or float
    pub confidence_score: Option<Value>,
}

impl ClauseCandidate {
    /// Whether any field at all was recovered
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.start_date.is_none()
            && self.due_date.is_none()
            && self.responsible_party.is_none()
            && self.priority.is_none()
            && self.confidence_score.is_none()
    }
}

/// Outcome of processing one chunk
///
/// Rate limits never appear here: they abort the run and surface as an
/// error from `extract`, so aggregation stays a visible state machine
/// instead of implicit catch blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The chunk contributed records
    Extracted {
        /// Chunk index (0-based)
        index: usize,
        /// Number of records contributed
        count: usize,
    },

    /// The chunk was skipped after a non-fatal failure
    Skipped {
        /// Chunk index (0-based)
        index: usize,
        /// Human-readable failure reason
        reason: String,
    },
}

/// Result of a document extraction run
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// Normalized records, concatenated in chunk order
    pub obligations: Vec<Obligation>,

    /// Per-chunk outcomes, in chunk order
    pub outcomes: Vec<ChunkOutcome>,

    /// Metadata about the run
    pub metadata: ExtractionMetadata,
}

/// Metadata about an extraction run
#[derive(Debug, Clone)]
pub struct ExtractionMetadata {
    /// Document identifier
    pub document_id: String,

    /// Model identifier used
    pub model_name: String,

    /// Number of chunks the document split into
    pub chunk_count: usize,

    /// Number of chunks skipped after non-fatal failures
    pub chunks_skipped: usize,

    /// Total candidates the parser recovered before normalization
    pub candidates_attempted: usize,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: u64,
}
