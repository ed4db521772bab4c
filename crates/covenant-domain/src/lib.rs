//! Covenant Domain Layer
//!
//! Core domain model for the Covenant obligation-extraction pipeline.
//! This crate defines the canonical obligation schema, the enumerations the
//! normalizer coerces into, and the trait boundary for the external
//! text-completion service. Infrastructure implementations (HTTP providers,
//! the pipeline itself) live in other crates.
//!
//! ## Key Concepts
//!
//! - **Obligation**: the normalized, persisted shape of a contractual duty
//!   extracted from a document
//! - **ClauseAnalysis**: the single-clause analysis result (one object, not
//!   a collection)
//! - **CompletionProvider**: the boundary trait for the external LLM
//!   completion service, including rate-limit failure classification

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clause;
pub mod obligation;
pub mod traits;

// Re-exports for convenience
pub use clause::ClauseAnalysis;
pub use obligation::{Obligation, ObligationStatus, Priority, RecurrenceType};
pub use traits::{CompletionError, CompletionProvider, CompletionRequest};
