//! Single-clause analysis result

use crate::obligation::Priority;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Analysis of one clause in isolation
///
/// Produced by the single-object extraction mode, where the model is asked
/// to categorize a clause the user already isolated rather than to find
/// obligations in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseAnalysis {
    /// Lower-cased category (payment, delivery, reporting, ...)
    #[serde(rename = "type")]
    pub category: String,

    /// When the obligation starts, if a valid date was extracted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// When the obligation must be fulfilled, if a valid date was extracted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Party responsible for fulfillment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_party: Option<String>,

    /// Priority, `medium` when absent or unrecognized
    pub priority: Priority,

    /// Model confidence in the analysis, 0-100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<i64>,
}
