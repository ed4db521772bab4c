//! Field normalization into the canonical obligation schema
//!
//! Normalization never fails: malformed values are dropped or defaulted,
//! because by the time a candidate reaches this point the expensive model
//! call has already been paid for. Silent correction beats rejection.

use crate::types::{ClauseCandidate, ObligationCandidate};
use chrono::NaiveDate;
use covenant_domain::{ClauseAnalysis, Obligation, ObligationStatus, Priority, RecurrenceType};
use serde_json::Value;
use tracing::debug;

/// Audit actor recorded on records the pipeline creates
pub const EXTRACTION_ACTOR: &str = "extractor";

const DEFAULT_CATEGORY: &str = "other";

/// Normalize a candidate into the canonical obligation record
///
/// Always produces a usable record. Dates that do not parse are omitted,
/// unknown priorities fall back to medium, and an unrecognized recurrence
/// type is remapped to `custom` with the original value preserved in
/// `recurrence_custom_text`.
pub fn normalize(candidate: &ObligationCandidate, document_id: &str) -> Obligation {
    let (recurrence_type, remap_text) = normalize_recurrence_type(candidate.recurrence_type.as_deref());

    Obligation {
        document_id: document_id.to_string(),
        text: candidate.text.clone().unwrap_or_default(),
        original_text: candidate
            .original_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
        category: normalize_category(candidate.category.as_deref()),
        status: ObligationStatus::Pending,
        priority: normalize_priority(candidate.priority.as_deref()),
        start_date: candidate.start_date.as_deref().and_then(parse_date),
        due_date: candidate.due_date.as_deref().and_then(parse_date),
        responsible_party: non_blank(candidate.responsible_party.as_deref()),
        clause_number: non_blank(candidate.clause_number.as_deref()),
        section_name: non_blank(candidate.section_name.as_deref()),
        page_number: candidate.page_number.as_ref().and_then(coerce_int),
        confidence_score: candidate
            .confidence_score
            .as_ref()
            .and_then(coerce_int)
            .map(|score| score.clamp(0, 100)),
        is_recurring: candidate
            .is_recurring
            .as_ref()
            .and_then(coerce_bool)
            .unwrap_or(false),
        recurrence_type,
        recurrence_interval: candidate.recurrence_interval.as_ref().and_then(coerce_int),
        recurrence_day: candidate.recurrence_day.as_ref().and_then(coerce_int),
        recurrence_month: candidate.recurrence_month.as_ref().and_then(coerce_int),
        recurrence_custom_text: remap_text
            .or_else(|| non_blank(candidate.recurrence_custom_text.as_deref())),
        created_by: EXTRACTION_ACTOR.to_string(),
        modified_by: EXTRACTION_ACTOR.to_string(),
    }
}

/// Normalize a single-clause analysis candidate
pub fn normalize_clause(candidate: &ClauseCandidate) -> ClauseAnalysis {
    ClauseAnalysis {
        category: normalize_category(candidate.category.as_deref()),
        start_date: candidate.start_date.as_deref().and_then(parse_date),
        due_date: candidate.due_date.as_deref().and_then(parse_date),
        responsible_party: non_blank(candidate.responsible_party.as_deref()),
        priority: normalize_priority(candidate.priority.as_deref()),
        confidence_score: candidate
            .confidence_score
            .as_ref()
            .and_then(coerce_int)
            .map(|score| score.clamp(0, 100)),
    }
}

fn normalize_category(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.to_lowercase(),
        None => DEFAULT_CATEGORY.to_string(),
    }
}

fn normalize_priority(value: Option<&str>) -> Priority {
    match value {
        Some(v) => Priority::parse(v).unwrap_or_default(),
        None => Priority::default(),
    }
}

/// Returns the coerced recurrence type plus, for unrecognized values, the
/// text to record in `recurrence_custom_text`
fn normalize_recurrence_type(value: Option<&str>) -> (RecurrenceType, Option<String>) {
    let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return (RecurrenceType::None, None);
    };
    match RecurrenceType::parse(v) {
        Some(recurrence) => (recurrence, None),
        None => {
            debug!(value = v, "unrecognized recurrence type remapped to custom");
            (RecurrenceType::Custom, Some(format!("Original type: {}", v)))
        }
    }
}

/// Parse a calendar date leniently; invalid values are dropped, never stored
fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    // Datetime strings: take the date part
    if let Some(prefix) = trimmed.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date);
        }
    }

    None
}

/// Coerce a JSON value to an integer: accepts integers, whole floats, and
/// numeric strings
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Coerce a JSON value to a boolean: accepts booleans and "true"/"false"
fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
