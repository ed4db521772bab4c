//! Layered recovery parsing of model output
//!
//! Model output is adversarial: fenced, padded with prose, truncated,
//! mistyped. Parsing is a chain of tiers attempted in order of decreasing
//! confidence and increasing invasiveness; the first tier to yield at least
//! one candidate wins. Everything here is pure and stateless.

use crate::error::ExtractorError;
use crate::types::{ClauseCandidate, ObligationCandidate};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

static SINGLE_QUOTED_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([{,]\s*)'([^']*)'\s*:"#).expect("valid regex")
});

static BARE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:").expect("valid regex")
});

static SINGLE_QUOTED_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#":\s*'((?:[^'\\]|\\.)*)'"#).expect("valid regex")
});

static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));

// Innermost object-shaped substrings for the last-resort salvage tier
static FLAT_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}]*\}").expect("valid regex"));

// Per-field patterns for clause-analysis field salvage
static CATEGORY_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| string_field_regex("type"));
static START_DATE_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| string_field_regex("start_date"));
static DUE_DATE_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| string_field_regex("due_date"));
static RESPONSIBLE_PARTY_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| string_field_regex("responsible_party"));
static PRIORITY_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| string_field_regex("priority"));
static CONFIDENCE_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| numeric_field_regex("confidence_score"));

fn string_field_regex(name: &str) -> Regex {
    Regex::new(&format!(r#""{}"\s*:\s*"([^"]*)""#, name)).expect("valid regex")
}

fn numeric_field_regex(name: &str) -> Regex {
    Regex::new(&format!(r#""{}"\s*:\s*"?(-?\d+(?:\.\d+)?)"?"#, name)).expect("valid regex")
}

struct TierInput<'a> {
    /// The untouched response, for tiers that ignore all preprocessing
    raw: &'a str,
    /// Fence-stripped but otherwise untouched text
    fenced: &'a str,
    /// Fence-stripped text after textual repairs
    repaired: &'a str,
}

type Tier = fn(&TierInput) -> Option<Vec<ObligationCandidate>>;

const TIERS: &[(&str, Tier)] = &[
    ("direct", tier_direct),
    ("bare_array", tier_bare_array),
    ("array_slice", tier_array_slice),
    ("object_scan", tier_object_scan),
    ("regex_salvage", tier_regex_salvage),
];

// Tiers beyond this index commonly see truncated objects with the
// recurrence fields dropped, so those get defaulted.
const FIRST_SALVAGE_TIER: usize = 2;

/// Parse a model response believed to contain an `obligations` collection
///
/// # Errors
///
/// `Unrecoverable` when every tier is exhausted without yielding a
/// candidate.
pub fn parse_obligations(raw: &str) -> Result<Vec<ObligationCandidate>, ExtractorError> {
    let fenced = strip_code_fences(raw);
    let repaired = repair_payload(&fenced);
    let input = TierInput {
        raw,
        fenced: &fenced,
        repaired: &repaired,
    };

    for (index, (name, tier)) in TIERS.iter().enumerate() {
        let Some(mut candidates) = tier(&input) else {
            continue;
        };
        if candidates.is_empty() {
            continue;
        }
        if index >= FIRST_SALVAGE_TIER {
            for candidate in &mut candidates {
                apply_recovery_defaults(candidate);
            }
        }
        if index > 0 {
            debug!(tier = name, count = candidates.len(), "recovered via fallback tier");
        }
        return Ok(candidates);
    }

    Err(ExtractorError::Unrecoverable(
        "no parse tier yielded a candidate".to_string(),
    ))
}

/// Parse a model response expected to contain exactly one clause-analysis
/// object
///
/// Same tiered philosophy as `parse_obligations`, but the last resort
/// reconstructs a minimal object by extracting known field names
/// individually instead of attempting a full parse.
pub fn parse_single(raw: &str) -> Result<ClauseCandidate, ExtractorError> {
    let fenced = strip_code_fences(raw);
    let repaired = repair_payload(&fenced);

    // Direct parse, preferring the untouched text over the repaired one
    for text in [fenced.as_str(), repaired.as_str()] {
        if let Some(sliced) = slice_between(text, '{', '}') {
            if let Ok(candidate) = serde_json::from_str::<ClauseCandidate>(sliced) {
                if !candidate.is_empty() {
                    return Ok(candidate);
                }
            }
        }
    }

    // Balanced-object scan over the untouched response
    for span in balanced_object_spans(raw) {
        if let Ok(candidate) = serde_json::from_str::<ClauseCandidate>(span)
            .or_else(|_| serde_json::from_str::<ClauseCandidate>(&repair_payload(span)))
        {
            if !candidate.is_empty() {
                debug!(tier = "object_scan", "recovered clause analysis via fallback tier");
                return Ok(candidate);
            }
        }
    }

    // Last resort: per-field regex reconstruction
    let candidate = salvage_clause_fields(&repaired);
    if candidate.is_empty() {
        return Err(ExtractorError::Unrecoverable(
            "no recognizable clause analysis fields".to_string(),
        ));
    }
    debug!(tier = "field_salvage", "reconstructed clause analysis field by field");
    Ok(candidate)
}

/// Tier 1: strict parse of the repaired text as `{"obligations": [...]}`,
/// preferring the untouched text so repairs cannot corrupt a valid payload
fn tier_direct(input: &TierInput) -> Option<Vec<ObligationCandidate>> {
    for text in [input.fenced, input.repaired] {
        let Some(sliced) = slice_between(text, '{', '}') else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<Value>(sliced) else {
            continue;
        };
        if let Some(array) = value.get("obligations").and_then(Value::as_array) {
            return Some(candidates_from_values(array, true));
        }
    }
    None
}

/// Tier 2: the payload is a top-level array, not wrapped in an object
fn tier_bare_array(input: &TierInput) -> Option<Vec<ObligationCandidate>> {
    for text in [input.fenced, input.repaired] {
        if !text.trim_start().starts_with('[') {
            continue;
        }
        let Some(sliced) = slice_between(text, '[', ']') else {
            continue;
        };
        if let Ok(Value::Array(array)) = serde_json::from_str::<Value>(sliced) {
            return Some(candidates_from_values(&array, true));
        }
    }
    None
}

/// Tier 3: locate the `obligations` array by the key's textual position and
/// bracket depth, then fall back to decomposing it object by object
fn tier_array_slice(input: &TierInput) -> Option<Vec<ObligationCandidate>> {
    let repaired = input.repaired;
    let key_pos = repaired.find("\"obligations\"")?;
    let open = key_pos + repaired[key_pos..].find('[')?;
    // Truncated responses may never close the array; take what is there
    let slice = match matching_bracket(repaired.as_bytes(), open, b'[', b']') {
        Some(close) => &repaired[open..=close],
        None => &repaired[open..],
    };

    if let Ok(Value::Array(array)) = serde_json::from_str::<Value>(slice) {
        let candidates = candidates_from_values(&array, true);
        if !candidates.is_empty() {
            return Some(candidates);
        }
    }

    // The array itself is broken (usually truncation): isolate each
    // balanced object and parse them independently, one repair retry each.
    let candidates: Vec<ObligationCandidate> = balanced_object_spans(slice)
        .into_iter()
        .filter_map(parse_candidate_with_retry)
        .filter(|c| c.has_required_fields(true))
        .collect();
    Some(candidates)
}

/// Tier 4: ignore all wrapping and scan the untouched response for balanced
/// `{...}` spans
fn tier_object_scan(input: &TierInput) -> Option<Vec<ObligationCandidate>> {
    let candidates: Vec<ObligationCandidate> = balanced_object_spans(input.raw)
        .into_iter()
        .filter_map(parse_candidate_with_retry)
        .filter(|c| c.has_required_fields(true))
        .collect();
    Some(candidates)
}

/// Tier 5: regex over the repaired text for flat object-shaped substrings,
/// keeping anything with at least a summary text
fn tier_regex_salvage(input: &TierInput) -> Option<Vec<ObligationCandidate>> {
    let candidates: Vec<ObligationCandidate> = FLAT_OBJECT_RE
        .find_iter(input.repaired)
        .filter_map(|m| parse_candidate_with_retry(m.as_str()))
        .filter(|c| c.has_required_fields(false))
        .collect();
    Some(candidates)
}

/// Unwrap the first markdown-fenced block, if any
fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed.to_string();
    };
    let after = &trimmed[open + 3..];
    // Skip the optional language tag on the fence line
    let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after[body_start..];
    match body.find("```") {
        Some(close) => body[..close].to_string(),
        // Unterminated fence (truncated response): take the rest
        None => body.to_string(),
    }
}

/// Textual repairs for near-JSON: drop non-ASCII noise, quote bare and
/// single-quoted keys, normalize single-quoted values, strip trailing commas
fn repair_payload(text: &str) -> String {
    let ascii: String = text.chars().filter(|c| c.is_ascii()).collect();
    let keyed = SINGLE_QUOTED_KEY_RE.replace_all(&ascii, "$1\"$2\":");
    let keyed = BARE_KEY_RE.replace_all(&keyed, "$1\"$2\":");
    let valued = SINGLE_QUOTED_VALUE_RE.replace_all(&keyed, ": \"$1\"");
    TRAILING_COMMA_RE.replace_all(&valued, "$1").into_owned()
}

/// Substring from the first `open` to the last `close`, inclusive
fn slice_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Index of the bracket closing the one at `open`, by depth counting
fn matching_bracket(bytes: &[u8], open: usize, open_byte: u8, close_byte: u8) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &byte) in bytes[open..].iter().enumerate() {
        if byte == open_byte {
            depth += 1;
        } else if byte == close_byte {
            depth -= 1;
            if depth == 0 {
                return Some(open + offset);
            }
        }
    }
    None
}

/// Every balanced top-level `{...}` span in the text, by brace depth
fn balanced_object_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (index, ch) in text.char_indices() {
        match ch {
            '{' => {
                if depth == 0 {
                    start = index;
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        spans.push(&text[start..=index]);
                    }
                }
            }
            _ => {}
        }
    }

    spans
}

/// Parse one isolated object, with a single repair retry before discarding
fn parse_candidate_with_retry(span: &str) -> Option<ObligationCandidate> {
    serde_json::from_str::<ObligationCandidate>(span)
        .or_else(|_| serde_json::from_str::<ObligationCandidate>(&repair_payload(span)))
        .ok()
}

/// Deserialize array elements into candidates, discarding malformed ones
fn candidates_from_values(values: &[Value], require_original: bool) -> Vec<ObligationCandidate> {
    values
        .iter()
        .filter_map(|value| serde_json::from_value::<ObligationCandidate>(value.clone()).ok())
        .filter(|candidate| candidate.has_required_fields(require_original))
        .collect()
}

/// Truncated responses commonly drop the recurrence fields entirely
fn apply_recovery_defaults(candidate: &mut ObligationCandidate) {
    if candidate.is_recurring.is_none() {
        candidate.is_recurring = Some(Value::Bool(false));
    }
    if candidate.recurrence_type.is_none() {
        candidate.recurrence_type = Some("none".to_string());
    }
}

/// Reconstruct a clause analysis by extracting known fields individually
fn salvage_clause_fields(text: &str) -> ClauseCandidate {
    ClauseCandidate {
        category: capture_string(&CATEGORY_FIELD_RE, text),
        start_date: capture_string(&START_DATE_FIELD_RE, text),
        due_date: capture_string(&DUE_DATE_FIELD_RE, text),
        responsible_party: capture_string(&RESPONSIBLE_PARTY_FIELD_RE, text),
        priority: capture_string(&PRIORITY_FIELD_RE, text),
        confidence_score: capture_number(&CONFIDENCE_FIELD_RE, text),
    }
}

fn capture_string(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|caps| caps[1].to_string())
}

fn capture_number(re: &Regex, text: &str) -> Option<Value> {
    re.captures(text).map(|caps| Value::String(caps[1].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_payload() {
        let response = r#"{"obligations":[
            {"text":"Pay $100 monthly","original_text":"Tenant shall pay $100 per month","type":"payment"}
        ]}"#;

        let candidates = parse_obligations(response).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text.as_deref(), Some("Pay $100 monthly"));
        assert_eq!(candidates[0].category.as_deref(), Some("payment"));
    }

    #[test]
    fn test_parse_fenced_payload() {
        let response = "```json\n{\"obligations\":[{\"text\":\"X\",\"original_text\":\"Y\"}]}\n```";
        let candidates = parse_obligations(response).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text.as_deref(), Some("X"));
    }

    #[test]
    fn test_parse_fenced_unquoted_keys_single_quoted_values() {
        // Unquoted key, single-quoted value, markdown fenced
        let response = "```json\n{\"obligations\":[{text:\"X\",original_text:'Y'}]}\n```";
        let candidates = parse_obligations(response).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text.as_deref(), Some("X"));
        assert_eq!(candidates[0].original_text.as_deref(), Some("Y"));
    }

    #[test]
    fn test_parse_trailing_comma() {
        let response = r#"{"obligations":[{"text":"x","original_text":"y"},]}"#;
        let candidates = parse_obligations(response).unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_parse_surrounding_prose() {
        let response = "Here are the obligations I found:\n\n{\"obligations\":[{\"text\":\"x\",\"original_text\":\"y\"}]}\n\nLet me know if you need more detail.";
        let candidates = parse_obligations(response).unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_parse_bare_array() {
        let response = r#"[{"text":"x","original_text":"y"},{"text":"a","original_text":"b"}]"#;
        let candidates = parse_obligations(response).unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_parse_non_ascii_noise() {
        let response = "\u{201c}{\"obligations\":[{\"text\":\"x\",\"original_text\":\"y\"}]}\u{201d}";
        let candidates = parse_obligations(response).unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_array_slice_survives_truncation() {
        // Second object truncated mid-field; first must still be recovered
        let response = r#"{"obligations":[
            {"text":"x","original_text":"y","priority":"high"},
            {"text":"partial","original_te"#;
        let candidates = parse_obligations(response).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].priority.as_deref(), Some("high"));
    }

    #[test]
    fn test_salvage_tiers_default_recurrence() {
        let response = r#"{"obligations":[
            {"text":"x","original_text":"y"},
            {"text":"broken","original_te"#;
        let candidates = parse_obligations(response).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].is_recurring, Some(Value::Bool(false)));
        assert_eq!(candidates[0].recurrence_type.as_deref(), Some("none"));
    }

    #[test]
    fn test_object_scan_finds_objects_in_prose() {
        let response = r#"I could not produce the requested wrapper, but here is what I found.
First: {"text":"Deliver goods","original_text":"Supplier shall deliver the goods"} and also
{"text":"Report quarterly","original_text":"Vendor shall report each quarter"} as requested."#;
        let candidates = parse_obligations(response).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].text.as_deref(), Some("Deliver goods"));
    }

    #[test]
    fn test_object_scan_requires_both_text_fields() {
        let response = r#"Notes: {"text":"only a summary"} plus {"text":"complete","original_text":"the clause"}"#;
        let candidates = parse_obligations(response).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text.as_deref(), Some("complete"));
    }

    #[test]
    fn test_pure_prose_is_unrecoverable() {
        let response = "I'm sorry, I was unable to find any contractual obligations in this text.";
        let result = parse_obligations(response);
        assert!(matches!(result, Err(ExtractorError::Unrecoverable(_))));
    }

    #[test]
    fn test_empty_obligations_array_is_unrecoverable() {
        // A structurally valid but empty payload yields no candidate, so the
        // chain is exhausted; the orchestrator maps this to zero records.
        let result = parse_obligations(r#"{"obligations":[]}"#);
        assert!(matches!(result, Err(ExtractorError::Unrecoverable(_))));
    }

    #[test]
    fn test_candidates_missing_required_fields_are_discarded() {
        let response = r#"{"obligations":[
            {"text":"kept","original_text":"kept clause"},
            {"type":"payment","priority":"high"},
            {"text":"","original_text":"blank summary"}
        ]}"#;
        let candidates = parse_obligations(response).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text.as_deref(), Some("kept"));
    }

    #[test]
    fn test_valid_payload_with_colon_inside_strings() {
        // Repairs must not corrupt a payload that is already valid
        let response = r#"{"obligations":[{"text":"Summary","original_text":"Tenant shall: pay rent, maintain: premises"}]}"#;
        let candidates = parse_obligations(response).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].original_text.as_deref(),
            Some("Tenant shall: pay rent, maintain: premises")
        );
    }

    #[test]
    fn test_parse_single_valid() {
        let response = r#"{"type":"payment","priority":"high","confidence_score":90}"#;
        let candidate = parse_single(response).unwrap();
        assert_eq!(candidate.category.as_deref(), Some("payment"));
        assert_eq!(candidate.priority.as_deref(), Some("high"));
    }

    #[test]
    fn test_parse_single_fenced() {
        let response = "```json\n{\"type\":\"delivery\",\"responsible_party\":\"Supplier\"}\n```";
        let candidate = parse_single(response).unwrap();
        assert_eq!(candidate.category.as_deref(), Some("delivery"));
        assert_eq!(candidate.responsible_party.as_deref(), Some("Supplier"));
    }

    #[test]
    fn test_parse_single_field_salvage_from_broken_json() {
        // Braces unbalanced, full parse impossible; fields recovered one by one
        let response = r#"The analysis: "type": "compliance", "responsible_party": "Contractor", "confidence_score": 75"#;
        let candidate = parse_single(response).unwrap();
        assert_eq!(candidate.category.as_deref(), Some("compliance"));
        assert_eq!(candidate.responsible_party.as_deref(), Some("Contractor"));
        assert_eq!(
            candidate.confidence_score,
            Some(Value::String("75".to_string()))
        );
    }

    #[test]
    fn test_parse_single_field_salvage_recovers_every_field() {
        let response = r#"Partial output follows "type": "payment", "start_date": "2025-01-01",
"due_date": "2025-06-30", "responsible_party": "Tenant", "priority": "low",
"confidence_score": "60" and then it stopped"#;
        let candidate = parse_single(response).unwrap();
        assert_eq!(candidate.category.as_deref(), Some("payment"));
        assert_eq!(candidate.start_date.as_deref(), Some("2025-01-01"));
        assert_eq!(candidate.due_date.as_deref(), Some("2025-06-30"));
        assert_eq!(candidate.responsible_party.as_deref(), Some("Tenant"));
        assert_eq!(candidate.priority.as_deref(), Some("low"));
        assert_eq!(
            candidate.confidence_score,
            Some(Value::String("60".to_string()))
        );
    }

    #[test]
    fn test_parse_single_pure_prose_fails() {
        let result = parse_single("No structured data here at all.");
        assert!(matches!(result, Err(ExtractorError::Unrecoverable(_))));
    }

    #[test]
    fn test_strip_code_fences_unterminated() {
        let text = "```json\n{\"obligations\":[{\"text\":\"x\",\"original_text\":\"y\"}]}";
        let candidates = parse_obligations(text).unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_balanced_object_spans_nested() {
        let spans = balanced_object_spans(r#"a {"x": {"y": 1}} b {"z": 2}"#);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0], r#"{"x": {"y": 1}}"#);
        assert_eq!(spans[1], r#"{"z": 2}"#);
    }

    #[test]
    fn test_matching_bracket_tolerates_nested_braces() {
        let text = r#""obligations": [{"a": {"b": 1}}, {"c": 2}] trailing"#;
        let open = text.find('[').unwrap();
        let close = matching_bracket(text.as_bytes(), open, b'[', b']').unwrap();
        assert_eq!(&text[open..=close], r#"[{"a": {"b": 1}}, {"c": 2}]"#);
    }
}
