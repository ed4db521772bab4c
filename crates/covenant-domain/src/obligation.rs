//! The canonical obligation record and its enumerations

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an obligation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObligationStatus {
    /// Not yet fulfilled
    #[default]
    Pending,
    /// Fulfilled
    Completed,
    /// Past its due date without fulfillment
    Overdue,
}

impl ObligationStatus {
    /// Canonical lower-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            ObligationStatus::Pending => "pending",
            ObligationStatus::Completed => "completed",
            ObligationStatus::Overdue => "overdue",
        }
    }
}

/// Priority of an obligation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Urgent or high-consequence
    High,
    /// Default when the model gives nothing usable
    #[default]
    Medium,
    /// Low urgency
    Low,
}

impl Priority {
    /// Case-insensitive parse. Returns `None` for unrecognized values so the
    /// caller chooses the fallback.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    /// Canonical lower-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Recurrence pattern of a recurring obligation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    /// Not recurring
    #[default]
    None,
    /// Every day
    Daily,
    /// Every week
    Weekly,
    /// Every month
    Monthly,
    /// Every year
    Yearly,
    /// A pattern outside the fixed set, described in `recurrence_custom_text`
    Custom,
    /// Continuous for the life of the contract
    Ongoing,
}

impl RecurrenceType {
    /// Case-insensitive parse. Returns `None` for unrecognized values; the
    /// normalizer remaps those to `Custom` and preserves the original text.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "none" => Some(RecurrenceType::None),
            "daily" => Some(RecurrenceType::Daily),
            "weekly" => Some(RecurrenceType::Weekly),
            "monthly" => Some(RecurrenceType::Monthly),
            "yearly" => Some(RecurrenceType::Yearly),
            "custom" => Some(RecurrenceType::Custom),
            "ongoing" => Some(RecurrenceType::Ongoing),
            _ => None,
        }
    }

    /// Canonical lower-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceType::None => "none",
            RecurrenceType::Daily => "daily",
            RecurrenceType::Weekly => "weekly",
            RecurrenceType::Monthly => "monthly",
            RecurrenceType::Yearly => "yearly",
            RecurrenceType::Custom => "custom",
            RecurrenceType::Ongoing => "ongoing",
        }
    }
}

/// A normalized obligation record
///
/// This is the only artifact the pipeline hands to the persistence
/// collaborator. Every present field has been validated or coerced by the
/// normalizer; malformed values are dropped or defaulted, never stored raw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    /// Identifier of the source document (opaque to the pipeline)
    pub document_id: String,

    /// One-sentence summary of the obligation
    pub text: String,

    /// Verbatim clause wording from the contract
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,

    /// Lower-cased category (payment, delivery, reporting, ...), `other`
    /// when the model gives none
    #[serde(rename = "type")]
    pub category: String,

    /// Lifecycle status, `pending` on extraction
    pub status: ObligationStatus,

    /// Priority, `medium` when absent or unrecognized
    pub priority: Priority,

    /// When the obligation starts, if a valid date was extracted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// When the obligation must be fulfilled, if a valid date was extracted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Party responsible for fulfillment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_party: Option<String>,

    /// Clause number from the contract
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clause_number: Option<String>,

    /// Section name from the contract
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,

    /// Approximate page number in the source document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<i64>,

    /// Model confidence in the extraction, 0-100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<i64>,

    /// Whether the obligation repeats
    pub is_recurring: bool,

    /// Recurrence pattern
    pub recurrence_type: RecurrenceType,

    /// Interval between occurrences (e.g. every 2 weeks)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_interval: Option<i64>,

    /// Day of month (1-31) or week (0-6)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_day: Option<i64>,

    /// Month of year (1-12)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_month: Option<i64>,

    /// Description of a custom recurrence pattern
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_custom_text: Option<String>,

    /// Actor that created the record
    pub created_by: String,

    /// Actor that last modified the record
    pub modified_by: String,
}
