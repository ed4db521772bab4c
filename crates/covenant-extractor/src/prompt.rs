//! Prompt engineering for obligation extraction

use covenant_domain::CompletionRequest;

/// Builds completion requests for obligation extraction
///
/// The system instruction pins down the exact output contract (a single
/// JSON object with an `obligations` array); the user message carries the
/// chunk text and its position among the document's chunks. Single-chunk
/// documents get a comprehensive-extraction instruction; multi-chunk
/// documents get per-excerpt scoping so the model does not invent
/// obligations from text it cannot see.
pub struct PromptBuilder {
    text: String,
    chunk_index: usize,
    total_chunks: usize,
}

impl PromptBuilder {
    /// Create a builder for one chunk
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            chunk_index: 0,
            total_chunks: 1,
        }
    }

    /// Set the chunk's position among the document's chunks
    pub fn position(mut self, chunk_index: usize, total_chunks: usize) -> Self {
        self.chunk_index = chunk_index;
        self.total_chunks = total_chunks;
        self
    }

    /// Build the extraction request
    pub fn build(&self, max_tokens: u32) -> CompletionRequest {
        let user = if self.total_chunks <= 1 {
            format!(
                "Here is the complete contract document to analyze:\n\n{}",
                self.text
            )
        } else {
            format!(
                "Here is part {} of {} of the contract document. Extract only \
                 obligations stated in this excerpt:\n\n{}",
                self.chunk_index + 1,
                self.total_chunks,
                self.text
            )
        };

        CompletionRequest {
            system: EXTRACTION_SYSTEM_PROMPT.to_string(),
            user,
            max_tokens,
        }
    }
}

/// Build the single-clause analysis request
pub fn clause_analysis_request(text: &str, max_tokens: u32) -> CompletionRequest {
    CompletionRequest {
        system: CLAUSE_ANALYSIS_SYSTEM_PROMPT.to_string(),
        user: text.to_string(),
        max_tokens,
    }
}

const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are an expert legal analyst specializing in contract obligation extraction.
Your task is to identify and extract key contractual obligations from the provided document.

For each obligation, extract:
1. text - A clear, one-sentence description of the obligation
2. type - Categorize as: payment, delivery, reporting, compliance, renewal, termination, or other
3. start_date - When the obligation starts (YYYY-MM-DD, if specified)
4. due_date - When the obligation must be fulfilled (YYYY-MM-DD, if specified)
5. responsible_party - Who is responsible for fulfilling the obligation (if specified)
6. priority - high, medium, or low based on importance, deadlines, and consequences
7. original_text - The exact text from the document that describes this obligation
8. clause_number - Clause number, if the document numbers its clauses
9. section_name - Section name, if the document names its sections
10. page_number - Approximate page number where the obligation appears (if determinable)
11. confidence_score - Your confidence in this extraction on a scale of 0-100
12. is_recurring - true if the obligation repeats
13. recurrence_type - none, daily, weekly, monthly, yearly, ongoing, or custom
14. recurrence_interval - Interval between occurrences (e.g. 2 for every 2 weeks)
15. recurrence_day - Day of month (1-31) or day of week (0-6) when it recurs
16. recurrence_month - Month of year (1-12) for yearly recurrence
17. recurrence_custom_text - Description of the pattern when recurrence_type is custom

Format your response as a valid JSON object with the following structure:
{
  "obligations": [
    {
      "text": "string",
      "type": "payment|delivery|reporting|compliance|renewal|termination|other",
      "start_date": "YYYY-MM-DD",
      "due_date": "YYYY-MM-DD",
      "responsible_party": "string",
      "priority": "high|medium|low",
      "original_text": "string",
      "clause_number": "string",
      "section_name": "string",
      "page_number": number,
      "confidence_score": number,
      "is_recurring": boolean,
      "recurrence_type": "none|daily|weekly|monthly|yearly|ongoing|custom",
      "recurrence_interval": number,
      "recurrence_day": number,
      "recurrence_month": number,
      "recurrence_custom_text": "string"
    }
  ]
}

Omit optional fields you cannot determine rather than guessing.
Focus only on clear, explicit obligations. If dates are mentioned relatively
(e.g. "within 30 days"), make your best estimate for an absolute date.
Include only the JSON object in your response, no markdown fences, no other text."#;

const CLAUSE_ANALYSIS_SYSTEM_PROMPT: &str = r#"Analyze the provided text as a potential contractual obligation.
Extract and categorize it with the following fields:
- type: payment, delivery, reporting, compliance, renewal, termination, or other
- start_date: when the obligation starts (YYYY-MM-DD format, if specified)
- due_date: when it must be fulfilled (YYYY-MM-DD format, if specified)
- responsible_party: who is responsible (if specified)
- priority: high, medium, or low based on importance and urgency
- confidence_score: your confidence in this analysis (0-100)

Return only JSON in this format without explanations:
{
  "type": "string",
  "start_date": "string",
  "due_date": "string",
  "responsible_party": "string",
  "priority": "string",
  "confidence_score": number
}"#;
