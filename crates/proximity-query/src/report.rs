//! Human readable summaries of nearby features.

use proximity_core::models::{FeatureRecord, QueryOutcome};
use serde_json::Value;
use std::fmt::Write;

/// Identifier attribute left out of summaries by default
pub const DEFAULT_IDENTIFIER_FIELD: &str = "OBJECTID";

/// Summarize an outcome with the default identifier field
pub fn summarize(outcome: &QueryOutcome, max_items: usize) -> String {
    Reporter::default().summarize(outcome, max_items)
}

/// Render an attribute value, strings without quotes
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Formats records as numbered entries, hiding the identifier attribute
#[derive(Debug, Clone)]
pub struct Reporter {
    identifier_field: String,
}

impl Reporter {
    pub fn new(identifier_field: impl Into<String>) -> Self {
        Self { identifier_field: identifier_field.into() }
    }

    pub fn identifier_field(&self) -> &str {
        &self.identifier_field
    }

    pub fn summarize(&self, outcome: &QueryOutcome, max_items: usize) -> String {
        self.summarize_records(&outcome.records, max_items)
    }

    /// Summarize at most `max_items` records, noting how many were left out
    ///
    /// An empty record list gives an empty string.
    pub fn summarize_records(&self, records: &[FeatureRecord], max_items: usize) -> String {
        let mut message = String::new();

        for (index, record) in records.iter().take(max_items).enumerate() {
            let _ = writeln!(message, "\n{}. Layer: {}", index + 1, record.layer_title);
            let lines: Vec<String> = record
                .attributes
                .iter()
                .filter(|(key, _)| key.as_str() != self.identifier_field)
                .map(|(key, value)| format!("{}: {}", key, display_value(value)))
                .collect();
            let _ = writeln!(message, "{}", lines.join("\n"));
        }

        if records.len() > max_items {
            let _ = write!(message, "\n...and {} more features", records.len() - max_items);
        }

        message.trim().to_string()
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTIFIER_FIELD)
    }
}
