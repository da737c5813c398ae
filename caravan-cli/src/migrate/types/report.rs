//! Outcome types for an import run

use serde::{Deserialize, Serialize};

/// What one row's file import produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RowOutcome {
    /// A record reference was written to the row
    Imported { value: serde_json::Value },
    /// The row produced no value (empty source, or a skipped missing source)
    Skipped,
    /// The import failed; the row keeps no value
    Failed { message: String },
}

impl RowOutcome {
    pub fn imported(value: serde_json::Value) -> Self {
        RowOutcome::Imported { value }
    }

    pub fn skipped() -> Self {
        RowOutcome::Skipped
    }

    pub fn failed(message: impl Into<String>) -> Self {
        RowOutcome::Failed {
            message: message.into(),
        }
    }

    pub fn is_imported(&self) -> bool {
        matches!(self, RowOutcome::Imported { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RowOutcome::Skipped)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RowOutcome::Failed { .. })
    }
}

impl std::fmt::Display for RowOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowOutcome::Imported { .. } => write!(f, "imported"),
            RowOutcome::Skipped => write!(f, "skipped"),
            RowOutcome::Failed { .. } => write!(f, "failed"),
        }
    }
}

/// Summary of one import run over a manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    /// Destination field the import wrote to
    pub field: String,
    /// Per-row outcomes, in row order
    pub outcomes: Vec<RowOutcome>,
    /// Operator-visible messages collected from the run
    pub messages: Vec<String>,
}

impl ImportReport {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            outcomes: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn add_outcome(&mut self, outcome: RowOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn imported_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_imported()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| o.is_failed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_counts() {
        let mut report = ImportReport::new("field_image");
        report.add_outcome(RowOutcome::imported(json!({"target_id": 1})));
        report.add_outcome(RowOutcome::imported(json!(2)));
        report.add_outcome(RowOutcome::skipped());
        report.add_outcome(RowOutcome::failed("source gone"));

        assert_eq!(report.total(), 4);
        assert_eq!(report.imported_count(), 2);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(report.has_failures());
    }

    #[test]
    fn test_report_without_failures() {
        let mut report = ImportReport::new("field_image");
        report.add_outcome(RowOutcome::skipped());

        assert!(!report.has_failures());
        assert_eq!(report.failed_count(), 0);
    }

    #[test]
    fn test_outcome_predicates() {
        assert!(RowOutcome::imported(json!(1)).is_imported());
        assert!(RowOutcome::skipped().is_skipped());
        assert!(RowOutcome::failed("x").is_failed());
        assert!(!RowOutcome::skipped().is_failed());
    }
}
