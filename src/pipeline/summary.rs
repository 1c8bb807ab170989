use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Kinds of issue the validation stages detect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    WhitespaceTrimmed,
    InvalidFormat,
    InvalidDateFormat,
    InvalidCalendarDate,
    YearCorrected,
    UnrecognizedWinner,
    SelfPlayOpponent,
    MarginRewritten,
    /// A row reached the end of the pipeline with an unresolved field
    Incomplete,
    Duplicate,
}

impl IssueKind {
    /// Issues that remove the row rather than rewrite it
    pub fn drops_row(&self) -> bool {
        matches!(
            self,
            IssueKind::InvalidFormat
                | IssueKind::InvalidDateFormat
                | IssueKind::InvalidCalendarDate
                | IssueKind::SelfPlayOpponent
                | IssueKind::Incomplete
                | IssueKind::Duplicate
        )
    }
}

/// Row counts around a single stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: String,
    pub rows_in: usize,
    pub rows_out: usize,
    pub affected: usize,
}

/// Accumulator the stages write into while the pipeline runs
#[derive(Debug, Default)]
pub struct ValidationReport {
    issues: BTreeMap<IssueKind, usize>,
    unrecognized_formats: BTreeSet<String>,
    unrecognized_winners: BTreeSet<String>,
    dropped_columns: Vec<String>,
    stages: Vec<StageReport>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: IssueKind, count: usize) {
        if count > 0 {
            *self.issues.entry(kind).or_insert(0) += count;
        }
    }

    pub fn note_unrecognized_format(&mut self, value: &str) {
        self.unrecognized_formats.insert(value.to_string());
    }

    pub fn note_unrecognized_winner(&mut self, value: &str) {
        self.unrecognized_winners.insert(value.to_string());
    }

    pub fn note_dropped_columns(&mut self, columns: Vec<String>) {
        self.dropped_columns.extend(columns);
    }

    pub fn push_stage(&mut self, stage: &str, rows_in: usize, rows_out: usize, affected: usize) {
        self.stages.push(StageReport {
            stage: stage.to_string(),
            rows_in,
            rows_out,
            affected,
        });
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.get(&kind).copied().unwrap_or(0)
    }

    pub fn into_summary(self, total_rows_before: usize, total_rows_after: usize) -> ValidationSummary {
        let duplicates_removed = self.count(IssueKind::Duplicate);
        let invalid_rows_removed = self
            .issues
            .iter()
            .filter(|(kind, _)| kind.drops_row() && **kind != IssueKind::Duplicate)
            .map(|(_, n)| n)
            .sum();

        ValidationSummary {
            total_rows_before,
            total_rows_after,
            duplicates_removed,
            invalid_rows_removed,
            issues: self.issues,
            unrecognized_formats: self.unrecognized_formats.into_iter().collect(),
            unrecognized_winners: self.unrecognized_winners.into_iter().collect(),
            dropped_columns: self.dropped_columns,
            stages: self.stages,
        }
    }
}

/// Outcome of a validation run, written as JSON next to the cleaned CSV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_rows_before: usize,
    pub total_rows_after: usize,
    pub duplicates_removed: usize,
    pub invalid_rows_removed: usize,
    pub issues: BTreeMap<IssueKind, usize>,
    pub unrecognized_formats: Vec<String>,
    pub unrecognized_winners: Vec<String>,
    pub dropped_columns: Vec<String>,
    pub stages: Vec<StageReport>,
}

impl ValidationSummary {
    pub fn issue_count(&self, kind: IssueKind) -> usize {
        self.issues.get(&kind).copied().unwrap_or(0)
    }

    /// Share of input rows that survived, in percent
    pub fn retention_pct(&self) -> f64 {
        if self.total_rows_before == 0 {
            return 0.0;
        }
        self.total_rows_after as f64 / self.total_rows_before as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_splits_duplicates_from_invalid_rows() {
        let mut report = ValidationReport::new();
        report.record(IssueKind::InvalidFormat, 2);
        report.record(IssueKind::InvalidDateFormat, 1);
        report.record(IssueKind::UnrecognizedWinner, 4);
        report.record(IssueKind::Duplicate, 3);
        report.record(IssueKind::MarginRewritten, 0);

        let summary = report.into_summary(10, 4);
        assert_eq!(summary.invalid_rows_removed, 3);
        assert_eq!(summary.duplicates_removed, 3);
        assert_eq!(summary.issue_count(IssueKind::UnrecognizedWinner), 4);
        assert!(!summary.issues.contains_key(&IssueKind::MarginRewritten));
        assert!((summary.retention_pct() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_serializes_issue_keys_as_snake_case() {
        let mut report = ValidationReport::new();
        report.record(IssueKind::SelfPlayOpponent, 1);
        let json = serde_json::to_value(report.into_summary(1, 0)).unwrap();
        assert_eq!(json["issues"]["self_play_opponent"], 1);
        assert_eq!(json["total_rows_before"], 1);
    }
}
