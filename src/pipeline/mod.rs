// Validation pipeline: raw table in, cleaned records and a summary out

pub mod processing;
pub mod summary;

use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::TeamProfile;
use crate::constants::*;
use crate::error::{DatasetError, Result};
use crate::metrics::PipelineMetrics;
use crate::table::RawTable;
use crate::types::MatchRecord;
use processing::enrich::ClassifyHomeAway;
use processing::normalize::{NormalizeMargin, StandardizeFormat, StandardizeWinner, TrimWhitespace};
use processing::quality_gate::{ReconcileYear, RemoveDuplicates, ValidateDateFormat, ValidateOpponent};
use processing::{ValidationStage, WorkingRow};
use summary::{IssueKind, ValidationReport, ValidationSummary};

/// Cleaned records sorted by date, plus what happened on the way
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub records: Vec<MatchRecord>,
    pub summary: ValidationSummary,
}

pub struct ValidationPipeline {
    stages: Vec<Box<dyn ValidationStage>>,
}

impl ValidationPipeline {
    /// Build the stage list for `team`. Order matters: later stages rely on
    /// the fields earlier stages resolved.
    pub fn new(team: TeamProfile) -> Self {
        let stages: Vec<Box<dyn ValidationStage>> = vec![
            Box::new(TrimWhitespace),
            Box::new(StandardizeFormat),
            Box::new(ValidateDateFormat),
            Box::new(ReconcileYear),
            Box::new(StandardizeWinner::new(team.clone())),
            Box::new(ValidateOpponent::new(team.clone())),
            Box::new(NormalizeMargin),
            Box::new(ClassifyHomeAway::new(team)),
            Box::new(RemoveDuplicates),
        ];
        Self { stages }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Validate a raw table. Fails only when required columns are missing;
    /// every other problem becomes a counted drop or rewrite.
    pub fn run(&self, table: &RawTable) -> Result<PipelineOutput> {
        let missing = table.missing_columns();
        if !missing.is_empty() {
            error!("Missing required columns: {:?}", missing);
            return Err(DatasetError::MissingColumns(missing));
        }

        let mut report = ValidationReport::new();
        let extra = table.unrecognized_columns();
        if !extra.is_empty() {
            warn!("Extra columns found (will be removed): {:?}", extra);
            report.note_dropped_columns(extra);
        }
        info!("Column validation passed ({} rows)", table.len());

        Ok(self.run_with_report(rows_from_table(table), report))
    }

    /// Validate rows that are already in working shape
    pub fn run_rows(&self, rows: Vec<WorkingRow>) -> PipelineOutput {
        self.run_with_report(rows, ValidationReport::new())
    }

    fn run_with_report(&self, rows: Vec<WorkingRow>, mut report: ValidationReport) -> PipelineOutput {
        let started = Instant::now();
        let rows_before = rows.len();
        let mut rows = rows;

        for stage in &self.stages {
            let span = tracing::info_span!("validate", stage = stage.name());
            let _enter = span.enter();

            let rows_in = rows.len();
            let output = stage.apply(rows, &mut report);
            rows = output.rows;

            info!("{}: {} rows affected, {} remain", stage.name(), output.affected, rows.len());
            report.push_stage(stage.name(), rows_in, rows.len(), output.affected);
            PipelineMetrics::record_stage(stage.name(), rows_in, rows.len(), output.affected);
        }

        let mut incomplete = 0;
        let mut records: Vec<MatchRecord> = rows
            .into_iter()
            .filter_map(|row| {
                let date = row.match_date.clone();
                let record = row.into_record();
                if record.is_none() {
                    warn!(date = %date, "Row left the pipeline with unresolved fields");
                    incomplete += 1;
                }
                record
            })
            .collect();
        report.record(IssueKind::Incomplete, incomplete);

        // Stable: rows sharing a date keep their extraction order
        records.sort_by_key(|r| r.date);

        let summary = report.into_summary(rows_before, records.len());
        let duration = started.elapsed().as_secs_f64();
        PipelineMetrics::record_run(rows_before, records.len(), duration);
        info!(
            "Validation finished: {} -> {} rows ({} invalid, {} duplicates, {:.2}% retained)",
            summary.total_rows_before,
            summary.total_rows_after,
            summary.invalid_rows_removed,
            summary.duplicates_removed,
            summary.retention_pct()
        );

        PipelineOutput { records, summary }
    }
}

/// Project the required columns out of a raw table. Extra columns are not
/// carried; a non-integer `Year` is kept as text for the year stage to fix.
fn rows_from_table(table: &RawTable) -> Vec<WorkingRow> {
    let idx = |name: &str| table.column_index(name).unwrap_or(usize::MAX);
    let (date, format, opponent, winner, margin, ground, year) = (
        idx(COL_MATCH_DATE),
        idx(COL_MATCH_FORMAT),
        idx(COL_OPPONENT),
        idx(COL_WINNER),
        idx(COL_MARGIN),
        idx(COL_GROUND),
        idx(COL_YEAR),
    );

    table
        .rows
        .iter()
        .map(|row| {
            WorkingRow::new(
                table.cell(row, date),
                table.cell(row, format),
                table.cell(row, opponent),
                table.cell(row, winner),
                table.cell(row, margin),
                table.cell(row, ground),
                table.cell(row, year),
            )
        })
        .collect()
}
