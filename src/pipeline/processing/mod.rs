// Pipeline processing: the ordered validation and normalization stages

pub mod enrich;
pub mod normalize;
pub mod quality_gate;

use chrono::{Datelike, NaiveDate};

use crate::pipeline::summary::ValidationReport;
use crate::types::{HomeAway, Margin, MatchFormat, MatchRecord, RawMatchRow, Winner};

/// A row in flight through the validation stages.
///
/// The text fields hold the cell values as the stages rewrite them; the typed
/// slots are filled in by the stage that resolves them (format by the format
/// stage, `date` by the year stage, `outcome` by the winner stage, `home_away`
/// by classification). A row leaves the pipeline only when every slot is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingRow {
    pub match_date: String,
    pub match_format: String,
    pub opponent: String,
    pub winner: String,
    pub margin: String,
    pub ground: String,
    pub year: String,
    pub date: Option<NaiveDate>,
    pub format: Option<MatchFormat>,
    pub outcome: Option<Winner>,
    pub home_away: Option<HomeAway>,
}

impl WorkingRow {
    pub fn new(
        match_date: &str,
        match_format: &str,
        opponent: &str,
        winner: &str,
        margin: &str,
        ground: &str,
        year: &str,
    ) -> Self {
        Self {
            match_date: match_date.to_string(),
            match_format: match_format.to_string(),
            opponent: opponent.to_string(),
            winner: winner.to_string(),
            margin: margin.to_string(),
            ground: ground.to_string(),
            year: year.to_string(),
            ..Default::default()
        }
    }

    /// Key used for duplicate detection
    pub fn identity(&self) -> (String, String, String, String) {
        (
            self.match_date.clone(),
            self.match_format.clone(),
            self.opponent.clone(),
            self.ground.clone(),
        )
    }

    /// Convert into a cleaned record; `None` if a stage never resolved a slot.
    pub fn into_record(self) -> Option<MatchRecord> {
        let date = self.date?;
        Some(MatchRecord {
            date,
            format: self.format?,
            opponent: self.opponent,
            winner: self.outcome?,
            margin: Margin::parse(&self.margin),
            venue: self.ground,
            year: date.year(),
            home_away: self.home_away?,
        })
    }
}

impl From<&RawMatchRow> for WorkingRow {
    fn from(row: &RawMatchRow) -> Self {
        WorkingRow::new(
            &row.match_date,
            &row.match_format,
            &row.opponent,
            &row.winner,
            &row.margin,
            &row.ground,
            &row.year.to_string(),
        )
    }
}

/// Rows surviving a stage and how many rows the stage dropped or rewrote
#[derive(Debug)]
pub struct StageOutput {
    pub rows: Vec<WorkingRow>,
    pub affected: usize,
}

/// One step of the validation pipeline. Stages run in a fixed order and each
/// assumes the ones before it have run.
pub trait ValidationStage {
    fn name(&self) -> &'static str;

    fn apply(&self, rows: Vec<WorkingRow>, report: &mut ValidationReport) -> StageOutput;
}
