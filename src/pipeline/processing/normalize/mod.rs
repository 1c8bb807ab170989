//! Standardizing stages: they rewrite values in place and only the format
//! stage ever drops a row.

use tracing::{debug, warn};

use super::{StageOutput, ValidationStage, WorkingRow};
use crate::config::TeamProfile;
use crate::pipeline::summary::{IssueKind, ValidationReport};
use crate::types::{Margin, MatchFormat, Winner};

/// Strip leading and trailing whitespace from every text field
pub struct TrimWhitespace;

impl ValidationStage for TrimWhitespace {
    fn name(&self) -> &'static str {
        "trim_whitespace"
    }

    fn apply(&self, rows: Vec<WorkingRow>, report: &mut ValidationReport) -> StageOutput {
        let mut affected = 0;
        let rows: Vec<WorkingRow> = rows
            .into_iter()
            .map(|mut row| {
                let mut changed = false;
                for field in [
                    &mut row.match_date,
                    &mut row.match_format,
                    &mut row.opponent,
                    &mut row.winner,
                    &mut row.margin,
                    &mut row.ground,
                    &mut row.year,
                ] {
                    let trimmed = field.trim();
                    if trimmed.len() != field.len() {
                        *field = trimmed.to_string();
                        changed = true;
                    }
                }
                if changed {
                    affected += 1;
                }
                row
            })
            .collect();

        report.record(IssueKind::WhitespaceTrimmed, affected);
        StageOutput { rows, affected }
    }
}

/// Map format aliases onto Test/ODI/T20 and drop rows with anything else
pub struct StandardizeFormat;

impl ValidationStage for StandardizeFormat {
    fn name(&self) -> &'static str {
        "standardize_format"
    }

    fn apply(&self, rows: Vec<WorkingRow>, report: &mut ValidationReport) -> StageOutput {
        let mut dropped = 0;
        let mut kept = Vec::with_capacity(rows.len());

        for mut row in rows {
            match MatchFormat::from_alias(&row.match_format) {
                Some(format) => {
                    row.match_format = format.as_str().to_string();
                    row.format = Some(format);
                    kept.push(row);
                }
                None => {
                    report.note_unrecognized_format(&row.match_format);
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            warn!("Dropped {} rows with unrecognized formats", dropped);
        }
        report.record(IssueKind::InvalidFormat, dropped);
        StageOutput {
            rows: kept,
            affected: dropped,
        }
    }
}

/// Map winner synonyms onto the canonical labels. Unrecognized non-empty
/// values become `Opponent`: a result happened but was not labelled.
pub struct StandardizeWinner {
    team: TeamProfile,
}

impl StandardizeWinner {
    pub fn new(team: TeamProfile) -> Self {
        Self { team }
    }
}

impl ValidationStage for StandardizeWinner {
    fn name(&self) -> &'static str {
        "standardize_winner"
    }

    fn apply(&self, rows: Vec<WorkingRow>, report: &mut ValidationReport) -> StageOutput {
        let mut coerced = 0;
        let rows: Vec<WorkingRow> = rows
            .into_iter()
            .map(|mut row| {
                let outcome = match Winner::recognize(&row.winner, &self.team) {
                    Some(winner) => winner,
                    None => {
                        debug!(value = %row.winner, "Coercing unrecognized winner to Opponent");
                        report.note_unrecognized_winner(&row.winner);
                        coerced += 1;
                        Winner::Opponent
                    }
                };
                row.winner = outcome.label(&self.team).to_string();
                row.outcome = Some(outcome);
                row
            })
            .collect();

        if coerced > 0 {
            warn!("Coerced {} unrecognized winner values to Opponent", coerced);
        }
        report.record(IssueKind::UnrecognizedWinner, coerced);
        StageOutput {
            rows,
            affected: coerced,
        }
    }
}

/// Collapse whitespace and fix run/wicket pluralization
pub struct NormalizeMargin;

/// Normalized margin text; non-count text only has its whitespace collapsed.
pub fn normalize_margin(value: &str) -> String {
    Margin::parse(value).map(|m| m.to_string()).unwrap_or_default()
}

impl ValidationStage for NormalizeMargin {
    fn name(&self) -> &'static str {
        "normalize_margin"
    }

    fn apply(&self, rows: Vec<WorkingRow>, report: &mut ValidationReport) -> StageOutput {
        let mut rewritten = 0;
        let rows: Vec<WorkingRow> = rows
            .into_iter()
            .map(|mut row| {
                let normalized = normalize_margin(&row.margin);
                if normalized != row.margin {
                    row.margin = normalized;
                    rewritten += 1;
                }
                row
            })
            .collect();

        report.record(IssueKind::MarginRewritten, rewritten);
        StageOutput {
            rows,
            affected: rewritten,
        }
    }
}
