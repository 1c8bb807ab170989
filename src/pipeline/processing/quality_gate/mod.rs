//! Gatekeeping stages: rows that cannot be valid matches are dropped here.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, warn};

use super::{StageOutput, ValidationStage, WorkingRow};
use crate::config::TeamProfile;
use crate::pipeline::summary::{IssueKind, ValidationReport};

static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern compiles"));

/// Drop rows whose date is not shaped `YYYY-MM-DD`
pub struct ValidateDateFormat;

impl ValidationStage for ValidateDateFormat {
    fn name(&self) -> &'static str {
        "validate_date_format"
    }

    fn apply(&self, rows: Vec<WorkingRow>, report: &mut ValidationReport) -> StageOutput {
        let before = rows.len();
        let kept: Vec<WorkingRow> = rows
            .into_iter()
            .filter(|row| {
                let ok = DATE_SHAPE.is_match(&row.match_date);
                if !ok {
                    debug!(date = %row.match_date, "Dropping row with malformed date");
                }
                ok
            })
            .collect();

        let dropped = before - kept.len();
        if dropped > 0 {
            warn!("Dropped {} rows with invalid date format", dropped);
        }
        report.record(IssueKind::InvalidDateFormat, dropped);
        StageOutput {
            rows: kept,
            affected: dropped,
        }
    }
}

/// Recompute `year` from the date. The date is authoritative; rows whose date
/// is well-shaped but not a real calendar day (e.g. `2021-02-30`) are dropped.
pub struct ReconcileYear;

impl ValidationStage for ReconcileYear {
    fn name(&self) -> &'static str {
        "reconcile_year"
    }

    fn apply(&self, rows: Vec<WorkingRow>, report: &mut ValidationReport) -> StageOutput {
        let mut dropped = 0;
        let mut corrected = 0;
        let mut kept = Vec::with_capacity(rows.len());

        for mut row in rows {
            match NaiveDate::parse_from_str(&row.match_date, "%Y-%m-%d") {
                Ok(date) => {
                    let year = date.year().to_string();
                    if row.year != year {
                        corrected += 1;
                        row.year = year;
                    }
                    row.date = Some(date);
                    kept.push(row);
                }
                Err(e) => {
                    debug!(date = %row.match_date, error = %e, "Dropping row with impossible date");
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            warn!("Dropped {} rows with dates that are not real calendar days", dropped);
        }
        report.record(IssueKind::InvalidCalendarDate, dropped);
        report.record(IssueKind::YearCorrected, corrected);
        StageOutput {
            rows: kept,
            affected: dropped + corrected,
        }
    }
}

/// Drop rows where the opponent is the home team itself
pub struct ValidateOpponent {
    team: TeamProfile,
}

impl ValidateOpponent {
    pub fn new(team: TeamProfile) -> Self {
        Self { team }
    }
}

impl ValidationStage for ValidateOpponent {
    fn name(&self) -> &'static str {
        "validate_opponent"
    }

    fn apply(&self, rows: Vec<WorkingRow>, report: &mut ValidationReport) -> StageOutput {
        let before = rows.len();
        let kept: Vec<WorkingRow> = rows
            .into_iter()
            .filter(|row| !self.team.is_home_team(&row.opponent))
            .collect();

        let dropped = before - kept.len();
        if dropped > 0 {
            warn!("Dropped {} rows where the opponent is {}", dropped, self.team.name);
        }
        report.record(IssueKind::SelfPlayOpponent, dropped);
        StageOutput {
            rows: kept,
            affected: dropped,
        }
    }
}

/// Keep the first row for each (date, format, opponent, ground)
pub struct RemoveDuplicates;

impl ValidationStage for RemoveDuplicates {
    fn name(&self) -> &'static str {
        "remove_duplicates"
    }

    fn apply(&self, rows: Vec<WorkingRow>, report: &mut ValidationReport) -> StageOutput {
        let before = rows.len();
        let mut seen = HashSet::with_capacity(before);
        let kept: Vec<WorkingRow> = rows
            .into_iter()
            .filter(|row| seen.insert(row.identity()))
            .collect();

        let duplicates = before - kept.len();
        report.record(IssueKind::Duplicate, duplicates);
        StageOutput {
            rows: kept,
            affected: duplicates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(date: &str, year: &str) -> WorkingRow {
        WorkingRow::new(date, "Test", "India", "Draw", "", "Galle", year)
    }

    #[test]
    fn test_date_shape_filter() {
        let rows = vec![
            dated("2020-01-15", "2020"),
            dated("invalid", "2020"),
            dated("15/01/2020", "2020"),
            dated("2020-1-15", "2020"),
        ];
        let mut report = ValidationReport::new();
        let out = ValidateDateFormat.apply(rows, &mut report);

        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.affected, 3);
        assert_eq!(report.count(IssueKind::InvalidDateFormat), 3);
    }

    #[test]
    fn test_year_is_recomputed_from_date() {
        let rows = vec![
            dated("2020-01-15", "2019"),
            dated("2021-03-20", "2021"),
            dated("2021-02-30", "2021"),
            dated("2022-06-01", "not a year"),
        ];
        let mut report = ValidationReport::new();
        let out = ReconcileYear.apply(rows, &mut report);

        let years: Vec<&str> = out.rows.iter().map(|r| r.year.as_str()).collect();
        assert_eq!(years, vec!["2020", "2021", "2022"]);
        assert!(out.rows.iter().all(|r| r.date.is_some()));
        assert_eq!(report.count(IssueKind::InvalidCalendarDate), 1);
        assert_eq!(report.count(IssueKind::YearCorrected), 2);
        assert_eq!(out.affected, 3);
    }

    #[test]
    fn test_self_play_rows_are_dropped() {
        let mut rows = vec![dated("2020-01-15", "2020"); 4];
        rows[1].opponent = "Sri Lanka".into();
        rows[2].opponent = "SL".into();
        rows[3].opponent = "Sri Lanka A".into();

        let mut report = ValidationReport::new();
        let out = ValidateOpponent::new(TeamProfile::default()).apply(rows, &mut report);

        let opponents: Vec<&str> = out.rows.iter().map(|r| r.opponent.as_str()).collect();
        assert_eq!(opponents, vec!["India", "Sri Lanka A"]);
        assert_eq!(report.count(IssueKind::SelfPlayOpponent), 2);
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let mut first = dated("2020-01-15", "2020");
        first.margin = "5 wickets".into();
        let mut second = first.clone();
        second.margin = "6 wickets".into();
        let mut other_ground = first.clone();
        other_ground.ground = "Kandy".into();

        let mut report = ValidationReport::new();
        let out = RemoveDuplicates.apply(vec![first, second, other_ground], &mut report);

        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.rows[0].margin, "5 wickets");
        assert_eq!(out.rows[1].ground, "Kandy");
        assert_eq!(report.count(IssueKind::Duplicate), 1);
    }
}
