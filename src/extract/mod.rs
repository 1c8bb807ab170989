//! Extraction of match rows from Cricsheet per-match JSON files

use chrono::{Datelike, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::config::TeamProfile;
use crate::error::Result;
use crate::metrics::ExtractionMetrics;
use crate::types::{Margin, MatchFormat, RawMatchRow, Winner};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// The subset of a Cricsheet match file this crate reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CricsheetMatch {
    #[serde(default)]
    pub info: MatchInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchInfo {
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub dates: Vec<String>,
    pub venue: Option<String>,
    pub match_type: Option<String>,
    #[serde(default)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Outcome {
    pub result: Option<String>,
    pub winner: Option<String>,
    pub by: Option<VictoryMargin>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VictoryMargin {
    pub runs: Option<u32>,
    pub wickets: Option<u32>,
}

/// Why a match file produced no row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    TeamNotInvolved,
    MissingOpponent,
    MissingDate,
    UnparseableDate(String),
    BeforeStartYear(i32),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TeamNotInvolved => write!(f, "team not involved"),
            SkipReason::MissingOpponent => write!(f, "no opponent listed"),
            SkipReason::MissingDate => write!(f, "no match date"),
            SkipReason::UnparseableDate(d) => write!(f, "unparseable date '{}'", d),
            SkipReason::BeforeStartYear(y) => write!(f, "played in {} before start year", y),
        }
    }
}

/// Parse the first listed date in any of the accepted layouts
pub fn parse_match_date(info: &MatchInfo) -> std::result::Result<NaiveDate, SkipReason> {
    let first = info.dates.first().ok_or(SkipReason::MissingDate)?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(first.trim(), fmt).ok())
        .ok_or_else(|| SkipReason::UnparseableDate(first.clone()))
}

/// Decide the result from the home team's point of view.
///
/// An explicit terminal result beats a winner field. With neither present a
/// Test is assumed drawn and any other format has no known result; an
/// abandoned Test with an empty outcome is therefore recorded as a draw.
pub fn determine_winner(info: &MatchInfo, home_side: &str, team: &TeamProfile) -> Winner {
    let outcome = &info.outcome;
    let result = outcome
        .result
        .as_deref()
        .map(|r| r.trim().to_lowercase())
        .filter(|r| !r.is_empty());

    if let Some(result) = result.as_deref() {
        match result {
            "no result" | "abandoned" | "cancelled" => return Winner::NoResult,
            "tie" | "tied" => return Winner::Tie,
            "draw" => return Winner::Draw,
            _ => {}
        }
    }

    let winner = outcome.winner.as_deref().map(str::trim).filter(|w| !w.is_empty());
    if let Some(winner) = winner {
        return if winner == home_side || team.is_home_team(winner) {
            Winner::HomeTeam
        } else {
            Winner::Opponent
        };
    }

    let is_test = info
        .match_type
        .as_deref()
        .map(|t| t.trim().eq_ignore_ascii_case("test"))
        .unwrap_or(false);
    if result.is_none() && is_test {
        Winner::Draw
    } else {
        Winner::Unknown
    }
}

/// Runs are checked before wickets; the two never appear together.
pub fn extract_margin(outcome: &Outcome) -> Option<Margin> {
    let by = outcome.by.as_ref()?;
    by.runs
        .map(Margin::Runs)
        .or_else(|| by.wickets.map(Margin::Wickets))
}

/// Build a raw row from one match, or say why it was skipped
pub fn extract_match(
    doc: &CricsheetMatch,
    format: MatchFormat,
    team: &TeamProfile,
    start_year: i32,
) -> std::result::Result<RawMatchRow, SkipReason> {
    let info = &doc.info;

    let mut home_side = None;
    let mut opponent = None;
    for name in &info.teams {
        if team.is_home_team(name) {
            home_side = Some(name.as_str());
        } else {
            opponent = Some(name.as_str());
        }
    }
    let home_side = home_side.ok_or(SkipReason::TeamNotInvolved)?;
    let opponent = opponent
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(SkipReason::MissingOpponent)?;

    let date = parse_match_date(info)?;
    if date.year() < start_year {
        return Err(SkipReason::BeforeStartYear(date.year()));
    }

    let winner = determine_winner(info, home_side, team);
    let margin = extract_margin(&info.outcome)
        .map(|m| m.to_string())
        .unwrap_or_default();

    Ok(RawMatchRow {
        match_date: date.format("%Y-%m-%d").to_string(),
        match_format: format.as_str().to_string(),
        opponent: opponent.to_string(),
        winner: winner.label(team).to_string(),
        margin,
        ground: info.venue.clone().unwrap_or_default(),
        year: date.year(),
    })
}

/// Per-directory extraction counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub files_seen: usize,
    pub matches_kept: usize,
    pub team_not_involved: usize,
    pub missing_opponent: usize,
    pub missing_date: usize,
    pub unparseable_date: usize,
    pub before_start_year: usize,
    pub unreadable: usize,
}

impl ExtractionStats {
    fn count_skip(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::TeamNotInvolved => self.team_not_involved += 1,
            SkipReason::MissingOpponent => self.missing_opponent += 1,
            SkipReason::MissingDate => self.missing_date += 1,
            SkipReason::UnparseableDate(_) => self.unparseable_date += 1,
            SkipReason::BeforeStartYear(_) => self.before_start_year += 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionBatch {
    pub rows: Vec<RawMatchRow>,
    pub stats: ExtractionStats,
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().map(|e| e == "json").unwrap_or(false))
        .collect();
    // Directory order is platform dependent; sort for reproducible output
    files.sort();
    Ok(files)
}

fn progress_bar(len: u64, format: MatchFormat) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({eta})") {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message(format!("Parsing {}", format));
    pb
}

/// Extract every qualifying match from a directory of Cricsheet JSON files.
/// Unreadable or malformed files are counted and skipped.
#[instrument(skip(team), fields(format = %format))]
pub fn extract_directory(
    dir: &Path,
    format: MatchFormat,
    team: &TeamProfile,
    start_year: i32,
) -> Result<ExtractionBatch> {
    let files = json_files(dir)?;
    info!("Processing {} {} match files", files.len(), format);

    let pb = progress_bar(files.len() as u64, format);
    let mut batch = ExtractionBatch::default();

    for path in &files {
        batch.stats.files_seen += 1;
        pb.inc(1);

        let doc: CricsheetMatch = match fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
        {
            Ok(doc) => doc,
            Err(e) => {
                debug!("Unreadable match file {}: {}", path.display(), e);
                batch.stats.unreadable += 1;
                continue;
            }
        };

        match extract_match(&doc, format, team, start_year) {
            Ok(row) => batch.rows.push(row),
            Err(reason) => {
                debug!("Skipping {}: {}", path.display(), reason);
                batch.stats.count_skip(&reason);
            }
        }
    }
    pb.finish_and_clear();

    batch.stats.matches_kept = batch.rows.len();
    ExtractionMetrics::record_batch(
        format.as_str(),
        batch.stats.files_seen,
        batch.stats.matches_kept,
        batch.stats.unreadable,
    );
    info!(
        "Found {} {} {} matches from {} onwards",
        batch.stats.matches_kept, team.name, format, start_year
    );
    Ok(batch)
}

/// Stable sort by date so equal dates keep per-format extraction order
pub fn sort_rows(rows: &mut [RawMatchRow]) {
    rows.sort_by(|a, b| a.match_date.cmp(&b.match_date));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> CricsheetMatch {
        serde_json::from_value(value).unwrap()
    }

    fn team() -> TeamProfile {
        TeamProfile::default()
    }

    #[test]
    fn test_parse_date_layouts() {
        for (raw, expected) in [
            ("2020-01-15", "2020-01-15"),
            ("2020/01/15", "2020-01-15"),
            ("15/01/2020", "2020-01-15"),
        ] {
            let doc = parse(json!({ "info": { "dates": [raw] } }));
            assert_eq!(parse_match_date(&doc.info).unwrap().to_string(), expected);
        }
    }

    #[test]
    fn test_first_date_is_used() {
        let doc = parse(json!({ "info": { "dates": ["2020-01-15", "2020-01-16", "2020-01-17"] } }));
        assert_eq!(parse_match_date(&doc.info).unwrap().to_string(), "2020-01-15");
    }

    #[test]
    fn test_missing_and_bad_dates() {
        let doc = parse(json!({ "info": {} }));
        assert_eq!(parse_match_date(&doc.info), Err(SkipReason::MissingDate));
        let doc = parse(json!({ "info": { "dates": [] } }));
        assert_eq!(parse_match_date(&doc.info), Err(SkipReason::MissingDate));
        let doc = parse(json!({ "info": { "dates": ["Jan 15 2020"] } }));
        assert!(matches!(parse_match_date(&doc.info), Err(SkipReason::UnparseableDate(_))));
    }

    #[test]
    fn test_terminal_result_beats_winner() {
        let doc = parse(json!({ "info": { "outcome": { "result": "no result", "winner": "India" } } }));
        assert_eq!(determine_winner(&doc.info, "Sri Lanka", &team()), Winner::NoResult);
        let doc = parse(json!({ "info": { "outcome": { "result": "tie" } } }));
        assert_eq!(determine_winner(&doc.info, "Sri Lanka", &team()), Winner::Tie);
        let doc = parse(json!({ "info": { "outcome": { "result": "Draw" } } }));
        assert_eq!(determine_winner(&doc.info, "Sri Lanka", &team()), Winner::Draw);
    }

    #[test]
    fn test_winner_field() {
        let doc = parse(json!({ "info": { "outcome": { "winner": "Sri Lanka" } } }));
        assert_eq!(determine_winner(&doc.info, "Sri Lanka", &team()), Winner::HomeTeam);
        let doc = parse(json!({ "info": { "outcome": { "winner": "India" } } }));
        assert_eq!(determine_winner(&doc.info, "Sri Lanka", &team()), Winner::Opponent);
    }

    #[test]
    fn test_empty_outcome_defaults_by_match_type() {
        let test = parse(json!({ "info": { "match_type": "Test", "outcome": {} } }));
        assert_eq!(determine_winner(&test.info, "Sri Lanka", &team()), Winner::Draw);
        let odi = parse(json!({ "info": { "match_type": "ODI", "outcome": {} } }));
        assert_eq!(determine_winner(&odi.info, "Sri Lanka", &team()), Winner::Unknown);
        let odd = parse(json!({ "info": { "match_type": "Test", "outcome": { "result": "awarded" } } }));
        assert_eq!(determine_winner(&odd.info, "Sri Lanka", &team()), Winner::Unknown);
    }

    #[test]
    fn test_margin_runs_before_wickets() {
        let doc = parse(json!({ "info": { "outcome": { "by": { "runs": 1 } } } }));
        assert_eq!(extract_margin(&doc.info.outcome), Some(Margin::Runs(1)));
        let doc = parse(json!({ "info": { "outcome": { "by": { "wickets": 5 } } } }));
        assert_eq!(extract_margin(&doc.info.outcome), Some(Margin::Wickets(5)));
        let doc = parse(json!({ "info": { "outcome": { "by": { "innings": 1, "runs": 12 } } } }));
        assert_eq!(extract_margin(&doc.info.outcome), Some(Margin::Runs(12)));
        let doc = parse(json!({ "info": { "outcome": {} } }));
        assert_eq!(extract_margin(&doc.info.outcome), None);
    }

    #[test]
    fn test_extract_full_match() {
        let doc = parse(json!({
            "meta": { "data_version": "1.1.0" },
            "info": {
                "teams": ["India", "Sri Lanka"],
                "dates": ["2020-01-15"],
                "venue": "R Premadasa Stadium, Colombo",
                "match_type": "ODI",
                "outcome": { "winner": "Sri Lanka", "by": { "wickets": 5 } }
            },
            "innings": []
        }));

        let row = extract_match(&doc, MatchFormat::Odi, &team(), 2000).unwrap();
        assert_eq!(row.match_date, "2020-01-15");
        assert_eq!(row.match_format, "ODI");
        assert_eq!(row.opponent, "India");
        assert_eq!(row.winner, "Sri Lanka");
        assert_eq!(row.margin, "5 wickets");
        assert_eq!(row.ground, "R Premadasa Stadium, Colombo");
        assert_eq!(row.year, 2020);
    }

    #[test]
    fn test_extract_skips() {
        let other = parse(json!({ "info": { "teams": ["India", "Australia"], "dates": ["2020-01-15"] } }));
        assert_eq!(
            extract_match(&other, MatchFormat::Test, &team(), 2000),
            Err(SkipReason::TeamNotInvolved)
        );

        let old = parse(json!({ "info": { "teams": ["Sri Lanka", "India"], "dates": ["1999-12-30"] } }));
        assert_eq!(
            extract_match(&old, MatchFormat::Test, &team(), 2000),
            Err(SkipReason::BeforeStartYear(1999))
        );

        let alone = parse(json!({ "info": { "teams": ["Sri Lanka"], "dates": ["2020-01-15"] } }));
        assert_eq!(
            extract_match(&alone, MatchFormat::Odi, &team(), 2000),
            Err(SkipReason::MissingOpponent)
        );

        let blank = parse(json!({ "info": { "teams": ["Sri Lanka", "  "], "dates": ["2020-01-15"] } }));
        assert_eq!(
            extract_match(&blank, MatchFormat::Odi, &team(), 2000),
            Err(SkipReason::MissingOpponent)
        );

        let no_venue = parse(json!({ "info": { "teams": ["Sri Lanka", "India"], "dates": ["2001-01-01"] } }));
        let row = extract_match(&no_venue, MatchFormat::T20, &team(), 2000).unwrap();
        assert_eq!(row.ground, "");
        assert_eq!(row.winner, "");
    }
}
