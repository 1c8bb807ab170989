use sl_cricket_dataset::config::TeamProfile;
use sl_cricket_dataset::constants::{CLEAN_COLUMNS, REQUIRED_COLUMNS};
use sl_cricket_dataset::pipeline::processing::normalize::normalize_margin;
use sl_cricket_dataset::pipeline::summary::IssueKind;
use sl_cricket_dataset::pipeline::ValidationPipeline;
use sl_cricket_dataset::storage;
use sl_cricket_dataset::table::RawTable;
use sl_cricket_dataset::types::{HomeAway, Margin, MatchFormat, Winner};
use std::collections::HashSet;
use tempfile::tempdir;

fn table(rows: &[[&str; 7]]) -> RawTable {
    let mut t = RawTable::new(REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect());
    for r in rows {
        t.push_row(r.iter().map(|c| c.to_string()).collect());
    }
    t
}

fn messy_table() -> RawTable {
    table(&[
        [" 2020-01-15", "t20i", "India", "sri lanka", "5 wicket", "Galle Stadium", "2020"],
        ["invalid", "Test", "India", "Draw", "", "Galle", "2020"],
        ["2020-02-01", "ODI", "England", "Opponent", "1 runs", "Lord's", "2020"],
        ["2020-02-01", "ODI", "England", "Opponent", "2 runs", "Lord's", "2020"],
        ["2020-03-10", "Test", "Sri Lanka", "Draw", "", "Kandy", "2020"],
        ["2020-04-04", "ODI", "Pakistan", "Tied", "", "P Sara Oval, Colombo", "2019"],
        ["2021-06-01", "T20", "Australia", "Somebody", "100  run", "MCG", "2021"],
        ["2021-07-01", "Hundred", "England", "Draw", "", "Lord's", "2021"],
        ["2021-02-29", "Test", "India", "Draw", "", "Galle", "2021"],
    ])
}

#[test]
fn test_cleaned_rows_satisfy_invariants() {
    let team = TeamProfile::default();
    let out = ValidationPipeline::new(team.clone()).run(&messy_table()).unwrap();

    let mut keys = HashSet::new();
    for record in &out.records {
        assert_eq!(record.year, chrono::Datelike::year(&record.date));
        assert!(!team.is_home_team(&record.opponent));
        assert!(MatchFormat::ALL.contains(&record.format));
        assert!(keys.insert((record.date, record.format, record.opponent.clone(), record.venue.clone())));
    }
    assert!(out.records.windows(2).all(|w| w[0].date <= w[1].date));
}

#[test]
fn test_scenario_row() {
    let out = ValidationPipeline::new(TeamProfile::default())
        .run(&messy_table())
        .unwrap();
    let record = &out.records[0];

    assert_eq!(record.date.to_string(), "2020-01-15");
    assert_eq!(record.format, MatchFormat::T20);
    assert_eq!(record.winner, Winner::HomeTeam);
    assert_eq!(record.margin.as_ref().map(|m| m.to_string()), Some("5 wickets".to_string()));
    assert_eq!(record.home_away, HomeAway::Home);
}

#[test]
fn test_issue_accounting() {
    let out = ValidationPipeline::new(TeamProfile::default())
        .run(&messy_table())
        .unwrap();
    let s = &out.summary;

    assert_eq!(s.issue_count(IssueKind::InvalidDateFormat), 1);
    assert_eq!(s.issue_count(IssueKind::InvalidCalendarDate), 1);
    assert_eq!(s.issue_count(IssueKind::InvalidFormat), 1);
    assert_eq!(s.issue_count(IssueKind::SelfPlayOpponent), 1);
    assert_eq!(s.issue_count(IssueKind::Duplicate), 1);
    assert_eq!(s.issue_count(IssueKind::YearCorrected), 1);
    assert_eq!(s.issue_count(IssueKind::UnrecognizedWinner), 1);
    assert_eq!(s.unrecognized_formats, vec!["Hundred".to_string()]);

    assert_eq!(s.total_rows_before, 9);
    assert_eq!(s.total_rows_after, 4);
    assert_eq!(
        s.total_rows_before,
        s.total_rows_after + s.invalid_rows_removed + s.duplicates_removed
    );
}

#[test]
fn test_first_duplicate_wins() {
    let out = ValidationPipeline::new(TeamProfile::default())
        .run(&messy_table())
        .unwrap();
    let england: Vec<_> = out.records.iter().filter(|r| r.opponent == "England").collect();
    assert_eq!(england.len(), 1);
    assert_eq!(england[0].margin, Some(Margin::Runs(1)));
    assert_eq!(england[0].home_away, HomeAway::Away);
}

#[test]
fn test_substring_home_venue_and_year_fix() {
    let out = ValidationPipeline::new(TeamProfile::default())
        .run(&messy_table())
        .unwrap();
    let pakistan = out.records.iter().find(|r| r.opponent == "Pakistan").unwrap();
    assert_eq!(pakistan.home_away, HomeAway::Home);
    assert_eq!(pakistan.year, 2020);
    assert_eq!(pakistan.winner, Winner::Tie);

    let australia = out.records.iter().find(|r| r.opponent == "Australia").unwrap();
    assert_eq!(australia.winner, Winner::Opponent);
    assert_eq!(australia.margin, Some(Margin::Runs(100)));
}

#[test]
fn test_margin_round_trips() {
    assert_eq!(normalize_margin("1 runs"), "1 run");
    assert_eq!(normalize_margin("5 wicket"), "5 wickets");
    assert_eq!(normalize_margin("100  run"), "100 runs");
}

#[test]
fn test_rerun_is_identical() {
    let pipeline = ValidationPipeline::new(TeamProfile::default());
    let first = pipeline.run(&messy_table()).unwrap();
    let second = pipeline.run(&messy_table()).unwrap();
    assert_eq!(first.records, second.records);
    assert_eq!(first.summary, second.summary);
}

#[test]
fn test_cleaned_output_is_a_fixed_point() {
    let team = TeamProfile::default();
    let pipeline = ValidationPipeline::new(team.clone());
    let first = pipeline.run(&messy_table()).unwrap();

    let dir = tempdir().unwrap();
    let clean_path = dir.path().join("clean.csv");
    storage::write_clean(&clean_path, &first.records, &team).unwrap();

    let reloaded = storage::read_table(&clean_path).unwrap();
    assert_eq!(reloaded.columns, CLEAN_COLUMNS.to_vec());

    let second = pipeline.run(&reloaded).unwrap();
    assert_eq!(second.records, first.records);
    assert_eq!(second.summary.invalid_rows_removed, 0);
    assert_eq!(second.summary.duplicates_removed, 0);

    let typed = storage::read_clean(&clean_path, &team).unwrap();
    assert_eq!(typed, first.records);
}
