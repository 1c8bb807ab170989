//! CSV persistence for the raw and cleaned artifacts

use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::config::TeamProfile;
use crate::constants::*;
use crate::error::{DatasetError, Result};
use crate::pipeline::summary::ValidationSummary;
use crate::table::RawTable;
use crate::types::{HomeAway, Margin, MatchFormat, MatchRecord, RawMatchRow, Winner};

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Read any header-first CSV into an untyped table
pub fn read_table(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let columns = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut table = RawTable::new(columns);
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(|c| c.to_string()).collect());
    }

    info!("Loaded {} rows, {} columns from {}", table.len(), table.columns.len(), path.display());
    Ok(table)
}

pub fn write_table(path: &Path, table: &RawTable) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    debug!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Write extracted rows as the raw artifact
pub fn write_raw_rows(path: &Path, rows: &[RawMatchRow]) -> Result<()> {
    write_table(path, &RawTable::from_raw_rows(rows))
}

/// Write the cleaned artifact: header row, one record per line, no index
pub fn write_clean(path: &Path, records: &[MatchRecord], team: &TeamProfile) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CLEAN_COLUMNS)?;
    for record in records {
        let margin = record.margin.as_ref().map(|m| m.to_string()).unwrap_or_default();
        writer.write_record([
            record.date.format("%Y-%m-%d").to_string().as_str(),
            record.format.as_str(),
            record.opponent.as_str(),
            record.winner.label(team),
            margin.as_str(),
            record.venue.as_str(),
            record.year.to_string().as_str(),
            record.home_away.as_str(),
        ])?;
    }
    writer.flush()?;
    info!("Cleaned dataset saved to {} ({} rows)", path.display(), records.len());
    Ok(())
}

/// Read a cleaned artifact back into records. Unlike the validation
/// pipeline this is strict: any malformed row is an error.
pub fn read_clean(path: &Path, team: &TeamProfile) -> Result<Vec<MatchRecord>> {
    let table = read_table(path)?;

    let mut missing = table.missing_columns();
    if table.column_index(COL_HOME_AWAY).is_none() {
        missing.push(COL_HOME_AWAY.to_string());
    }
    if !missing.is_empty() {
        return Err(DatasetError::MissingColumns(missing));
    }

    let col = |name: &str| table.column_index(name).unwrap_or(usize::MAX);
    let (date, format, opponent, winner, margin, ground, year, home_away) = (
        col(COL_MATCH_DATE),
        col(COL_MATCH_FORMAT),
        col(COL_OPPONENT),
        col(COL_WINNER),
        col(COL_MARGIN),
        col(COL_GROUND),
        col(COL_YEAR),
        col(COL_HOME_AWAY),
    );

    let mut records = Vec::with_capacity(table.len());
    for (i, row) in table.rows.iter().enumerate() {
        // Header is line 1
        let line = i as u64 + 2;
        let invalid = |reason: String| DatasetError::InvalidRecord { line, reason };

        let date_text = table.cell(row, date);
        let parsed_date = NaiveDate::parse_from_str(date_text, "%Y-%m-%d")
            .map_err(|e| invalid(format!("date '{}': {}", date_text, e)))?;
        let parsed_format: MatchFormat = table.cell(row, format).parse().map_err(invalid)?;
        let winner_text = table.cell(row, winner);
        let parsed_winner = Winner::recognize(winner_text, team)
            .ok_or_else(|| invalid(format!("winner '{}'", winner_text)))?;
        let year_text = table.cell(row, year);
        let parsed_year: i32 = year_text
            .trim()
            .parse()
            .map_err(|_| invalid(format!("year '{}'", year_text)))?;
        let home_away_text = table.cell(row, home_away);
        let parsed_home_away = HomeAway::parse(home_away_text)
            .ok_or_else(|| invalid(format!("home/away '{}'", home_away_text)))?;

        records.push(MatchRecord {
            date: parsed_date,
            format: parsed_format,
            opponent: table.cell(row, opponent).to_string(),
            winner: parsed_winner,
            margin: Margin::parse(table.cell(row, margin)),
            venue: table.cell(row, ground).to_string(),
            year: parsed_year,
            home_away: parsed_home_away,
        });
    }

    Ok(records)
}

pub fn write_summary(path: &Path, summary: &ValidationSummary) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, serde_json::to_string_pretty(summary)?)?;
    debug!("Validation summary written to {}", path.display());
    Ok(())
}
