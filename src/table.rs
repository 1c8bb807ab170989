use crate::constants::{CLEAN_COLUMNS, REQUIRED_COLUMNS};
use crate::types::RawMatchRow;

/// An untyped table as read from a delimited file: a header and text cells.
/// Short rows read as empty cells for the missing trailing columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim() == name)
    }

    /// Cell text, empty when the row is short
    pub fn cell<'a>(&'a self, row: &'a [String], column: usize) -> &'a str {
        row.get(column).map(String::as_str).unwrap_or("")
    }

    /// Required columns absent from the header, in canonical order
    pub fn missing_columns(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|c| self.column_index(c).is_none())
            .map(|c| c.to_string())
            .collect()
    }

    /// Columns that are neither required nor part of the cleaned schema
    pub fn unrecognized_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !CLEAN_COLUMNS.contains(&c.trim()))
            .cloned()
            .collect()
    }

    /// Build a table in raw-artifact shape from extracted rows
    pub fn from_raw_rows(rows: &[RawMatchRow]) -> Self {
        let mut table = Self::new(REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(vec![
                row.match_date.clone(),
                row.match_format.clone(),
                row.opponent.clone(),
                row.winner.clone(),
                row.margin.clone(),
                row.ground.clone(),
                row.year.to_string(),
            ]);
        }
        table
    }
}
