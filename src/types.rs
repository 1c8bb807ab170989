use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::TeamProfile;

static DECIMAL_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d$").expect("digit pattern compiles"));

static MARGIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d+)\s+(run|runs|wicket|wickets)$").expect("margin pattern compiles")
});

/// International match format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchFormat {
    Test,
    #[serde(rename = "ODI")]
    Odi,
    T20,
}

impl MatchFormat {
    pub const ALL: [MatchFormat; 3] = [MatchFormat::Test, MatchFormat::Odi, MatchFormat::T20];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchFormat::Test => "Test",
            MatchFormat::Odi => "ODI",
            MatchFormat::T20 => "T20",
        }
    }

    /// Map a format label or one of its known aliases. Case-insensitive.
    pub fn from_alias(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "test" => Some(MatchFormat::Test),
            "odi" => Some(MatchFormat::Odi),
            "t20" | "t20i" => Some(MatchFormat::T20),
            _ => None,
        }
    }
}

impl fmt::Display for MatchFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_alias(s).ok_or_else(|| format!("unknown match format '{}'", s))
    }
}

/// Match result from the home team's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Winner {
    HomeTeam,
    Opponent,
    Draw,
    Tie,
    NoResult,
    /// No result recorded
    Unknown,
}

impl Winner {
    /// Label written to the CSV artifact; the home team is written by name.
    pub fn label<'a>(&self, team: &'a TeamProfile) -> &'a str {
        match self {
            Winner::HomeTeam => team.name.as_str(),
            Winner::Opponent => "Opponent",
            Winner::Draw => "Draw",
            Winner::Tie => "Tie",
            Winner::NoResult => "No Result",
            Winner::Unknown => "",
        }
    }

    /// Resolve a winner value. `None` means the value is non-empty but not a
    /// recognized label or synonym.
    pub fn recognize(value: &str, team: &TeamProfile) -> Option<Self> {
        let lowered = value.trim().to_lowercase();
        if team.is_home_team(&lowered) {
            return Some(Winner::HomeTeam);
        }
        match lowered.as_str() {
            "" | "nan" => Some(Winner::Unknown),
            "draw" => Some(Winner::Draw),
            "tie" | "tied" => Some(Winner::Tie),
            "no result" | "noresult" | "no-result" | "abandoned" => Some(Winner::NoResult),
            "opponent" => Some(Winner::Opponent),
            _ => None,
        }
    }

    pub fn is_decided(&self) -> bool {
        matches!(self, Winner::HomeTeam | Winner::Opponent)
    }
}

/// Victory margin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Margin {
    Runs(u32),
    Wickets(u32),
    /// Text that is not a plain run or wicket count, kept verbatim
    Custom(String),
}

impl Margin {
    /// Parse a margin cell. Empty (or `nan`) is no margin.
    pub fn parse(value: &str) -> Option<Self> {
        let collapsed = collapse_whitespace(value);
        if collapsed.is_empty() || collapsed.eq_ignore_ascii_case("nan") {
            return None;
        }
        if let Some(caps) = MARGIN_PATTERN.captures(&collapsed) {
            let digits = &caps[1];
            let runs = caps[2].to_lowercase().starts_with("run");
            if let Ok(count) = digits.parse::<u32>() {
                return Some(if runs {
                    Margin::Runs(count)
                } else {
                    Margin::Wickets(count)
                });
            }
            // Too large for a count or written in non-ASCII digits: keep the
            // digits as written and fix only the unit
            let unit = match (runs, is_one(digits)) {
                (true, true) => "run",
                (true, false) => "runs",
                (false, true) => "wicket",
                (false, false) => "wickets",
            };
            return Some(Margin::Custom(format!("{} {}", digits, unit)));
        }
        Some(Margin::Custom(collapsed))
    }

    pub fn is_runs(&self) -> bool {
        self.to_string().to_lowercase().contains("run")
    }

    pub fn is_wickets(&self) -> bool {
        self.to_string().to_lowercase().contains("wicket")
    }
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DECIMAL_DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// Numeric value of a Unicode decimal digit. Decimal digits are encoded in
/// contiguous runs of ten starting at zero, so the value is the position of
/// `c` within its run.
fn digit_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut position = 0;
    let mut code = c as u32;
    while let Some(prev) = code.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) || position >= 100 {
            break;
        }
        position += 1;
        code -= 1;
    }
    Some(position % 10)
}

/// Whether a digit string denotes exactly one, leading zeros allowed
fn is_one(digits: &str) -> bool {
    let values: Option<Vec<u32>> = digits.chars().map(digit_value).collect();
    match values {
        Some(values) => {
            let significant: Vec<u32> = values.into_iter().skip_while(|&v| v == 0).collect();
            significant == [1]
        }
        None => false,
    }
}

impl fmt::Display for Margin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Margin::Runs(1) => write!(f, "1 run"),
            Margin::Runs(n) => write!(f, "{} runs", n),
            Margin::Wickets(1) => write!(f, "1 wicket"),
            Margin::Wickets(n) => write!(f, "{} wickets", n),
            Margin::Custom(text) => f.write_str(text),
        }
    }
}

/// Venue-derived classification, independent of the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HomeAway {
    Home,
    Away,
}

impl HomeAway {
    pub fn as_str(&self) -> &'static str {
        match self {
            HomeAway::Home => "Home",
            HomeAway::Away => "Away",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "home" => Some(HomeAway::Home),
            "away" => Some(HomeAway::Away),
            _ => None,
        }
    }
}

impl fmt::Display for HomeAway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the cleaned dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub format: MatchFormat,
    pub opponent: String,
    pub winner: Winner,
    pub margin: Option<Margin>,
    pub venue: String,
    pub year: i32,
    pub home_away: HomeAway,
}

/// One row as produced by extraction, before validation. Field names follow
/// the CSV header so rows serialize straight into the raw artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMatchRow {
    #[serde(rename = "Match_Date")]
    pub match_date: String,
    #[serde(rename = "Match_Format")]
    pub match_format: String,
    #[serde(rename = "Opponent")]
    pub opponent: String,
    #[serde(rename = "Winner")]
    pub winner: String,
    #[serde(rename = "Margin")]
    pub margin: String,
    #[serde(rename = "Ground")]
    pub ground: String,
    #[serde(rename = "Year")]
    pub year: i32,
}

/// Collapse runs of whitespace to a single space and trim the ends.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
