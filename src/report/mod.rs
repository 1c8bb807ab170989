//! Aggregate statistics over the cleaned dataset

pub mod charts;
pub mod readme;

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::types::{HomeAway, MatchFormat, MatchRecord, Winner};

pub use charts::render_charts;
pub use readme::update_readme;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormatPerformance {
    pub matches: usize,
    pub wins: usize,
    pub decided: usize,
    pub win_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarginBreakdown {
    pub by_runs: usize,
    pub by_wickets: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetStats {
    pub total_matches: usize,
    pub first_match: Option<NaiveDate>,
    pub last_match: Option<NaiveDate>,
    pub per_year: BTreeMap<i32, usize>,
    pub per_format: BTreeMap<String, usize>,
    pub per_winner: BTreeMap<String, usize>,
    pub home_matches: usize,
    pub away_matches: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub decided: usize,
    /// Percentages over decided matches
    pub win_rate: f64,
    pub loss_rate: f64,
    /// Percentage over all matches
    pub draw_rate: f64,
    pub format_performance: BTreeMap<String, FormatPerformance>,
    pub top_opponents: Vec<(String, usize)>,
    pub top_venues: Vec<(String, usize)>,
    pub distinct_opponents: usize,
    pub distinct_venues: usize,
    pub margins: MarginBreakdown,
}

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Most frequent first, ties alphabetical
fn top_n(counts: HashMap<&str, usize>, n: usize) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> =
        counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}

fn winner_key(winner: Winner) -> &'static str {
    match winner {
        Winner::HomeTeam => "HomeTeam",
        Winner::Opponent => "Opponent",
        Winner::Draw => "Draw",
        Winner::Tie => "Tie",
        Winner::NoResult => "NoResult",
        Winner::Unknown => "Unknown",
    }
}

impl DatasetStats {
    pub fn compute(records: &[MatchRecord], top: usize) -> Self {
        let mut stats = DatasetStats {
            total_matches: records.len(),
            first_match: records.iter().map(|r| r.date).min(),
            last_match: records.iter().map(|r| r.date).max(),
            ..Default::default()
        };

        let mut opponents: HashMap<&str, usize> = HashMap::new();
        let mut venues: HashMap<&str, usize> = HashMap::new();

        for record in records {
            *stats.per_year.entry(record.year).or_default() += 1;
            *stats.per_format.entry(record.format.to_string()).or_default() += 1;
            *stats.per_winner.entry(winner_key(record.winner).to_string()).or_default() += 1;

            match record.home_away {
                HomeAway::Home => stats.home_matches += 1,
                HomeAway::Away => stats.away_matches += 1,
            }
            match record.winner {
                Winner::HomeTeam => stats.wins += 1,
                Winner::Opponent => stats.losses += 1,
                Winner::Draw => stats.draws += 1,
                _ => {}
            }

            let perf = stats
                .format_performance
                .entry(record.format.to_string())
                .or_default();
            perf.matches += 1;
            if record.winner.is_decided() {
                perf.decided += 1;
            }
            if record.winner == Winner::HomeTeam {
                perf.wins += 1;
            }

            if let Some(margin) = &record.margin {
                if margin.is_runs() {
                    stats.margins.by_runs += 1;
                }
                if margin.is_wickets() {
                    stats.margins.by_wickets += 1;
                }
            }

            *opponents.entry(record.opponent.as_str()).or_default() += 1;
            *venues.entry(record.venue.as_str()).or_default() += 1;
        }

        stats.decided = stats.wins + stats.losses;
        stats.win_rate = pct(stats.wins, stats.decided);
        stats.loss_rate = pct(stats.losses, stats.decided);
        stats.draw_rate = pct(stats.draws, stats.total_matches);
        for perf in stats.format_performance.values_mut() {
            perf.win_rate = pct(perf.wins, perf.decided);
        }

        stats.distinct_opponents = opponents.len();
        stats.distinct_venues = venues.len();
        stats.top_opponents = top_n(opponents, top);
        stats.top_venues = top_n(venues, top);
        stats
    }

    pub fn format_count(&self, format: MatchFormat) -> usize {
        self.per_format.get(format.as_str()).copied().unwrap_or(0)
    }
}

/// Console rendering of [`DatasetStats`]
pub struct TextReport<'a> {
    pub stats: &'a DatasetStats,
    pub team_name: &'a str,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats;
        let rule = "=".repeat(60);

        writeln!(f, "{}", rule)?;
        writeln!(f, "{} INTERNATIONAL CRICKET DATASET", self.team_name.to_uppercase())?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Total matches: {}", stats.total_matches)?;
        if let (Some(first), Some(last)) = (stats.first_match, stats.last_match) {
            writeln!(f, "Date range: {} to {}", first, last)?;
        }
        writeln!(
            f,
            "Opponents: {}  Venues: {}",
            stats.distinct_opponents, stats.distinct_venues
        )?;

        writeln!(f, "\nMatches by format:")?;
        for (format, count) in &stats.per_format {
            writeln!(f, "  {:<6} {:>5}", format, count)?;
        }

        writeln!(f, "\nMatches by year:")?;
        for (year, count) in &stats.per_year {
            writeln!(f, "  {} {:>5}", year, count)?;
        }

        writeln!(f, "\nResults:")?;
        writeln!(f, "  Wins:   {:>5} ({:.1}% of decided)", stats.wins, stats.win_rate)?;
        writeln!(f, "  Losses: {:>5} ({:.1}% of decided)", stats.losses, stats.loss_rate)?;
        writeln!(f, "  Draws:  {:>5} ({:.1}% of all)", stats.draws, stats.draw_rate)?;
        writeln!(f, "  Home: {}  Away: {}", stats.home_matches, stats.away_matches)?;

        writeln!(f, "\nPerformance by format:")?;
        for (format, perf) in &stats.format_performance {
            writeln!(
                f,
                "  {:<6} {} matches, {} wins, {:.1}% win rate",
                format, perf.matches, perf.wins, perf.win_rate
            )?;
        }

        writeln!(f, "\nTop opponents:")?;
        for (name, count) in &stats.top_opponents {
            writeln!(f, "  {:<30} {:>4}", name, count)?;
        }
        writeln!(f, "\nTop venues:")?;
        for (name, count) in &stats.top_venues {
            writeln!(f, "  {:<50} {:>4}", name, count)?;
        }

        writeln!(f, "\nVictory margins:")?;
        writeln!(f, "  By runs:    {}", stats.margins.by_runs)?;
        writeln!(f, "  By wickets: {}", stats.margins.by_wickets)
    }
}

pub fn render_text(stats: &DatasetStats, team_name: &str) -> String {
    TextReport { stats, team_name }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Margin;

    fn record(date: &str, format: MatchFormat, opponent: &str, winner: Winner, margin: Option<Margin>, venue: &str, home_away: HomeAway) -> MatchRecord {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        MatchRecord {
            date,
            format,
            opponent: opponent.to_string(),
            winner,
            margin,
            venue: venue.to_string(),
            year: chrono::Datelike::year(&date),
            home_away,
        }
    }

    fn sample() -> Vec<MatchRecord> {
        vec![
            record("2019-03-01", MatchFormat::Test, "India", Winner::HomeTeam, Some(Margin::Runs(50)), "Galle International Stadium", HomeAway::Home),
            record("2019-06-01", MatchFormat::Odi, "India", Winner::Opponent, Some(Margin::Wickets(4)), "Eden Gardens", HomeAway::Away),
            record("2020-01-15", MatchFormat::Odi, "England", Winner::HomeTeam, Some(Margin::Wickets(2)), "R Premadasa Stadium", HomeAway::Home),
            record("2020-02-15", MatchFormat::Test, "Australia", Winner::Draw, None, "Galle International Stadium", HomeAway::Home),
            record("2020-03-15", MatchFormat::T20, "Australia", Winner::NoResult, None, "MCG", HomeAway::Away),
        ]
    }

    #[test]
    fn test_rates_use_decided_matches() {
        let stats = DatasetStats::compute(&sample(), 10);
        assert_eq!(stats.total_matches, 5);
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.decided, 3);
        assert!((stats.win_rate - 200.0 / 3.0).abs() < 1e-9);
        assert!((stats.loss_rate - 100.0 / 3.0).abs() < 1e-9);
        assert!((stats.draw_rate - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_counts() {
        let stats = DatasetStats::compute(&sample(), 10);
        assert_eq!(stats.per_year.get(&2019), Some(&2));
        assert_eq!(stats.per_year.get(&2020), Some(&3));
        assert_eq!(stats.format_count(MatchFormat::Odi), 2);
        assert_eq!(stats.format_count(MatchFormat::T20), 1);
        assert_eq!(stats.home_matches, 3);
        assert_eq!(stats.away_matches, 2);
        assert_eq!(stats.per_winner.get("NoResult"), Some(&1));
        assert_eq!(stats.margins, MarginBreakdown { by_runs: 1, by_wickets: 2 });
        assert_eq!(stats.first_match.unwrap().to_string(), "2019-03-01");
        assert_eq!(stats.last_match.unwrap().to_string(), "2020-03-15");
    }

    #[test]
    fn test_format_performance() {
        let stats = DatasetStats::compute(&sample(), 10);
        let odi = &stats.format_performance["ODI"];
        assert_eq!((odi.matches, odi.wins, odi.decided), (2, 1, 2));
        assert!((odi.win_rate - 50.0).abs() < 1e-9);
        let t20 = &stats.format_performance["T20"];
        assert_eq!(t20.decided, 0);
        assert_eq!(t20.win_rate, 0.0);
    }

    #[test]
    fn test_top_n_breaks_ties_alphabetically() {
        let stats = DatasetStats::compute(&sample(), 2);
        assert_eq!(
            stats.top_opponents,
            vec![("Australia".to_string(), 2), ("India".to_string(), 2)]
        );
        assert_eq!(stats.top_venues[0], ("Galle International Stadium".to_string(), 2));
        assert_eq!(stats.top_venues.len(), 2);
        assert_eq!(stats.distinct_opponents, 3);
        assert_eq!(stats.distinct_venues, 4);
    }

    #[test]
    fn test_empty_dataset() {
        let stats = DatasetStats::compute(&[], 10);
        assert_eq!(stats.total_matches, 0);
        assert_eq!(stats.win_rate, 0.0);
        assert!(stats.first_match.is_none());
        assert!(render_text(&stats, "Sri Lanka").contains("Total matches: 0"));
    }

    #[test]
    fn test_render_text() {
        let stats = DatasetStats::compute(&sample(), 10);
        let text = render_text(&stats, "Sri Lanka");
        assert!(text.contains("SRI LANKA INTERNATIONAL CRICKET DATASET"));
        assert!(text.contains("Date range: 2019-03-01 to 2020-03-15"));
        assert!(text.contains("By wickets: 2"));
    }

    /// Accepts a fixed number of bytes, then refuses
    struct Cramped(usize);

    impl fmt::Write for Cramped {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            if s.len() > self.0 {
                return Err(fmt::Error);
            }
            self.0 -= s.len();
            Ok(())
        }
    }

    #[test]
    fn test_text_report_propagates_write_errors() {
        use std::fmt::Write as _;

        let stats = DatasetStats::compute(&sample(), 10);
        let report = TextReport { stats: &stats, team_name: "Sri Lanka" };
        let full = render_text(&stats, "Sri Lanka");

        assert!(write!(Cramped(full.len()), "{}", report).is_ok());
        assert!(write!(Cramped(100), "{}", report).is_err());
        assert!(full.ends_with("By wickets: 2\n"));
    }
}
