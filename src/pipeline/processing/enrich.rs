use tracing::info;

use super::{StageOutput, ValidationStage, WorkingRow};
use crate::config::TeamProfile;
use crate::pipeline::summary::ValidationReport;
use crate::types::HomeAway;

/// Classify each row as Home or Away from its ground name. A ground counts as
/// home when any configured keyword appears in it, ignoring case; a missing
/// ground is Away.
pub struct ClassifyHomeAway {
    team: TeamProfile,
}

impl ClassifyHomeAway {
    pub fn new(team: TeamProfile) -> Self {
        Self { team }
    }

    pub fn classify(&self, ground: &str) -> HomeAway {
        if self.team.is_home_venue(ground) {
            HomeAway::Home
        } else {
            HomeAway::Away
        }
    }
}

impl ValidationStage for ClassifyHomeAway {
    fn name(&self) -> &'static str {
        "classify_home_away"
    }

    fn apply(&self, rows: Vec<WorkingRow>, _report: &mut ValidationReport) -> StageOutput {
        let rows: Vec<WorkingRow> = rows
            .into_iter()
            .map(|mut row| {
                row.home_away = Some(self.classify(&row.ground));
                row
            })
            .collect();

        let home = rows
            .iter()
            .filter(|r| r.home_away == Some(HomeAway::Home))
            .count();
        let total = rows.len();
        if total > 0 {
            info!(
                "Home matches: {} ({:.1}%), away matches: {} ({:.1}%)",
                home,
                home as f64 / total as f64 * 100.0,
                total - home,
                (total - home) as f64 / total as f64 * 100.0
            );
        }

        StageOutput {
            rows,
            affected: home,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_classification() {
        let stage = ClassifyHomeAway::new(TeamProfile::default());
        assert_eq!(stage.classify("Galle International Stadium"), HomeAway::Home);
        assert_eq!(stage.classify("P Sara Oval, Colombo"), HomeAway::Home);
        assert_eq!(stage.classify("R.PREMADASA STADIUM"), HomeAway::Home);
        assert_eq!(
            stage.classify("Mahinda Rajapaksa International Cricket Stadium, Sooriyawewa"),
            HomeAway::Home
        );
        assert_eq!(stage.classify("Eden Gardens, Kolkata"), HomeAway::Away);
        assert_eq!(stage.classify(""), HomeAway::Away);
    }

    #[test]
    fn test_alternate_team_keywords() {
        let team = TeamProfile {
            name: "India".into(),
            aliases: vec!["ind".into()],
            home_venue_keywords: vec!["Eden Gardens".into(), "Wankhede".into()],
            start_year: 2000,
        };
        let stage = ClassifyHomeAway::new(team);
        let rows = vec![
            WorkingRow::new("2020-01-15", "Test", "Sri Lanka", "", "", "Eden Gardens, Kolkata", "2020"),
            WorkingRow::new("2020-01-20", "Test", "Sri Lanka", "", "", "Galle", "2020"),
        ];
        let out = stage.apply(rows, &mut ValidationReport::new());
        assert_eq!(out.rows[0].home_away, Some(HomeAway::Home));
        assert_eq!(out.rows[1].home_away, Some(HomeAway::Away));
        assert_eq!(out.affected, 1);
    }
}
