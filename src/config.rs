use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::*;
use crate::error::{DatasetError, Result};
use crate::types::MatchFormat;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub team: TeamProfile,
    pub sources: SourcesConfig,
    pub paths: PathsConfig,
}

/// The national team being catalogued. This is the only configuration the
/// validation pipeline sees.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TeamProfile {
    pub name: String,
    pub aliases: Vec<String>,
    pub home_venue_keywords: Vec<String>,
    pub start_year: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub archives: Vec<ArchiveSource>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchiveSource {
    pub key: String,
    pub format: MatchFormat,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    pub work_dir: PathBuf,
    pub raw_csv: PathBuf,
    pub clean_csv: PathBuf,
    pub summary_json: PathBuf,
    pub readme: PathBuf,
    pub release_dir: PathBuf,
    pub data_dictionary: PathBuf,
}

impl Default for TeamProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_TEAM_NAME.to_string(),
            aliases: DEFAULT_TEAM_ALIASES.iter().map(|s| s.to_string()).collect(),
            home_venue_keywords: DEFAULT_HOME_VENUE_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            start_year: DEFAULT_START_YEAR,
        }
    }
}

impl TeamProfile {
    /// True when `candidate` is the team's name or one of its aliases, ignoring
    /// case and surrounding whitespace.
    pub fn is_home_team(&self, candidate: &str) -> bool {
        let candidate = candidate.trim().to_lowercase();
        if candidate.is_empty() {
            return false;
        }
        candidate == self.name.to_lowercase()
            || self.aliases.iter().any(|a| a.trim().to_lowercase() == candidate)
    }

    /// Case-insensitive substring match of the ground against the home keywords.
    pub fn is_home_venue(&self, ground: &str) -> bool {
        let ground = ground.to_lowercase();
        !ground.trim().is_empty()
            && self
                .home_venue_keywords
                .iter()
                .filter(|k| !k.trim().is_empty())
                .any(|k| ground.contains(&k.to_lowercase()))
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            archives: DEFAULT_SOURCES
                .iter()
                .map(|(key, format, url)| ArchiveSource {
                    key: key.to_string(),
                    format: format.parse().unwrap_or(MatchFormat::Test),
                    url: url.to_string(),
                })
                .collect(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            raw_csv: PathBuf::from(DEFAULT_RAW_CSV),
            clean_csv: PathBuf::from(DEFAULT_CLEAN_CSV),
            summary_json: PathBuf::from(DEFAULT_SUMMARY_JSON),
            readme: PathBuf::from(DEFAULT_README),
            release_dir: PathBuf::from(DEFAULT_RELEASE_DIR),
            data_dictionary: PathBuf::from(DEFAULT_DATA_DICTIONARY),
        }
    }
}

impl Config {
    /// Resolve the config path: explicit argument, then `CRICKET_CONFIG`,
    /// then `config.toml` in the working directory.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(v) if !v.trim().is_empty() => PathBuf::from(v),
            _ => PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Load configuration from `path`. A missing file means built-in defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path).map_err(|e| {
            DatasetError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_toml(&config_content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.team.name.trim().is_empty() {
            return Err(DatasetError::Config("team.name must not be empty".into()));
        }
        if self.sources.timeout_seconds == 0 {
            return Err(DatasetError::Config(
                "sources.timeout_seconds must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_three_formats() {
        let config = Config::default();
        assert_eq!(config.team.name, "Sri Lanka");
        assert_eq!(config.team.start_year, 2000);
        let formats: Vec<MatchFormat> = config.sources.archives.iter().map(|a| a.format).collect();
        assert_eq!(formats, vec![MatchFormat::Test, MatchFormat::Odi, MatchFormat::T20]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [team]
            name = "Bangladesh"
            aliases = ["ban", "bd"]
            home_venue_keywords = ["Mirpur", "Chattogram"]
            "#,
        )
        .unwrap();

        assert_eq!(config.team.name, "Bangladesh");
        assert_eq!(config.team.start_year, 2000);
        assert_eq!(config.sources.timeout_seconds, 60);
        assert!(config.team.is_home_team("BAN"));
        assert!(!config.team.is_home_team("Sri Lanka"));
    }

    #[test]
    fn test_empty_team_name_is_rejected() {
        let result = Config::from_toml("[team]\nname = \"  \"\n");
        assert!(matches!(result, Err(DatasetError::Config(_))));
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let result = Config::from_toml("[team\nname = 1");
        assert!(matches!(result, Err(DatasetError::Toml(_))));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(Path::new("/definitely/not/here/config.toml")).unwrap();
        assert_eq!(config.paths.raw_csv, PathBuf::from(DEFAULT_RAW_CSV));
    }

    #[test]
    fn test_home_team_matching_ignores_case() {
        let team = TeamProfile::default();
        assert!(team.is_home_team("Sri Lanka"));
        assert!(team.is_home_team("  SRI LANKA "));
        assert!(team.is_home_team("SriLanka"));
        assert!(team.is_home_team("SL"));
        assert!(!team.is_home_team("India"));
        assert!(!team.is_home_team(""));
    }

    #[test]
    fn test_home_venue_is_substring_match() {
        let team = TeamProfile::default();
        assert!(team.is_home_venue("Galle International Stadium"));
        assert!(team.is_home_venue("p sara oval, colombo"));
        assert!(team.is_home_venue("Paikiasothy Saravanamuttu Stadium"));
        assert!(!team.is_home_venue("Melbourne Cricket Ground"));
        assert!(!team.is_home_venue(""));
    }
}
