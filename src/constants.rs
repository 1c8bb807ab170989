/// Column names shared by the raw and cleaned CSV artifacts.
/// The raw table carries the first seven; the cleaned table adds `Home_Away`.
pub const COL_MATCH_DATE: &str = "Match_Date";
pub const COL_MATCH_FORMAT: &str = "Match_Format";
pub const COL_OPPONENT: &str = "Opponent";
pub const COL_WINNER: &str = "Winner";
pub const COL_MARGIN: &str = "Margin";
pub const COL_GROUND: &str = "Ground";
pub const COL_YEAR: &str = "Year";
pub const COL_HOME_AWAY: &str = "Home_Away";

/// Columns the validation pipeline refuses to run without
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_MATCH_DATE,
    COL_MATCH_FORMAT,
    COL_OPPONENT,
    COL_WINNER,
    COL_MARGIN,
    COL_GROUND,
    COL_YEAR,
];

/// Column order of the cleaned artifact
pub const CLEAN_COLUMNS: [&str; 8] = [
    COL_MATCH_DATE,
    COL_MATCH_FORMAT,
    COL_OPPONENT,
    COL_WINNER,
    COL_MARGIN,
    COL_GROUND,
    COL_YEAR,
    COL_HOME_AWAY,
];

pub const DEFAULT_TEAM_NAME: &str = "Sri Lanka";
pub const DEFAULT_TEAM_ALIASES: [&str; 3] = ["sri lanka", "srilanka", "sl"];
pub const DEFAULT_START_YEAR: i32 = 2000;

// Substring keywords; a ground containing any of them (ignoring case) is a home ground.
// The last five cover grounds that were historically misfiled as away.
pub const DEFAULT_HOME_VENUE_KEYWORDS: [&str; 22] = [
    "Colombo",
    "Galle",
    "Kandy",
    "Dambulla",
    "Kurunegala",
    "Sinhalese Sports Club",
    "R.Premadasa",
    "R Premadasa",
    "P Sara Oval",
    "Pallekele",
    "Khettarama",
    "Premadasa",
    "Asgiriya",
    "Rangiri Dambulla",
    "Galle International Stadium",
    "Pallekele International Cricket Stadium",
    "Premadasa International Cricket Stadium (RPS)",
    "Sooriyawewa",
    "Hambantota",
    "Welagedara",
    "Saravanamuttu",
    "Colts Cricket Club",
];

// Cricsheet bulk downloads: (key, format label, url)
pub const DEFAULT_SOURCES: [(&str, &str, &str); 3] = [
    ("tests", "Test", "https://cricsheet.org/downloads/tests_json.zip"),
    ("odis", "ODI", "https://cricsheet.org/downloads/odis_json.zip"),
    ("t20s", "T20", "https://cricsheet.org/downloads/t20s_json.zip"),
];

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const CONFIG_PATH_ENV: &str = "CRICKET_CONFIG";
pub const METRICS_ADDR_ENV: &str = "CRICKET_METRICS_ADDR";

pub const DEFAULT_WORK_DIR: &str = "temp";
pub const DEFAULT_RAW_CSV: &str = "sri_lanka_international_cricket_matches_2000_present.csv";
pub const DEFAULT_CLEAN_CSV: &str = "sri_lanka_international_cricket_matches_2000_present_clean.csv";
pub const DEFAULT_SUMMARY_JSON: &str = "validation_summary.json";
pub const DEFAULT_README: &str = "README.md";
pub const DEFAULT_RELEASE_DIR: &str = "kaggle_release";
pub const DEFAULT_DATA_DICTIONARY: &str = "data_dictionary.md";
pub const RELEASE_MANIFEST: &str = "manifest.json";

pub const DEFAULT_TOP_N: usize = 10;
