use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download of {url} failed with status {status}")]
    Download { url: String, status: u16 },

    #[error("Invalid record on line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No matches found: {0}")]
    EmptyDataset(String),

    #[error("Chart rendering failed: {0}")]
    Chart(String),

    #[error("git command failed: {0}")]
    Git(String),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
